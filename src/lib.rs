//! stickerkit turns arbitrary images into uniformly sized, uniquely named sticker assets.
//!
//! # Pipeline overview
//!
//! 1. **Transform**: `SourceImage -> TransformedSticker` (validate, decode, resize, outline, encode)
//! 2. **Name**: sanitize the original file name and allocate a batch-unique sticker name
//! 3. **Collect**: a [`StickerSession`] fans a batch out over a rayon pool and commits results
//!    in submission order, tracking a per-file [`FileStatus`]
//! 4. **Export**: [`build_archive`] packages the batch as PNG (stored bytes) or WebP (re-encoded)
//!    into a single zip, named through a fresh allocation scope
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: resize and outline compositing are pure functions of the
//!   input bytes and flags.
//! - **Per-file isolation**: a failing file never aborts its siblings.
//! - **Explicit naming scopes**: every allocation set is an owned [`NameAllocator`], never
//!   process-wide state.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod batch;
mod effects;
mod export;
mod foundation;
mod naming;
mod transform;

pub use assets::codec::{ImageCodec, ImageRsCodec, OutputFormat};
pub use assets::encoded::EncodedImage;
pub use assets::source::{SUPPORTED_MEDIA_TYPES, SourceImage, is_supported_media_type};
pub use batch::generation::BatchGeneration;
pub use batch::session::{
    BatchOpts, BatchReport, RenameOutcome, StickerAsset, StickerId, StickerSession,
};
pub use batch::status::{BatchStatus, FileStatus, StatusEntry};
pub use effects::composite::{PremulRgba8, over, premultiply_in_place, unpremultiply_in_place};
pub use effects::outline::{OutlineStyle, compose_outline, outline_offsets, silhouette};
pub use export::archive::{ArchiveWriter, InMemoryArchive, ZipArchiveWriter};
pub use export::build::{ArchiveBuild, ExportSettings, archive_file_name, build_archive};
pub use export::download::{DirectoryTarget, DownloadTarget};
pub use foundation::config::StickerConfig;
pub use foundation::error::{StickerError, StickerErrorKind, StickerResult};
pub use naming::allocator::{NameAllocator, unique_name};
pub use naming::policy::{NamingPolicy, original_base, sticker_candidate};
pub use naming::sanitize::{ALLOWED_EXTENSIONS, sanitize_base, split_name};
pub use transform::resize::{resize_to_target, target_dimensions};
pub use transform::sticker::{TransformSettings, TransformedSticker, transform_sticker};
