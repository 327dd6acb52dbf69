use std::borrow::Cow;

use rayon::prelude::*;

use crate::assets::codec::{ImageCodec, OutputFormat};
use crate::batch::pool::build_thread_pool;
use crate::batch::session::StickerAsset;
use crate::export::archive::ArchiveWriter;
use crate::foundation::error::{StickerError, StickerResult};
use crate::naming::allocator::NameAllocator;
use crate::naming::sanitize::split_name;

/// Export parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSettings {
    /// Folder namespace all entries are placed under.
    pub folder: String,
    /// Encoder quality for stickers that must be re-encoded.
    pub alternate_quality: f32,
    /// Base used when a name has no usable base.
    pub fallback_base: String,
    /// Override the number of rayon worker threads for re-encoding.
    pub threads: Option<usize>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            folder: "TelegramStickers".to_string(),
            alternate_quality: 0.90,
            fallback_base: "sticker".to_string(),
            threads: None,
        }
    }
}

/// A finished archive.
#[derive(Clone, Debug)]
pub struct ArchiveBuild {
    /// Encoding of every entry.
    pub format: OutputFormat,
    /// Serialized container.
    pub bytes: Vec<u8>,
    /// Entry names (without the folder), in sticker order.
    pub entries: Vec<String>,
    /// Suggested download file name.
    pub file_name: String,
}

/// Download name for an archive of `format` stickers, e.g. `TelegramStickers_webp.zip`.
pub fn archive_file_name(folder: &str, format: OutputFormat) -> String {
    format!("{folder}_{}.zip", format.label())
}

/// Package `stickers` into one archive in `format`.
///
/// Stickers already stored in `format` are written as-is; the others are decoded and
/// re-encoded concurrently. Any conversion failure aborts the export and names the file.
/// Entry names are allocated in a fresh scope: the base of each assigned name plus the format
/// extension, suffixed on collision.
#[tracing::instrument(skip(stickers, settings, codec, writer), fields(count = stickers.len()))]
pub fn build_archive(
    stickers: &[StickerAsset],
    format: OutputFormat,
    settings: &ExportSettings,
    codec: &dyn ImageCodec,
    writer: &mut dyn ArchiveWriter,
) -> StickerResult<ArchiveBuild> {
    if stickers.is_empty() {
        return Err(StickerError::validation("no stickers to export"));
    }

    let payloads = encode_payloads(stickers, format, settings, codec)?;

    let mut names = NameAllocator::with_fallback(settings.fallback_base.clone());
    let mut entries = Vec::with_capacity(stickers.len());
    for (sticker, payload) in stickers.iter().zip(&payloads) {
        let (base, _) = split_name(sticker.assigned_name());
        let entry = names.allocate(&format!("{base}{}", format.extension()))?;
        writer.add_file(&format!("{}/{entry}", settings.folder), payload)?;
        entries.push(entry);
    }

    let bytes = writer.serialize()?;
    tracing::info!(
        format = format.label(),
        entries = entries.len(),
        size = bytes.len(),
        "archive built"
    );

    Ok(ArchiveBuild {
        format,
        bytes,
        entries,
        file_name: archive_file_name(&settings.folder, format),
    })
}

fn encode_payloads<'a>(
    stickers: &'a [StickerAsset],
    format: OutputFormat,
    settings: &ExportSettings,
    codec: &dyn ImageCodec,
) -> StickerResult<Vec<Cow<'a, [u8]>>> {
    if stickers.iter().all(|s| s.image().format() == format) {
        return Ok(stickers
            .iter()
            .map(|s| Cow::Borrowed(s.image().bytes()))
            .collect());
    }

    let pool = build_thread_pool(settings.threads)?;
    let results: Vec<StickerResult<Cow<'a, [u8]>>> = pool.install(|| {
        stickers
            .par_iter()
            .map(|s| {
                if s.image().format() == format {
                    return Ok(Cow::Borrowed(s.image().bytes()));
                }
                reencode(s, format, settings.alternate_quality, codec).map(Cow::Owned)
            })
            .collect()
    });

    results.into_iter().collect()
}

fn reencode(
    sticker: &StickerAsset,
    format: OutputFormat,
    quality: f32,
    codec: &dyn ImageCodec,
) -> StickerResult<Vec<u8>> {
    let convert_err = |e: anyhow::Error| {
        StickerError::encode(format!(
            "failed to convert {} to {}: {e:#}",
            sticker.original_name(),
            format.label()
        ))
    };
    let raster = codec.decode(sticker.image().bytes()).map_err(convert_err)?;
    codec.encode(&raster, format, quality).map_err(convert_err)
}

#[cfg(test)]
#[path = "../../tests/unit/export/build.rs"]
mod tests;
