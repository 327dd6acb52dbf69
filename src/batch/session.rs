use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, mpsc};

use rayon::prelude::*;

use crate::assets::codec::{ImageCodec, ImageRsCodec, OutputFormat};
use crate::assets::encoded::EncodedImage;
use crate::assets::source::SourceImage;
use crate::batch::generation::BatchGeneration;
use crate::batch::pool::build_thread_pool;
use crate::batch::status::{BatchStatus, FileStatus};
use crate::export::archive::{ArchiveWriter, ZipArchiveWriter};
use crate::export::build::{ArchiveBuild, build_archive};
use crate::foundation::config::StickerConfig;
use crate::foundation::error::{StickerError, StickerResult};
use crate::naming::allocator::NameAllocator;
use crate::naming::policy::{NamingPolicy, sticker_candidate};
use crate::naming::sanitize::{is_allowed_extension, sanitize_base, split_name};
use crate::transform::sticker::{TransformedSticker, transform_sticker};

/// Opaque sticker identifier, stable for the lifetime of a batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StickerId(String);

impl StickerId {
    /// String form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One committed sticker of the current batch.
#[derive(Clone, Debug)]
pub struct StickerAsset {
    id: StickerId,
    original_name: String,
    assigned_name: String,
    image: EncodedImage,
    width: u32,
    height: u32,
    oversize: bool,
}

impl StickerAsset {
    /// Identifier.
    pub fn id(&self) -> &StickerId {
        &self.id
    }

    /// Source file name; never changes.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Current output name, unique within the batch, with a `.png` or `.webp` extension.
    pub fn assigned_name(&self) -> &str {
        &self.assigned_name
    }

    /// Canonical encoded image.
    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    /// Raster width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canonical encoding exceeded the configured size limit.
    pub fn is_oversize(&self) -> bool {
        self.oversize
    }

    /// Displayable preview of the canonical image.
    pub fn preview_data_url(&self) -> String {
        self.image.preview_data_url()
    }
}

/// Per-batch options, chosen at selection time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOpts {
    /// Composite the two-tone outline.
    pub add_outline: bool,
    /// How committed stickers are named.
    pub naming: NamingPolicy,
}

/// Outcome counters of [`StickerSession::process_batch`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Generation the batch ran under.
    pub generation: u64,
    /// Files selected.
    pub submitted: usize,
    /// Files committed as stickers.
    pub succeeded: usize,
    /// Files skipped without processing.
    pub skipped: usize,
    /// Files that failed.
    pub failed: usize,
    /// Committed stickers flagged oversize.
    pub oversize: usize,
    /// The batch was invalidated while running; later results were dropped.
    pub cancelled: bool,
}

/// Result of [`StickerSession::rename`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The sticker now carries `to`.
    Renamed {
        /// Previous name.
        from: String,
        /// New, allocated name.
        to: String,
    },
    /// The requested name equals the current one.
    Unchanged {
        /// Current name.
        name: String,
    },
    /// Input was invalid; the sticker keeps its name and no state changed.
    Rejected {
        /// Name the sticker keeps.
        kept: String,
        /// Why the input was refused.
        reason: String,
    },
}

enum WorkerMsg {
    Started {
        index: usize,
    },
    Finished {
        index: usize,
        generation: u64,
        result: StickerResult<TransformedSticker>,
    },
}

/// Live batch state: committed stickers, per-file status and the batch naming scope.
pub struct StickerSession {
    config: StickerConfig,
    codec: Arc<dyn ImageCodec>,
    generation: BatchGeneration,
    names: NameAllocator,
    stickers: Vec<StickerAsset>,
    status: BatchStatus,
    next_seq: u32,
    next_id: u64,
}

impl StickerSession {
    /// Session using the `image`-crate codec.
    pub fn new(config: StickerConfig) -> StickerResult<Self> {
        Self::with_codec(config, Arc::new(ImageRsCodec))
    }

    /// Session using a custom codec.
    pub fn with_codec(config: StickerConfig, codec: Arc<dyn ImageCodec>) -> StickerResult<Self> {
        config.validate()?;
        let names = NameAllocator::with_fallback(config.fallback_base.clone());
        Ok(Self {
            config,
            codec,
            generation: BatchGeneration::new(),
            names,
            stickers: Vec::new(),
            status: BatchStatus::new(),
            next_seq: 1,
            next_id: 0,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &StickerConfig {
        &self.config
    }

    /// Committed stickers of the current batch.
    pub fn stickers(&self) -> &[StickerAsset] {
        &self.stickers
    }

    /// Look up a sticker by id.
    pub fn sticker(&self, id: &StickerId) -> Option<&StickerAsset> {
        self.stickers.iter().find(|s| &s.id == id)
    }

    /// Per-file status of the current batch.
    pub fn status(&self) -> &BatchStatus {
        &self.status
    }

    /// Names taken in the current batch.
    pub fn names(&self) -> &NameAllocator {
        &self.names
    }

    /// Handle to the generation counter; advancing it invalidates a running batch.
    pub fn generation_handle(&self) -> BatchGeneration {
        self.generation.clone()
    }

    /// Discard the current batch and start a new generation.
    pub fn reset(&mut self) -> u64 {
        let generation = self.generation.advance();
        self.names.clear();
        self.stickers.clear();
        self.status.clear();
        self.next_seq = 1;
        generation
    }

    /// Replace the batch with `files`, transforming them concurrently.
    ///
    /// Non-image selections are skipped, failures are recorded per file and never stop the
    /// rest. Results are committed (sequence number, name allocation) in selection order.
    #[tracing::instrument(skip(self, files), fields(count = files.len()))]
    pub fn process_batch(
        &mut self,
        files: Vec<SourceImage>,
        opts: &BatchOpts,
    ) -> StickerResult<BatchReport> {
        let generation = self.reset();
        let mut report = BatchReport {
            generation,
            submitted: files.len(),
            ..BatchReport::default()
        };

        let mut submit = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            self.status.queue(index, file.file_name());
            if file.is_image_type() {
                submit.push(index);
            } else {
                tracing::debug!(file = file.file_name(), "skipping non-image file");
                self.status.set(
                    index,
                    FileStatus::Skipped {
                        reason: format!("not an image ({})", file.media_type()),
                    },
                );
                report.skipped += 1;
            }
        }

        if submit.is_empty() {
            return Ok(report);
        }

        let pool = build_thread_pool(self.config.threads)?;
        let settings = self.config.transform_settings();
        let codec = Arc::clone(&self.codec);
        let add_outline = opts.add_outline;
        let files = &files;
        let submit_ref = &submit;

        std::thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<WorkerMsg>();

            scope.spawn(move || {
                pool.install(|| {
                    submit_ref.par_iter().for_each_with(tx, |tx, &index| {
                        let _ = tx.send(WorkerMsg::Started { index });
                        let result = transform_sticker(
                            &files[index],
                            add_outline,
                            &settings,
                            codec.as_ref(),
                        );
                        // The collector may already be gone after an error; nothing to do then.
                        let _ = tx.send(WorkerMsg::Finished {
                            index,
                            generation,
                            result,
                        });
                    });
                });
            });

            // Commit in selection order regardless of completion order.
            let mut order = submit_ref.iter().copied();
            let mut next = order.next();
            let mut pending = BTreeMap::<usize, StickerResult<TransformedSticker>>::new();

            for msg in rx {
                if report.cancelled {
                    continue;
                }
                match msg {
                    WorkerMsg::Started { index } => {
                        self.status.set(index, FileStatus::Processing);
                    }
                    WorkerMsg::Finished {
                        index,
                        generation,
                        result,
                    } => {
                        if !self.generation.is_current(generation) {
                            tracing::info!(generation, "batch invalidated, dropping results");
                            report.cancelled = true;
                            continue;
                        }
                        pending.insert(index, result);
                        while let Some(i) = next {
                            let Some(result) = pending.remove(&i) else {
                                break;
                            };
                            self.commit(i, result, opts, &mut report);
                            next = order.next();
                        }
                    }
                }
            }
        });

        if report.cancelled {
            self.discard_invalidated(&mut report);
        } else if self.config.sort_by_name {
            self.sort_stickers();
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "batch processed"
        );
        Ok(report)
    }

    fn commit(
        &mut self,
        index: usize,
        result: StickerResult<TransformedSticker>,
        opts: &BatchOpts,
        report: &mut BatchReport,
    ) {
        let outcome = result.and_then(|t| {
            let seq = self.next_seq;
            let candidate =
                sticker_candidate(opts.naming, seq, &t.file_name, self.config.name_max_len);
            let name = self.names.allocate(&candidate)?;
            self.next_seq += 1;
            Ok((t, name))
        });

        match outcome {
            Ok((t, name)) => {
                let id = StickerId(format!("{}-{}", t.file_name, self.next_id));
                self.next_id += 1;
                if t.oversize {
                    report.oversize += 1;
                }
                report.succeeded += 1;
                self.status.set(
                    index,
                    FileStatus::Done {
                        name: name.clone(),
                        naming: opts.naming,
                    },
                );
                self.stickers.push(StickerAsset {
                    id,
                    original_name: t.file_name,
                    assigned_name: name,
                    image: t.image,
                    width: t.width,
                    height: t.height,
                    oversize: t.oversize,
                });
            }
            Err(err) => {
                let file_name = self
                    .status
                    .get(index)
                    .map(|e| e.file_name.clone())
                    .unwrap_or_default();
                tracing::warn!(file = %file_name, error = %err, "failed to process file");
                report.failed += 1;
                self.status.set(
                    index,
                    FileStatus::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    },
                );
            }
        }
    }

    /// Drop everything the invalidated batch committed and settle the files it left behind.
    fn discard_invalidated(&mut self, report: &mut BatchReport) {
        self.names.clear();
        self.stickers.clear();
        self.next_seq = 1;
        report.succeeded = 0;
        report.oversize = 0;
        self.status.settle_invalidated();
    }

    fn sort_stickers(&mut self) {
        self.stickers
            .sort_by(|a, b| a.assigned_name.cmp(&b.assigned_name));
    }

    /// Rename a sticker.
    ///
    /// The input is trimmed and must have a non-empty base and a `.png` or `.webp` extension.
    /// Invalid input is rejected without touching any state. Otherwise the old name is released
    /// and the sanitized candidate is allocated against the remaining names.
    pub fn rename(&mut self, id: &StickerId, new_name: &str) -> StickerResult<RenameOutcome> {
        let pos = self
            .stickers
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| StickerError::validation(format!("unknown sticker id '{id}'")))?;
        let current = self.stickers[pos].assigned_name.clone();

        let reject = |reason: &str| -> StickerResult<RenameOutcome> {
            Ok(RenameOutcome::Rejected {
                kept: current.clone(),
                reason: reason.to_string(),
            })
        };

        let trimmed = new_name.trim();
        let (base, ext) = split_name(trimmed);
        if base.is_empty() {
            return reject("name must not be empty");
        }
        if !is_allowed_extension(ext) {
            return reject("extension must be .png or .webp");
        }
        let base = sanitize_base(base, self.config.name_max_len);
        if base.is_empty() {
            return reject("name has no usable characters");
        }

        let candidate = format!("{base}{ext}");
        if candidate == current {
            return Ok(RenameOutcome::Unchanged { name: current });
        }

        self.names.release(&current);
        let name = match self.names.allocate(&candidate) {
            Ok(name) => name,
            Err(err) => {
                self.names.allocate(&current)?;
                return Err(err);
            }
        };
        if name == current {
            return Ok(RenameOutcome::Unchanged { name });
        }
        self.stickers[pos].assigned_name = name.clone();
        if self.config.sort_by_name {
            self.sort_stickers();
        }

        Ok(RenameOutcome::Renamed {
            from: current,
            to: name,
        })
    }

    /// Package the batch through `writer`.
    pub fn build_archive_with(
        &self,
        format: OutputFormat,
        writer: &mut dyn ArchiveWriter,
    ) -> StickerResult<ArchiveBuild> {
        build_archive(
            &self.stickers,
            format,
            &self.config.export_settings(),
            self.codec.as_ref(),
            writer,
        )
    }

    /// Package the batch as a zip archive.
    pub fn export_zip(&self, format: OutputFormat) -> StickerResult<ArchiveBuild> {
        let mut writer = ZipArchiveWriter::new();
        self.build_archive_with(format, &mut writer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/session.rs"]
mod tests;
