use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::error::StickerErrorKind;
use crate::naming::policy::NamingPolicy;

/// Processing state of one selected file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileStatus {
    /// Selected, not yet picked up by a worker.
    Queued,
    /// A worker is transforming it.
    Processing,
    /// No sticker kept: the declared media type is not `image/*` (never submitted), or the
    /// batch was invalidated and its results discarded. Unsupported `image/*` types such as
    /// `image/bmp` are submitted and end as [`FileStatus::Failed`] with `UnsupportedMediaType`.
    Skipped {
        /// Human-readable reason.
        reason: String,
    },
    /// Transformed and named.
    Done {
        /// Name allocated at commit time.
        name: String,
        /// Policy the name was derived with.
        naming: NamingPolicy,
    },
    /// Transformation or naming failed; siblings are unaffected.
    Failed {
        /// Error class.
        kind: StickerErrorKind,
        /// Error message.
        message: String,
    },
}

impl FileStatus {
    /// `true` once the file will not change state again in this batch.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Queued | Self::Processing)
    }

    /// Error class for failed files.
    pub fn error_kind(&self) -> Option<StickerErrorKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::Processing => f.write_str("processing"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
            Self::Done { name, naming } => match naming {
                NamingPolicy::Prefixed => write!(f, "done: {name} (prefixed name)"),
                NamingPolicy::KeepOriginal => write!(f, "done: {name} (original name)"),
            },
            Self::Failed { message, .. } => write!(f, "error: {message}"),
        }
    }
}

/// Status of one selected file, keyed by its submission index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEntry {
    /// File name as selected.
    pub file_name: String,
    /// Current state.
    pub status: FileStatus,
}

/// Per-file status for the current batch, in submission order.
#[derive(Clone, Debug, Default)]
pub struct BatchStatus {
    entries: BTreeMap<usize, StatusEntry>,
}

impl BatchStatus {
    /// Empty status map.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn queue(&mut self, index: usize, file_name: impl Into<String>) {
        self.entries.insert(
            index,
            StatusEntry {
                file_name: file_name.into(),
                status: FileStatus::Queued,
            },
        );
    }

    pub(crate) fn set(&mut self, index: usize, status: FileStatus) {
        if let Some(entry) = self.entries.get_mut(&index) {
            entry.status = status;
        }
    }

    /// Mark every file without a surviving outcome as skipped. Failures and skips are kept;
    /// `Done` entries are reset since their stickers were discarded.
    pub(crate) fn settle_invalidated(&mut self) {
        for entry in self.entries.values_mut() {
            if matches!(
                entry.status,
                FileStatus::Queued | FileStatus::Processing | FileStatus::Done { .. }
            ) {
                entry.status = FileStatus::Skipped {
                    reason: "batch invalidated".to_string(),
                };
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry for submission index `index`.
    pub fn get(&self, index: usize) -> Option<&StatusEntry> {
        self.entries.get(&index)
    }

    /// Status of the first file selected under `file_name`.
    pub fn find(&self, file_name: &str) -> Option<&FileStatus> {
        self.entries
            .values()
            .find(|e| e.file_name == file_name)
            .map(|e| &e.status)
    }

    /// Entries in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &StatusEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every tracked file has settled.
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(|e| e.status.is_settled())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/status.rs"]
mod tests;
