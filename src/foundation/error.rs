/// Convenience result type used across stickerkit.
pub type StickerResult<T> = Result<T, StickerError>;

/// Top-level error taxonomy used by the transformer, allocator and exporter.
#[derive(thiserror::Error, Debug)]
pub enum StickerError {
    /// Declared media type is not one of PNG, JPEG, GIF or WebP.
    #[error("unsupported media type: {media_type}")]
    UnsupportedMediaType {
        /// The rejected media type as declared by the caller.
        media_type: String,
    },

    /// Bytes could not be decoded, or decoded to a zero-sized image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The encoder produced no output.
    #[error("encode error: {0}")]
    Encode(String),

    /// The archive collaborator failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Collision resolution ran out of suffixes.
    #[error("name conflict unresolved: {0}")]
    NameConflictUnresolved(String),

    /// A raster surface of the requested size could not be allocated.
    #[error("surface error: {0}")]
    Surface(String),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Filesystem failure while reading sources or delivering downloads.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Copyable tag for a [`StickerError`] variant, used in per-file status reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StickerErrorKind {
    /// See [`StickerError::UnsupportedMediaType`].
    UnsupportedMediaType,
    /// See [`StickerError::InvalidImage`].
    InvalidImage,
    /// See [`StickerError::Encode`].
    Encode,
    /// See [`StickerError::Archive`].
    Archive,
    /// See [`StickerError::NameConflictUnresolved`].
    NameConflictUnresolved,
    /// See [`StickerError::Surface`].
    Surface,
    /// See [`StickerError::Validation`].
    Validation,
    /// See [`StickerError::Config`].
    Config,
    /// See [`StickerError::Io`].
    Io,
    /// See [`StickerError::Other`].
    Other,
}

impl StickerError {
    /// Build a [`StickerError::UnsupportedMediaType`] value.
    pub fn unsupported_media_type(media_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            media_type: media_type.into(),
        }
    }

    /// Build a [`StickerError::InvalidImage`] value.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Build a [`StickerError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`StickerError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Build a [`StickerError::NameConflictUnresolved`] value.
    pub fn name_conflict(msg: impl Into<String>) -> Self {
        Self::NameConflictUnresolved(msg.into())
    }

    /// Build a [`StickerError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`StickerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StickerError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`StickerError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Variant tag of this error.
    pub fn kind(&self) -> StickerErrorKind {
        match self {
            Self::UnsupportedMediaType { .. } => StickerErrorKind::UnsupportedMediaType,
            Self::InvalidImage(_) => StickerErrorKind::InvalidImage,
            Self::Encode(_) => StickerErrorKind::Encode,
            Self::Archive(_) => StickerErrorKind::Archive,
            Self::NameConflictUnresolved(_) => StickerErrorKind::NameConflictUnresolved,
            Self::Surface(_) => StickerErrorKind::Surface,
            Self::Validation(_) => StickerErrorKind::Validation,
            Self::Config(_) => StickerErrorKind::Config,
            Self::Io(_) => StickerErrorKind::Io,
            Self::Other(_) => StickerErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
