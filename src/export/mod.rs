pub(crate) mod archive;
pub(crate) mod build;
pub(crate) mod download;
