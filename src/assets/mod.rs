pub(crate) mod codec;
pub(crate) mod encoded;
pub(crate) mod source;
