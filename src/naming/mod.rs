pub(crate) mod allocator;
pub(crate) mod policy;
pub(crate) mod sanitize;
