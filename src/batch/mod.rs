pub(crate) mod generation;
pub(crate) mod pool;
pub(crate) mod session;
pub(crate) mod status;
