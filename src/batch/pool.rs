use crate::foundation::error::{StickerError, StickerResult};

pub(crate) fn build_thread_pool(threads: Option<usize>) -> StickerResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StickerError::validation("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StickerError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pool.rs"]
mod tests;
