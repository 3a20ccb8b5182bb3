//! Thread pinning for async callers

use crate::{Error, Result};
use tokio::sync::oneshot;
use tracing::debug;

/// Run `f` to completion on a dedicated OS thread and await its result.
///
/// The runtime cannot migrate the work or schedule anything else onto the
/// thread while `f` runs. Dropping the returned future does not interrupt
/// `f`; it still finishes and restores. The thread exits afterwards, so a
/// thread stranded by a failed restore is never reused.
pub async fn run_pinned<F, T>(name: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let result = f();
            if tx.send(result).is_err() {
                debug!("Pinned caller went away before the result was ready");
            }
        })
        .map_err(|e| Error::Worker(format!("failed to spawn {}: {}", name, e)))?;

    rx.await
        .map_err(|_| Error::Worker(format!("{} exited without a result", name)))?
}
