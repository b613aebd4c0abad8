//! Shared rayon pool for the bootstrap loop and the Mardia pair sum.

#[cfg(feature = "parallel")]
use rayon::ThreadPool;

#[cfg(feature = "parallel")]
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Environment variable overriding the number of worker threads.
pub const THREADS_ENV: &str = "SUNSPOT_CME_THREADS";

/// Lazily build the shared pool.
///
/// Thread count comes from `SUNSPOT_CME_THREADS` when set, otherwise one per
/// logical CPU. `None` if the pool could not be built, in which case work
/// runs on rayon's global pool.
#[cfg(feature = "parallel")]
fn thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            let mut builder = rayon::ThreadPoolBuilder::new()
                .thread_name(|i| format!("sunspot-cme-{i}"));
            if let Some(threads) = std::env::var(THREADS_ENV)
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
            {
                builder = builder.num_threads(threads);
            }
            match builder.build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    tracing::warn!(%err, "failed to build worker pool, using rayon global pool");
                    None
                }
            }
        })
        .as_ref()
}

/// Run a parallel operation on the shared pool.
#[cfg(feature = "parallel")]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Run the operation directly when the `parallel` feature is off.
#[cfg(not(feature = "parallel"))]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R,
{
    op()
}
