//! Execution backends for tile fetches
//!
//! Fetches are the only work allowed off the owning context. A
//! [`FetchExecutor`] decides where they run: a small pool of worker threads,
//! the tokio blocking pool, or inline on the caller (deterministic, for tests
//! and for providers that only touch memory).

use crate::core::config::TileLoadingConfig;
use crossbeam_channel::{unbounded, Sender};

/// A unit of fetch work
pub type FetchJob = Box<dyn FnOnce() + Send + 'static>;

/// Where tile fetches run
#[derive(Debug, Clone)]
pub enum FetchExecutor {
    /// Fixed pool of worker threads fed by a channel
    ThreadPool(ThreadPool),
    /// `spawn_blocking` on a tokio runtime
    #[cfg(feature = "tokio-runtime")]
    Tokio(tokio::runtime::Handle),
    /// Run on the calling thread; the result is still delivered through the
    /// loader's channel and applied on the next poll
    Inline,
}

impl FetchExecutor {
    pub fn thread_pool(workers: usize) -> Self {
        Self::ThreadPool(ThreadPool::new(workers))
    }

    pub fn inline() -> Self {
        Self::Inline
    }

    #[cfg(feature = "tokio-runtime")]
    pub fn tokio(handle: tokio::runtime::Handle) -> Self {
        Self::Tokio(handle)
    }

    /// The ambient tokio runtime when there is one, a thread pool otherwise
    pub fn from_config(config: &TileLoadingConfig) -> Self {
        #[cfg(feature = "tokio-runtime")]
        {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                return Self::Tokio(handle);
            }
        }
        Self::thread_pool(config.worker_count)
    }

    pub fn execute(&self, job: FetchJob) {
        match self {
            FetchExecutor::ThreadPool(pool) => pool.execute(job),
            #[cfg(feature = "tokio-runtime")]
            FetchExecutor::Tokio(handle) => {
                handle.spawn_blocking(job);
            }
            FetchExecutor::Inline => job(),
        }
    }
}

/// Worker threads pulling jobs off an unbounded channel. Workers exit once
/// every handle to the pool has been dropped.
#[derive(Debug, Clone)]
pub struct ThreadPool {
    task_tx: Sender<FetchJob>,
    workers: usize,
}

impl ThreadPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (task_tx, task_rx) = unbounded::<FetchJob>();

        for index in 0..workers {
            let task_rx = task_rx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("tileview-fetch-{index}"))
                .spawn(move || {
                    while let Ok(job) = task_rx.recv() {
                        job();
                    }
                    log::debug!("fetch worker {} exiting", index);
                });
            if let Err(e) = spawned {
                log::error!("failed to spawn fetch worker {}: {}", index, e);
            }
        }

        Self { task_tx, workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn execute(&self, job: FetchJob) {
        if let Err(e) = self.task_tx.send(job) {
            // Every worker is gone; better late than never
            log::warn!("fetch pool unavailable, running job on caller");
            (e.into_inner())();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_inline_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        FetchExecutor::inline().execute(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_pool_runs_jobs() {
        let executor = FetchExecutor::thread_pool(2);
        let (done_tx, done_rx) = unbounded();
        for i in 0..8 {
            let done_tx = done_tx.clone();
            executor.execute(Box::new(move || {
                let _ = done_tx.send(i);
            }));
        }

        let mut seen: Vec<i32> = (0..8)
            .map(|_| done_rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test(flavor = "multi_thread")]
    async fn test_from_config_picks_ambient_tokio() {
        let executor = FetchExecutor::from_config(&TileLoadingConfig::default());
        assert!(matches!(executor, FetchExecutor::Tokio(_)));
    }

    #[test]
    fn test_from_config_without_runtime_uses_pool() {
        let executor = FetchExecutor::from_config(&TileLoadingConfig::for_testing());
        match executor {
            FetchExecutor::ThreadPool(pool) => assert_eq!(pool.workers(), 1),
            other => panic!("unexpected executor {:?}", other),
        }
    }
}
