//! Where resolvers run.
//!
//! The executor hands every resolver call to an [`ExecutionStrategy`]. The
//! strategy decides whether the call runs right away, on another thread, or
//! on an async runtime, and reports back a [`Resolution`].

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use futures::{
    FutureExt as _,
    channel::oneshot,
    executor::{ThreadPool, block_on},
};

use crate::executor::{FieldError, Resolution};

/// A resolver call, with its source, arguments and info already bound.
pub type ResolverCall = Box<dyn FnOnce() -> Resolution + Send>;

/// Scheduler of resolver calls.
pub trait ExecutionStrategy: Send + Sync {
    /// Runs or schedules `call`.
    fn execute(&self, call: ResolverCall) -> Resolution;

    /// Blocks until no call scheduled by this strategy is outstanding, or
    /// until `timeout` elapses.
    ///
    /// Returns `false` on timeout.
    fn wait_until_finished(&self, timeout: Option<Duration>) -> bool {
        let _ = timeout;
        true
    }
}

/// Runs every resolver immediately on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncStrategy;

impl ExecutionStrategy for SyncStrategy {
    fn execute(&self, call: ResolverCall) -> Resolution {
        call()
    }
}

/// Number of calls in flight, with a way to wait for it to reach zero.
#[derive(Debug, Default)]
struct Outstanding {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Outstanding {
    fn start(self: &Arc<Self>) -> OutstandingGuard {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        OutstandingGuard(Arc::clone(self))
    }

    fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            match deadline {
                None => {
                    count = self.idle.wait(count).unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                        return false;
                    };
                    count = self
                        .idle
                        .wait_timeout(count, left)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        true
    }
}

/// Decrements the counter when the call finishes, even by panicking.
struct OutstandingGuard(Arc<Outstanding>);

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.0.idle.notify_all();
        }
    }
}

fn receive(rx: oneshot::Receiver<Result<crate::executor::FieldValue, FieldError>>) -> Resolution {
    Resolution::pending(rx.map(|r| {
        r.unwrap_or_else(|_| Err(FieldError::from("Resolver terminated without a result.")))
    }))
}

/// Runs every resolver on a thread of its own.
///
/// Asynchronous resolvers are driven to completion on that thread.
#[derive(Debug, Default)]
pub struct ThreadStrategy {
    outstanding: Arc<Outstanding>,
}

impl ThreadStrategy {
    /// Creates a new [`ThreadStrategy`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionStrategy for ThreadStrategy {
    fn execute(&self, call: ResolverCall) -> Resolution {
        let (tx, rx) = oneshot::channel();
        let guard = self.outstanding.start();
        let spawned = thread::Builder::new()
            .name("graphql-resolver".into())
            .spawn(move || {
                let _guard = guard;
                let result = block_on(call().resolve());
                // The receiver is gone when the request was abandoned.
                let _ = tx.send(result);
            });
        match spawned {
            Ok(_) => receive(rx),
            Err(e) => Resolution::Ready(Err(FieldError::from(format!(
                "Failed to spawn resolver thread: {e}",
            )))),
        }
    }

    fn wait_until_finished(&self, timeout: Option<Duration>) -> bool {
        self.outstanding.wait(timeout)
    }
}

/// Runs resolvers on a [`ThreadPool`].
#[derive(Debug)]
pub struct ThreadPoolStrategy {
    pool: ThreadPool,
    outstanding: Arc<Outstanding>,
}

impl ThreadPoolStrategy {
    /// Wraps an existing pool.
    pub fn new(pool: ThreadPool) -> Self {
        Self {
            pool,
            outstanding: Arc::default(),
        }
    }

    /// Creates a pool with one thread per CPU.
    ///
    /// # Errors
    ///
    /// Fails if the threads cannot be spawned.
    pub fn with_default_pool() -> std::io::Result<Self> {
        ThreadPool::builder()
            .name_prefix("graphql-resolver-")
            .create()
            .map(Self::new)
    }
}

impl ExecutionStrategy for ThreadPoolStrategy {
    fn execute(&self, call: ResolverCall) -> Resolution {
        let (tx, rx) = oneshot::channel();
        let guard = self.outstanding.start();
        self.pool.spawn_ok(async move {
            let _guard = guard;
            let result = call().resolve().await;
            let _ = tx.send(result);
        });
        receive(rx)
    }

    fn wait_until_finished(&self, timeout: Option<Duration>) -> bool {
        self.outstanding.wait(timeout)
    }
}

#[cfg(feature = "tokio")]
pub use self::tokio_strategy::TokioStrategy;

#[cfg(feature = "tokio")]
mod tokio_strategy {
    use std::{sync::Arc, time::Duration};

    use futures::FutureExt as _;
    use tokio::runtime::Handle;

    use super::{ExecutionStrategy, Outstanding, ResolverCall};
    use crate::executor::{FieldError, Resolution};

    /// Calls resolvers in place, and spawns the futures of asynchronous
    /// ones on a Tokio runtime.
    #[derive(Debug)]
    pub struct TokioStrategy {
        handle: Handle,
        outstanding: Arc<Outstanding>,
    }

    impl TokioStrategy {
        /// Spawns on the runtime behind `handle`.
        pub fn new(handle: Handle) -> Self {
            Self {
                handle,
                outstanding: Arc::default(),
            }
        }

        /// Spawns on the runtime this is called from.
        ///
        /// # Panics
        ///
        /// Panics when called outside of a Tokio runtime.
        pub fn current() -> Self {
            Self::new(Handle::current())
        }
    }

    impl ExecutionStrategy for TokioStrategy {
        fn execute(&self, call: ResolverCall) -> Resolution {
            match call() {
                ready @ Resolution::Ready(_) => ready,
                Resolution::Pending(fut) => {
                    let guard = self.outstanding.start();
                    let task = self.handle.spawn(async move {
                        let _guard = guard;
                        fut.await
                    });
                    Resolution::pending(task.map(|joined| {
                        joined.unwrap_or_else(|e| {
                            Err(FieldError::from(format!("Resolver task failed: {e}")))
                        })
                    }))
                }
            }
        }

        fn wait_until_finished(&self, timeout: Option<Duration>) -> bool {
            self.outstanding.wait(timeout)
        }
    }
}
