//! Debounce primitive.
//!
//! Collapses a burst of `trigger` calls into one delayed call of the wrapped
//! operation, carrying the arguments of the last call in the burst.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, warn};

use super::scheduler::{Scheduler, TimerHandle};

type Operation<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

/// The armed countdown, if any.
struct Pending<A> {
    /// Bumped on every trigger/cancel; a timer only fires for its own sequence.
    seq: u64,
    args: Option<A>,
    timer: Option<TimerHandle>,
}

/// Wraps an async operation so bursts of calls run it once.
///
/// - Each `trigger` restarts the countdown and replaces the pending arguments.
/// - The operation runs once the delay elapses with no further trigger.
/// - Continuous triggering faster than the delay never runs the operation.
/// - `cancel` drops the pending arguments without running anything.
///
/// An operation that already started is not interrupted by later triggers.
pub struct Debouncer<A: Send + 'static> {
    scheduler: Arc<dyn Scheduler>,
    delay: Duration,
    op: Operation<A>,
    pending: Arc<Mutex<Pending<A>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F, Fut>(scheduler: Arc<dyn Scheduler>, delay: Duration, op: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            scheduler,
            delay,
            op: Arc::new(move |args: A| -> BoxFuture<'static, ()> { op(args).boxed() }),
            pending: Arc::new(Mutex::new(Pending {
                seq: 0,
                args: None,
                timer: None,
            })),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restarts the countdown with `args` as the arguments to deliver.
    pub fn trigger(&self, args: A) {
        let mut pending = lock_pending(&self.pending);
        pending.seq += 1;
        let seq = pending.seq;
        pending.args = Some(args);
        if let Some(timer) = pending.timer.take() {
            timer.cancel();
        }

        let slot = Arc::clone(&self.pending);
        let op = Arc::clone(&self.op);
        let task = async move {
            let args = {
                let mut pending = lock_pending(&slot);
                if pending.seq != seq {
                    return;
                }
                pending.timer = None;
                pending.args.take()
            };
            if let Some(args) = args {
                debug!("Debounce window elapsed, running operation (seq {})", seq);
                op(args).await;
            }
        }
        .boxed();

        pending.timer = Some(self.scheduler.schedule(self.delay, task));
    }

    /// Aborts the pending countdown, if any. Returns true if something was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = lock_pending(&self.pending);
        pending.seq += 1;
        let had_args = pending.args.take().is_some();
        if let Some(timer) = pending.timer.take() {
            timer.cancel();
        }
        had_args
    }

    /// Whether a countdown is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        lock_pending(&self.pending).args.is_some()
    }
}

impl<A: Send + 'static> Drop for Debouncer<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock_pending<A>(pending: &Mutex<Pending<A>>) -> MutexGuard<'_, Pending<A>> {
    pending.lock().unwrap_or_else(|poisoned| {
        warn!("Debounce state mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}
