//! Timer scheduling capability.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Runs a task once after a delay.
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to start after `delay`.
    ///
    /// The returned handle can cancel the task as long as it has not started.
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TimerHandle;
}

/// Cancellation side of a scheduled task.
///
/// Dropping the handle detaches the task; it still fires.
pub struct TimerHandle {
    state: Arc<AtomicU8>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

/// Firing side of a scheduled task, owned by the scheduler implementation.
pub struct TimerGate {
    state: Arc<AtomicU8>,
}

impl TimerHandle {
    /// Creates a connected handle/gate pair in the pending state.
    pub fn pair() -> (TimerHandle, TimerGate) {
        let state = Arc::new(AtomicU8::new(PENDING));
        (
            TimerHandle {
                state: Arc::clone(&state),
                on_cancel: None,
            },
            TimerGate { state },
        )
    }

    /// Hook run when a pending timer is cancelled (e.g. abort the sleeping task).
    pub fn on_cancel(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }

    /// Cancels the task if it has not fired yet.
    ///
    /// Returns true when the task was prevented from running. A task that
    /// already fired is left to run to completion.
    pub fn cancel(mut self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if cancelled {
            if let Some(hook) = self.on_cancel.take() {
                hook();
            }
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::SeqCst) == PENDING
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::SeqCst) == FIRED
    }
}

impl TimerGate {
    /// Marks the timer as fired. Returns false if it was cancelled first.
    pub fn open(&self) -> bool {
        self.state
            .compare_exchange(PENDING, FIRED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Scheduler backed by `tokio::spawn` and `tokio::time::sleep`.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TimerHandle {
        let (handle, gate) = TimerHandle::pair();
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if gate.open() {
                task.await;
            }
        });
        let abort = join.abort_handle();
        handle.on_cancel(move || abort.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(counter: &Arc<AtomicUsize>) -> BoxFuture<'static, ()> {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_fires_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler.schedule(Duration::from_millis(100), counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(handle.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire_prevents_execution() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler.schedule(Duration::from_millis(100), counting_task(&counter));

        assert!(handle.cancel());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler.schedule(Duration::from_millis(10), counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.cancel());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_gate_refuses_after_cancel() {
        let (handle, gate) = TimerHandle::pair();
        assert!(handle.cancel());
        assert!(!gate.open());
    }
}
