//! Host timer seam

use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Handle to a scheduled task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// One-shot timers driving local futures.
///
/// `schedule` must not run `task` synchronously; the earliest it may start
/// is the next turn of the host's event loop.
pub trait TimerHost {
    fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TimerHandle;

    /// Cancel a task that has not started. Unknown handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

impl<T: TimerHost + ?Sized> TimerHost for Rc<T> {
    fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TimerHandle {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: TimerHandle) {
        (**self).cancel(handle)
    }
}
