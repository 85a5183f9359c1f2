//! Deterministic doubles for the studio's seams
//!
//! [`ManualTimers`] is a virtual clock; [`RecordingLink`] captures every
//! page command. Both are single-threaded and never touch real time.

use std::cell::{Cell, RefCell};
use std::task::{Context, Poll};
use std::time::Duration;

use ab_ipc::{AnimationData, CommandAck, TargetElement};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::task::noop_waker;
use futures::FutureExt;

use crate::{PageLink, TimerHandle, TimerHost};

struct Scheduled {
    handle: TimerHandle,
    due: Duration,
    task: LocalBoxFuture<'static, ()>,
}

/// Virtual-clock [`TimerHost`].
///
/// Nothing runs until [`ManualTimers::advance`]. Due tasks fire in due-time
/// order, ties in scheduling order. Tasks are polled with a no-op waker; one
/// that stays pending is polled again on every later `advance`.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    next_handle: Cell<u64>,
    scheduled: RefCell<Vec<Scheduled>>,
    running: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Tasks scheduled and not yet fired or cancelled
    pub fn pending_count(&self) -> usize {
        self.scheduled.borrow().len()
    }

    /// Move the clock forward, firing everything due on the way
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(next) = self.take_next_due(target) {
            if next.due > self.now.get() {
                self.now.set(next.due);
            }
            self.poll_task(next.task);
        }
        self.now.set(target);

        let running: Vec<_> = self.running.borrow_mut().drain(..).collect();
        for task in running {
            self.poll_task(task);
        }
    }

    fn take_next_due(&self, target: Duration) -> Option<Scheduled> {
        let mut scheduled = self.scheduled.borrow_mut();
        let index = scheduled
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= target)
            .min_by_key(|(_, s)| (s.due, s.handle.0))
            .map(|(i, _)| i)?;
        Some(scheduled.remove(index))
    }

    fn poll_task(&self, mut task: LocalBoxFuture<'static, ()>) {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        if let Poll::Pending = task.poll_unpin(&mut cx) {
            self.running.borrow_mut().push(task);
        }
    }
}

impl TimerHost for ManualTimers {
    fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.scheduled.borrow_mut().push(Scheduled {
            handle,
            due: self.now.get() + delay,
            task,
        });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.scheduled.borrow_mut().retain(|s| s.handle != handle);
    }
}

/// A call received by [`RecordingLink`]
#[derive(Clone, Debug, PartialEq)]
pub enum LinkCall {
    StartSelection,
    StopSelection,
    Animate {
        selector: String,
        animation: AnimationData,
    },
    Reset {
        selector: String,
    },
    PageElements,
}

/// [`PageLink`] that records calls and answers from canned data
#[derive(Default)]
pub struct RecordingLink {
    calls: RefCell<Vec<LinkCall>>,
    elements: RefCell<Vec<TargetElement>>,
    failing: Cell<bool>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements returned by `page_elements`
    pub fn with_elements(elements: Vec<TargetElement>) -> Self {
        let link = Self::default();
        *link.elements.borrow_mut() = elements;
        link
    }

    /// Make every ack report failure
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<LinkCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, call: LinkCall) -> CommandAck {
        self.calls.borrow_mut().push(call);
        if self.failing.get() {
            CommandAck {
                success: false,
                error: Some("link down".to_string()),
            }
        } else {
            CommandAck {
                success: true,
                error: None,
            }
        }
    }
}

#[async_trait(?Send)]
impl PageLink for RecordingLink {
    async fn start_element_selection(&self) -> CommandAck {
        self.record(LinkCall::StartSelection)
    }

    async fn stop_element_selection(&self) -> CommandAck {
        self.record(LinkCall::StopSelection)
    }

    async fn animate_element(&self, selector: &str, animation: &AnimationData) -> CommandAck {
        self.record(LinkCall::Animate {
            selector: selector.to_string(),
            animation: animation.clone(),
        })
    }

    async fn reset_element(&self, selector: &str) -> CommandAck {
        self.record(LinkCall::Reset {
            selector: selector.to_string(),
        })
    }

    async fn page_elements(&self) -> Vec<TargetElement> {
        self.calls.borrow_mut().push(LinkCall::PageElements);
        if self.failing.get() {
            return Vec::new();
        }
        self.elements.borrow().clone()
    }
}
