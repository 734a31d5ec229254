//! Real-time timers for hosted sessions.
//!
//! A timer is a sleeping task that, when it wakes, posts a [`TimerFired`]
//! message. The dispatcher job hands the message back to the owning session
//! through the registry; sessions ignore ids they are no longer waiting for.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use uuid::Uuid;
use vocab_study::{CancelHandle, Scheduler, TimerId};

/// A timer that came due for `session_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub session_id: Uuid,
    pub timer: TimerId,
}

#[derive(Debug)]
pub struct TokioScheduler {
    session_id: Uuid,
    tx: UnboundedSender<TimerFired>,
    tasks: HashMap<CancelHandle, JoinHandle<()>>,
    next_handle: u64,
}

impl TokioScheduler {
    pub fn new(session_id: Uuid, tx: UnboundedSender<TimerFired>) -> Self {
        Self {
            session_id,
            tx,
            tasks: HashMap::new(),
            next_handle: 0,
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&mut self, delay: Duration, timer: TimerId) -> CancelHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_handle += 1;
        let handle = CancelHandle(self.next_handle);
        let tx = self.tx.clone();
        let fired = TimerFired {
            session_id: self.session_id,
            timer,
        };

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(fired).is_err() {
                tracing::debug!(session_id = %fired.session_id, "timer dispatcher gone");
            }
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: CancelHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
