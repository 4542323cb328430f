/// Scheduled callbacks. A Timer owns its task: cancelling or dropping the Timer
/// aborts the task, so nothing fires against a session that has gone away.
use std::{future::Future, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

#[derive(Debug)]
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    /// Runs `task` once after `delay`.
    pub fn after<F>(delay: Duration, task: F) -> Timer
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Timer {
            handle: tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                task.await;
            }),
        }
    }

    /// Calls `tick` right away and then every `period`. A tick that runs long
    /// pushes the next one back instead of bunching them up.
    pub fn every<F, Fut>(period: Duration, mut tick: F) -> Timer
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Timer {
            handle: tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    tick().await;
                }
            }),
        }
    }

    pub fn cancel(self) {}

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
