//! Periodic refresh handle.
//!
//! A `Ticker` owns one repeating task on the current thread's `LocalSet`.
//! Callbacks may borrow `Rc<RefCell<_>>` state because they never leave
//! the thread that drives the widget. Stopping the ticker (or dropping it)
//! aborts the task so no further callbacks fire.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Ticker {
    name: &'static str,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            task: None,
        }
    }

    /// One-second ticker.
    pub fn every_second(name: &'static str) -> Self {
        Self::new(name, DEFAULT_PERIOD)
    }

    /// Whether callbacks are still scheduled.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Begin calling `on_tick` once per period, first call one period
    /// from now. Restarts the schedule if already active.
    ///
    /// Returning `ControlFlow::Break` from the callback ends the ticker.
    ///
    /// # Panics
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + 'static,
    {
        self.stop();
        let period = self.period;
        let name = self.name;
        tracing::debug!(ticker = name, ?period, "ticker started");
        self.task = Some(tokio::task::spawn_local(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    tracing::debug!(ticker = name, "ticker finished");
                    break;
                }
            }
        }));
    }

    /// Cancel pending callbacks. No-op when inactive.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(ticker = self.name, "ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period_until_stopped() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let count = Rc::new(Cell::new(0));
                let mut ticker = Ticker::every_second("test");
                let seen = Rc::clone(&count);
                ticker.start(move || {
                    seen.set(seen.get() + 1);
                    ControlFlow::Continue(())
                });
                assert!(ticker.is_active());

                time::sleep(Duration::from_millis(3_500)).await;
                assert_eq!(count.get(), 3);

                ticker.stop();
                assert!(!ticker.is_active());
                time::sleep(Duration::from_secs(5)).await;
                assert_eq!(count.get(), 3);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_ticker() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let count = Rc::new(Cell::new(0));
                let mut ticker = Ticker::every_second("test");
                let seen = Rc::clone(&count);
                ticker.start(move || {
                    seen.set(seen.get() + 1);
                    if seen.get() == 2 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                });

                time::sleep(Duration::from_secs(10)).await;
                assert_eq!(count.get(), 2);
                assert!(!ticker.is_active());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_schedule() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let first = Rc::new(Cell::new(0));
                let second = Rc::new(Cell::new(0));
                let mut ticker = Ticker::every_second("test");

                let seen = Rc::clone(&first);
                ticker.start(move || {
                    seen.set(seen.get() + 1);
                    ControlFlow::Continue(())
                });
                let seen = Rc::clone(&second);
                ticker.start(move || {
                    seen.set(seen.get() + 1);
                    ControlFlow::Continue(())
                });

                time::sleep(Duration::from_millis(2_500)).await;
                assert_eq!(first.get(), 0);
                assert_eq!(second.get(), 2);
            })
            .await;
    }
}
