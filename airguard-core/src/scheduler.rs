//! Periodic measurement ticks
//!
//! [`IntervalScheduler`] is the std-thread implementation of
//! [`Scheduler`]: each registration gets a timer thread that waits on a
//! channel for one period, runs the task on timeout and exits when the
//! channel closes. Unregistering (or dropping the scheduler) closes the
//! channel and joins the thread, so a task never runs after `unregister`
//! returns.
//!
//! A task must not unregister itself; the join would wait on its own thread.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::errors::SchedulerError;
use crate::station::Station;
use crate::traits::{Scheduler, TimerHandle};

struct Timer {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Thread-per-timer scheduler
#[derive(Default)]
pub struct IntervalScheduler {
    next_id: u64,
    timers: HashMap<u64, Timer>,
}

impl IntervalScheduler {
    /// Scheduler with no timers
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True when no timer is registered
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Scheduler for IntervalScheduler {
    fn register(
        &mut self,
        period: Duration,
        mut task: Box<dyn FnMut() + Send>,
    ) -> Result<TimerHandle, SchedulerError> {
        let id = self.next_id;
        let (stop, ticks) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(format!("airguard-timer-{}", id))
            .spawn(move || loop {
                match ticks.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => task(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|err| {
                warn!("Could not start timer thread: {}", err);
                SchedulerError::Spawn
            })?;

        self.next_id += 1;
        self.timers.insert(id, Timer { stop, handle });
        debug!("Registered timer {} every {:?}", id, period);
        Ok(TimerHandle(id))
    }

    fn unregister(&mut self, handle: TimerHandle) {
        let Some(timer) = self.timers.remove(&handle.0) else {
            return;
        };
        drop(timer.stop);
        if timer.handle.join().is_err() {
            warn!("Timer {} panicked", handle.0);
        }
        debug!("Unregistered timer {}", handle.0);
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        let ids: Vec<u64> = self.timers.keys().copied().collect();
        for id in ids {
            self.unregister(TimerHandle(id));
        }
    }
}

/// Call [`Station::measure`] every configured measure period
pub fn schedule_station<S: Scheduler + ?Sized>(
    scheduler: &mut S,
    station: Arc<Mutex<Station>>,
) -> Result<TimerHandle, SchedulerError> {
    let period = station.lock().unwrap_or_else(PoisonError::into_inner).measure_period();
    scheduler.register(
        period,
        Box::new(move || {
            station.lock().unwrap_or_else(PoisonError::into_inner).measure();
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn counting_task(count: &Arc<AtomicUsize>) -> Box<dyn FnMut() + Send> {
        let count = Arc::clone(count);
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn wait_for(count: &AtomicUsize, target: usize) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(2) {
            if count.load(Ordering::SeqCst) >= target {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn ticks_until_unregistered() {
        let mut scheduler = IntervalScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.register(Duration::from_millis(2), counting_task(&count)).unwrap();

        assert!(wait_for(&count, 3));
        scheduler.unregister(handle);
        assert!(scheduler.is_empty());

        let after = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after);
    }

    #[test]
    fn timers_are_independent() {
        let mut scheduler = IntervalScheduler::new();
        let fast = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));
        let fast_handle = scheduler.register(Duration::from_millis(2), counting_task(&fast)).unwrap();
        let slow_handle = scheduler.register(Duration::from_secs(3600), counting_task(&slow)).unwrap();
        assert_ne!(fast_handle, slow_handle);

        assert!(wait_for(&fast, 2));
        scheduler.unregister(fast_handle);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(slow.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_handle_is_ignored() {
        let mut scheduler = IntervalScheduler::new();
        scheduler.unregister(TimerHandle(42));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn drop_stops_every_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let mut scheduler = IntervalScheduler::new();
            scheduler.register(Duration::from_millis(2), counting_task(&count)).unwrap();
            // Hour-long timers still stop promptly
            scheduler.register(Duration::from_secs(3600), counting_task(&count)).unwrap();
            assert!(wait_for(&count, 1));
        }
        let after = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after);
    }
}
