//! Continuous Background Sampling
//!
//! ## Overview
//!
//! A [`ContinuousReader`] owns one [`Transducer`] and samples it on a thread
//! of its own. The newest decoded sample sits in a single-slot cell behind a
//! value lock; accessors copy it out and return immediately, never touching
//! the bus.
//!
//! ```text
//!  enable()                     sampling thread
//!  ────────                     ───────────────
//!  probe() ──ok──> spawn ─────> loop {
//!                                  select()     ── err: warn, back off, retry
//!                                  read_raw()   ── err: warn, skip sample
//!                                  *latest = sample   (value lock)
//!                                  wait interval or stop signal
//!                               }
//!                               close(); hand transducer back
//! ```
//!
//! ## Cancellation
//!
//! The loop waits on a channel between samples. `disable()` closes that
//! channel and returns at once; the loop observes the closure at its next
//! iteration boundary, after the in-flight sample has been stored. Dropping
//! the reader disables it and joins the thread, so no sampling loop outlives
//! its reader.
//!
//! ## Locks
//!
//! - *value lock*: guards the latest sample. Written only by the sampling
//!   thread, read by anyone.
//! - *control lock*: guards the thread handle and stop channel. Taken by
//!   `enable`, `disable` and `wait`, never by accessors. It is never held
//!   while joining, so `disable()` can always stop a loop another thread is
//!   waiting on.
//!
//! The transducer is handed to the sampling thread after it has started and
//! comes back when the thread is joined, ready for the next `enable()`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::traits::Transducer;

/// Background sampler for one transducer
pub struct ContinuousReader<T: Transducer> {
    name: &'static str,
    address: u8,
    latest: Arc<Mutex<T::Sample>>,
    control: Mutex<Control<T>>,
    /// Signalled whenever a join hands the transducer back
    returned: Condvar,
}

struct Control<T: Transducer> {
    /// Present while no sampling thread owns it
    transducer: Option<T>,
    /// Dropping the sender is the stop signal
    stop: Option<Sender<()>>,
    /// Taken out by whoever joins the thread
    handle: Option<JoinHandle<Option<T>>>,
    /// Threads currently joining a handle taken out of `handle`
    joiners: usize,
}

impl<T: Transducer> Control<T> {
    fn is_running(&self) -> bool {
        self.stop.is_some() && self.handle.as_ref().map_or(true, |handle| !handle.is_finished())
    }
}

impl<T: Transducer> ContinuousReader<T> {
    /// Wrap `transducer`; the reader starts disabled
    pub fn new(transducer: T) -> Self {
        Self {
            name: transducer.name(),
            address: transducer.address(),
            latest: Arc::new(Mutex::new(T::Sample::default())),
            control: Mutex::new(Control {
                transducer: Some(transducer),
                stop: None,
                handle: None,
                joiners: 0,
            }),
            returned: Condvar::new(),
        }
    }

    /// Device name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Device bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Probe the device and start sampling
    ///
    /// Returns `false` if the device does not answer, in which case no thread
    /// is started. Enabling a running reader is a no-op returning `true`.
    pub fn enable(&self) -> bool {
        let mut control = lock(&self.control);

        // A previous loop may still be finishing its last sample
        let mut transducer = loop {
            if control.is_running() {
                return true;
            }
            if let Some(transducer) = control.transducer.take() {
                break transducer;
            }
            if let Some(handle) = control.handle.take() {
                control.stop = None;
                control = self.join(control, handle);
            } else if control.joiners > 0 {
                control = self.returned.wait(control).unwrap_or_else(PoisonError::into_inner);
            } else {
                warn!("{}: transducer lost, cannot enable", self.name);
                return false;
            }
        };

        if !transducer.probe() {
            warn!("{} is not available at 0x{:02x}", self.name, self.address);
            control.transducer = Some(transducer);
            return false;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let (handoff_tx, handoff_rx) = mpsc::channel::<T>();
        let latest = Arc::clone(&self.latest);
        let spawned = spawn_sampler(self.name, move || -> Option<T> {
            let transducer = handoff_rx.recv().ok()?;
            Some(sample_loop(transducer, stop_rx, latest))
        });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                warn!("{}: could not start sampling thread: {}", self.name, err);
                control.transducer = Some(transducer);
                return false;
            }
        };

        match handoff_tx.send(transducer) {
            Ok(()) => {
                control.stop = Some(stop_tx);
                control.handle = Some(handle);
                true
            }
            Err(SendError(transducer)) => {
                warn!("{}: sampling thread exited before it started", self.name);
                control.transducer = Some(transducer);
                let _ = handle.join();
                false
            }
        }
    }

    /// Ask the sampling loop to stop without waiting for it
    pub fn disable(&self) {
        if lock(&self.control).stop.take().is_some() {
            debug!("{}: disable measurements", self.name);
        }
    }

    /// Block until the sampling loop has exited
    ///
    /// Returns once the loop stops, which happens after a
    /// [`ContinuousReader::disable`] from this or any other thread.
    pub fn wait(&self) {
        let mut control = lock(&self.control);
        loop {
            if let Some(handle) = control.handle.take() {
                drop(self.join(control, handle));
                return;
            }
            if control.joiners == 0 {
                return;
            }
            // Another thread is joining; its return is ours too
            control = self.returned.wait(control).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// True while a sampling loop is running and has not been asked to stop
    pub fn is_running(&self) -> bool {
        lock(&self.control).is_running()
    }

    /// True while any sampling thread exists, stopping or not
    pub fn is_active(&self) -> bool {
        let control = lock(&self.control);
        control.joiners > 0 || control.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Latest sample, or the sample type's default before the first read
    pub fn current(&self) -> T::Sample {
        *lock(&self.latest)
    }

    /// Join `handle` with the control lock released and take the transducer
    /// back
    fn join<'a>(
        &'a self,
        mut control: MutexGuard<'a, Control<T>>,
        handle: JoinHandle<Option<T>>,
    ) -> MutexGuard<'a, Control<T>> {
        control.joiners += 1;
        drop(control);

        let joined = handle.join();

        let mut control = lock(&self.control);
        control.joiners -= 1;
        // No other loop can start while the transducer is out
        control.stop = None;
        match joined {
            Ok(Some(transducer)) => control.transducer = Some(transducer),
            Ok(None) => {}
            Err(_) => warn!("{}: sampling thread panicked", self.name),
        }
        self.returned.notify_all();
        control
    }
}

impl<T: Transducer> Drop for ContinuousReader<T> {
    fn drop(&mut self) {
        self.disable();
        self.wait();
    }
}

#[cfg(test)]
thread_local! {
    static REFUSE_SPAWN: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

fn spawn_sampler<T: Send + 'static>(
    name: &str,
    body: impl FnOnce() -> T + Send + 'static,
) -> std::io::Result<JoinHandle<T>> {
    #[cfg(test)]
    if REFUSE_SPAWN.with(|refuse| refuse.get()) {
        return Err(std::io::Error::new(std::io::ErrorKind::WouldBlock, "thread limit reached"));
    }
    thread::Builder::new().name(format!("airguard-{}", name.to_lowercase())).spawn(body)
}

fn sample_loop<T: Transducer>(
    mut transducer: T,
    stop: Receiver<()>,
    latest: Arc<Mutex<T::Sample>>,
) -> T {
    let name = transducer.name();
    let address = transducer.address();
    debug!("{}: start reading values at 0x{:02x}", name, address);

    loop {
        if let Err(err) = transducer.select() {
            warn!("{}: {}", name, err);
            if stop_requested(&stop, transducer.backoff_interval()) {
                break;
            }
            continue;
        }

        match transducer.read_raw() {
            Ok(sample) => *lock(&latest) = sample,
            Err(err) => warn!("{}: could not read sample: {}", name, err),
        }

        if stop_requested(&stop, transducer.sample_interval()) {
            break;
        }
    }

    transducer.close();
    debug!("{}: reading thread finished", name);
    transducer
}

/// Sleep for `interval`, waking early when the stop channel closes
fn stop_requested(stop: &Receiver<()>, interval: Duration) -> bool {
    match stop.recv_timeout(interval) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        Err(RecvTimeoutError::Timeout) => false,
    }
}

/// Guarded values are overwrite-only cells, so a poisoned lock still holds
/// a consistent value
fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
