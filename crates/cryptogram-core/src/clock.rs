//! Cancellable periodic ticker backing the session timer.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default tick period of the session timer
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background worker that emits one tick per period until cancelled.
///
/// Ticks queue up on a channel and are collected with [`Ticker::drain`], so
/// the owner stays the single mutator of whatever the ticks count. Dropping
/// the ticker cancels it and joins the worker.
pub struct Ticker {
    stop: Arc<(Mutex<bool>, Condvar)>,
    ticks: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(period: Duration) -> Self {
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let (tx, ticks) = mpsc::channel();

        let worker_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let (lock, cvar) = &*worker_stop;
            let Ok(mut stopped) = lock.lock() else {
                return;
            };
            loop {
                let Ok((guard, _)) = cvar.wait_timeout_while(stopped, period, |s| !*s) else {
                    return;
                };
                stopped = guard;
                if *stopped || tx.send(()).is_err() {
                    return;
                }
            }
        });

        Self {
            stop,
            ticks,
            handle: Some(handle),
        }
    }

    /// Collect the ticks emitted since the last call
    pub fn drain(&self) -> u64 {
        let mut count = 0;
        loop {
            match self.ticks.try_recv() {
                Ok(()) => count += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return count,
            }
        }
    }

    /// Stop the worker and wait for it to exit. Pending ticks are discarded.
    pub fn cancel(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        {
            let (lock, cvar) = &*self.stop;
            if let Ok(mut stopped) = lock.lock() {
                *stopped = true;
            }
            cvar.notify_all();
        }
        let _ = handle.join();
        while self.ticks.try_recv().is_ok() {}
    }

    /// Whether the worker is still alive
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_ticker_emits_ticks() {
        let ticker = Ticker::spawn(Duration::from_millis(5));
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut total = 0;
        while total < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
            total += ticker.drain();
        }
        assert!(total >= 3);
    }

    #[test]
    fn test_cancel_stops_worker() {
        let mut ticker = Ticker::spawn(Duration::from_millis(5));
        assert!(ticker.is_running());

        ticker.cancel();
        assert!(!ticker.is_running());

        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticker.drain(), 0);

        // Second cancel is a no-op
        ticker.cancel();
    }

    #[test]
    fn test_cancel_is_prompt_with_long_period() {
        let mut ticker = Ticker::spawn(Duration::from_secs(3600));
        let start = Instant::now();
        ticker.cancel();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!ticker.is_running());
    }

    #[test]
    fn test_drop_releases_worker() {
        let stop;
        {
            let ticker = Ticker::spawn(Duration::from_millis(5));
            stop = Arc::clone(&ticker.stop);
        }
        // Only our clone remains once the worker has exited
        assert_eq!(Arc::strong_count(&stop), 1);
        assert!(*stop.0.lock().unwrap());
    }
}
