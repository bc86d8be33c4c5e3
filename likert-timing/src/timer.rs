use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Clock and single-shot delays used by the session
pub trait Timer: Clone + Send + Sync {
    /// Nanoseconds since the timer was created
    fn now(&self) -> u64;
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration);
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR, TIMER_ABSTIME};

        let mut deadline = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // Absolute deadline so an interrupted sleep resumes without drift
        unsafe {
            libc::clock_gettime(CLOCK_MONOTONIC, &mut deadline);
        }
        let nanos = deadline.tv_nsec as u64 + u64::from(duration.subsec_nanos());
        deadline.tv_sec += duration.as_secs() as libc::time_t + (nanos / 1_000_000_000) as libc::time_t;
        deadline.tv_nsec = (nanos % 1_000_000_000) as libc::c_long;

        loop {
            let rc = unsafe {
                clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &deadline, std::ptr::null_mut())
            };
            if rc != EINTR {
                break;
            }
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual clock: `sleep` returns immediately, advances `now`, and is recorded.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTimer {
    clock_ns: Arc<AtomicU64>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl SimulatedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.clock_ns
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Every delay requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl Timer for SimulatedTimer {
    fn now(&self) -> u64 {
        self.clock_ns.load(Ordering::SeqCst)
    }
    fn sleep(&self, d: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(d);
        }
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_sleep_advances_clock() {
        let timer = SimulatedTimer::new();
        let t0 = timer.now();
        timer.sleep(Duration::from_millis(500));
        timer.sleep(Duration::from_millis(1500));
        assert_eq!(timer.elapsed(t0), Duration::from_millis(2000));
        assert_eq!(
            timer.sleeps(),
            vec![Duration::from_millis(500), Duration::from_millis(1500)]
        );
    }

    #[test]
    fn clones_share_the_clock() {
        let timer = SimulatedTimer::new();
        let other = timer.clone();
        other.sleep(Duration::from_millis(3));
        assert_eq!(timer.now(), 3_000_000);
    }

    #[test]
    fn high_precision_sleep_waits_at_least_the_duration() {
        let timer = HighPrecisionTimer::new();
        let t0 = timer.now();
        timer.sleep(Duration::from_millis(2));
        assert!(timer.elapsed(t0) >= Duration::from_millis(2));
    }
}
