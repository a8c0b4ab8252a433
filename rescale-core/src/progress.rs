use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Byte progress of one job, written by the worker and read by a poller.
///
/// Only atomicity of each update is guaranteed; there is no ordering between
/// the worker's adds and a concurrent snapshot beyond that.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    processed: AtomicU64,
    total: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.processed as f64 / self.total as f64
    }
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new job: `processed` back to 0, `total` fixed to the source length.
    pub fn reset(&self, total: u64) {
        self.processed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    /// Current processed count, capped at `total`.
    ///
    /// The OBJ line accounting may overshoot the file size; capping keeps the
    /// polled value non-decreasing across the final `complete()`.
    pub fn snapshot(&self) -> u64 {
        let total = self.total.load(Ordering::Relaxed);
        self.processed.load(Ordering::Relaxed).min(total)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            processed: self.snapshot(),
            total: self.total(),
        }
    }

    pub fn fraction(&self) -> f64 {
        self.progress().fraction()
    }

    /// Pins `processed` to `total` exactly.
    pub fn complete(&self) {
        let total = self.total.load(Ordering::Relaxed);
        self.processed.store(total, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn reset_add_complete() {
        let p = ProgressCounter::new();
        p.reset(100);
        p.add(30);
        p.add(20);
        assert_eq!(p.snapshot(), 50);
        assert!((p.fraction() - 0.5).abs() < f64::EPSILON);
        p.complete();
        assert_eq!(p.snapshot(), 100);

        p.reset(10);
        assert_eq!(p.progress(), Progress { processed: 0, total: 10 });
    }

    #[test]
    fn overshoot_is_capped() {
        let p = ProgressCounter::new();
        p.reset(10);
        p.add(14);
        assert_eq!(p.snapshot(), 10);
        p.complete();
        assert_eq!(p.snapshot(), 10);
    }

    #[test]
    fn empty_total_reports_zero_fraction() {
        let p = ProgressCounter::new();
        p.reset(0);
        assert_eq!(p.fraction(), 0.0);
    }

    #[test]
    fn concurrent_reader_sees_monotonic_values() {
        let p = Arc::new(ProgressCounter::new());
        p.reset(100_000);
        let writer = {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                for _ in 0..100_000 {
                    p.add(1);
                }
            })
        };
        let mut last = 0;
        while !writer.is_finished() {
            let now = p.snapshot();
            assert!(now >= last);
            last = now;
        }
        writer.join().unwrap();
        assert_eq!(p.snapshot(), 100_000);
    }
}
