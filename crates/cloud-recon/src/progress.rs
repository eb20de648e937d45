//! Progress reporting and cooperative cancellation.
//!
//! The distance-sampling stage can dominate wall-clock time for fine sample
//! spacings, so every pipeline stage polls a cancellation check once per
//! outer-loop iteration. Cancellation is cooperative: a callback returning
//! `false` aborts the run with [`ReconError::Cancelled`](crate::ReconError).
//!
//! # Example
//!
//! ```ignore
//! use cloud_recon::progress::ProgressCallback;
//!
//! let callback: ProgressCallback = Box::new(|progress| {
//!     println!("{}% - {}", progress.percent(), progress.message);
//!     true // Continue (return false to cancel)
//! });
//!
//! let result = cloud_recon::reconstruct_field_with_progress(&cloud, &params, Some(&callback))?;
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress information passed to callbacks.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Current step (0-based).
    pub current: u64,

    /// Total number of steps.
    pub total: u64,

    /// Human-readable message describing the current stage.
    pub message: String,

    /// Elapsed time since the stage started.
    pub elapsed: Duration,
}

impl Progress {
    /// Create a new progress report.
    pub fn new(current: u64, total: u64, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
            elapsed: Duration::ZERO,
        }
    }

    /// Get progress as a fraction (0.0 to 1.0).
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64) / (self.total as f64)
        }
    }

    /// Get progress as a percentage (0 to 100).
    #[inline]
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    /// Check if the stage is complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Callback function for progress reporting.
///
/// Returns `true` to continue, `false` to request cancellation.
pub type ProgressCallback = Box<dyn Fn(&Progress) -> bool + Send + Sync>;

/// Tracks progress through one pipeline stage.
#[derive(Debug)]
pub struct ProgressTracker {
    current: AtomicU64,
    total: u64,
    cancelled: AtomicBool,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total: u64) -> Self {
        Self {
            current: AtomicU64::new(0),
            total,
            cancelled: AtomicBool::new(false),
            start_time: Instant::now(),
        }
    }

    /// Increment progress by one.
    #[inline]
    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current progress value.
    #[inline]
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Get the total count.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Check if cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Get progress as a fraction (0.0 to 1.0).
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current() as f64) / (self.total as f64)
        }
    }

    /// Get elapsed time.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Create a Progress snapshot.
    pub fn snapshot(&self, message: impl Into<String>) -> Progress {
        Progress {
            current: self.current(),
            total: self.total,
            message: message.into(),
            elapsed: self.elapsed(),
        }
    }

    /// Poll the callback once.
    ///
    /// Returns `false` if the callback requested cancellation (now or on an
    /// earlier poll).
    pub fn poll(&self, callback: Option<&ProgressCallback>, message: &str) -> bool {
        if self.is_cancelled() {
            return false;
        }

        let callback = match callback {
            Some(cb) => cb,
            None => return true,
        };

        let progress = self.snapshot(message);
        let should_continue = callback(&progress);

        if !should_continue {
            self.cancel();
        }

        should_continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_progress_fraction() {
        let p = Progress::new(50, 100, "test");
        assert!((p.fraction() - 0.5).abs() < 1e-10);
        assert_eq!(p.percent(), 50);
    }

    #[test]
    fn test_progress_complete() {
        let p1 = Progress::new(50, 100, "incomplete");
        assert!(!p1.is_complete());

        let p2 = Progress::new(100, 100, "complete");
        assert!(p2.is_complete());
    }

    #[test]
    fn test_progress_zero_total() {
        let p = Progress::new(0, 0, "empty");
        assert!((p.fraction() - 0.0).abs() < 1e-10);
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn test_tracker_counts() {
        let tracker = ProgressTracker::new(100);

        assert_eq!(tracker.current(), 0);
        assert_eq!(tracker.total(), 100);
        assert!(!tracker.is_cancelled());

        tracker.increment();
        tracker.increment();
        assert_eq!(tracker.current(), 2);
        assert!((tracker.fraction() - 0.02).abs() < 1e-10);
    }

    #[test]
    fn test_tracker_cancel() {
        let tracker = ProgressTracker::new(100);

        assert!(!tracker.is_cancelled());
        tracker.cancel();
        assert!(tracker.is_cancelled());

        // Once cancelled, polls fail without invoking the callback.
        let callback: ProgressCallback = Box::new(|_| panic!("must not be called"));
        assert!(!tracker.poll(Some(&callback), "test"));
    }

    #[test]
    fn test_poll_requests_cancellation() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let callback: ProgressCallback = Box::new(move |p| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            p.current < 5
        });

        let tracker = ProgressTracker::new(10);

        let mut completed = 0;
        for _ in 0..10 {
            if !tracker.poll(Some(&callback), "test") {
                break;
            }
            tracker.increment();
            completed += 1;
        }

        assert_eq!(completed, 5, "callback cancels once current reaches 5");
        assert!(tracker.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_poll_without_callback() {
        let tracker = ProgressTracker::new(10);
        assert!(tracker.poll(None, "test"));
    }
}
