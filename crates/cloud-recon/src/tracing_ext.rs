//! Tracing helpers for reconstruction operations.
//!
//! Enable output by initializing a subscriber in the application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=cloud_recon=debug for detailed output,
//! // RUST_LOG=cloud_recon::timing=debug for stage timing.
//! ```

use std::time::Instant;
use tracing::{debug, info};

use crate::cloud::PointCloud;

/// A performance timer that logs its duration on drop.
///
/// ```rust,ignore
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... work ...
/// } // logs elapsed ms here
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        debug!(target: "cloud_recon::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Create a timer that also records the input size.
    pub fn with_context(name: &'static str, point_count: usize) -> Self {
        debug!(
            target: "cloud_recon::timing",
            operation = name,
            points = point_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Get the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "cloud_recon::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log point-cloud statistics at debug level.
pub fn log_cloud_stats(cloud: &PointCloud, context: &str) {
    let dims = cloud
        .bounds()
        .map(|(min, max)| max - min)
        .unwrap_or_default();

    debug!(
        target: "cloud_recon::cloud_state",
        context = context,
        points = cloud.len(),
        has_normals = cloud.has_normals(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Point cloud state"
    );
}
