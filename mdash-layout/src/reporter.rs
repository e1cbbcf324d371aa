//! Injected error reporting
//!
//! The aggregator and breadcrumb resolver report store failures through an
//! [`ErrorReporter`] handed to them at construction. Production uses
//! [`TracingReporter`]; tests use [`RecordingReporter`] to assert on what
//! was reported.

use std::sync::Mutex;

use tracing::error;

use crate::error::LayoutError;

/// Sink for failures observed by the layout core
pub trait ErrorReporter: Send + Sync {
    /// Called once per failure, before the error is returned to the caller
    fn report(&self, operation: &'static str, error: &LayoutError);
}

/// Logs reports at `error` level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, operation: &'static str, err: &LayoutError) {
        error!(operation, error = %err, "layout operation failed");
    }
}

/// A single recorded report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub operation: &'static str,
    pub message: String,
}

/// Keeps every report in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<ReportedError>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn reports(&self) -> Vec<ReportedError> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, operation: &'static str, err: &LayoutError) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(ReportedError {
                operation,
                message: err.to_string(),
            });
        }
    }
}
