//! Logging setup shared by every minibank binary.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat};

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &LogConfig) {
    crate::tracing::init(config);
}
