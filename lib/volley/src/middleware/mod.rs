//! Tower middleware for [`crate::HyperClient`].
//!
//! - [`LoggingLayer`] - Logs each exchange using `tracing`

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};
