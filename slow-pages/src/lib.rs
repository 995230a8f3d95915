//! Slow page analysis for nginx `request_times` access logs.
//!
//! [`LineParser`] turns raw lines into [`ParsedRequest`]s and [`SlowPages`]
//! folds the slow ones into one [`PageRequest`] per path and method.

pub mod analytics;
pub mod config;
pub mod dialect;
pub mod error;
pub mod invariants;
pub mod logging;
pub mod models;
pub mod parser;
pub mod report;

pub use analytics::SlowPages;
pub use config::{DEFAULT_SLOW_THRESHOLD_SECS, Settings};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use invariants::{Endpoint, HttpMethod};
pub use models::{PageRequest, ParsedRequest};
pub use parser::LineParser;
