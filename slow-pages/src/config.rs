/// Requests at or above this many seconds upstream count as slow.
pub const DEFAULT_SLOW_THRESHOLD_SECS: f64 = 7.0;

/// Environment variable consulted by the binary for the slow threshold.
pub const SLOW_THRESHOLD_ENV: &str = "MO_SLOW_PAGE_SECONDS";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub slow_threshold: f64,
}

impl Settings {
    pub fn with_slow_threshold(slow_threshold: f64) -> Self {
        Self { slow_threshold }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            slow_threshold: DEFAULT_SLOW_THRESHOLD_SECS,
        }
    }
}
