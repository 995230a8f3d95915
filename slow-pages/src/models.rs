use chrono::NaiveDateTime;

use crate::invariants::{Endpoint, HttpMethod};

/// One access log line after extraction and post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub ip: String,
    pub time: NaiveDateTime,
    pub host: String,
    pub request: String,
    pub http_referer: String,
    pub http_user_agent: String,
    pub cookie_sessionid: String,
    /// Seconds; never the `-` sentinel once parsed.
    pub upstream_response_time: f64,
    pub request_time: f64,
    pub upstream_status: String,
    pub status: String,
    /// Absent when the request string did not decompose.
    pub http_method: Option<HttpMethod>,
    pub url: Option<String>,
}

/// Slow requests for one `(path, method)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub path: Endpoint,
    pub http_method: HttpMethod,
    pub occurrences: u64,
    pub total_time: f64,
}

impl PageRequest {
    pub fn new(path: Endpoint, http_method: HttpMethod) -> Self {
        Self {
            path,
            http_method,
            occurrences: 0,
            total_time: 0.0,
        }
    }

    pub fn average_time(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            self.total_time / self.occurrences as f64
        }
    }
}
