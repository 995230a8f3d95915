use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{
    config::Settings,
    error::{Error, Result},
    invariants::HttpMethod,
};

/// Seconds charged to a request nginx gave up on.
pub const UPSTREAM_PENALTY_SECS: f64 = 90.0;
/// nginx logs this status when the client closed the connection first.
pub const CLIENT_CLOSED_REQUEST: &str = "499";
/// Placeholder nginx writes when a variable has no value.
pub const NO_VALUE: &str = "-";

// log_format request_times 'IP=$remote_addr,TL=$time_local,DN=$host,RQ=$request,
//     HR=$http_referer,HU=$http_user_agent,CS=$cookie_sessionid,
//     UT=$upstream_response_time,RT=$request_time,US=$upstream_status,SC=$status';
static REQUEST_TIMES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        &[
            r"^IP=(?P<ip>.*[^,])",
            r"TL=(?P<time>.*[^,])",
            r"DN=(?P<host>.*[^,])",
            r"RQ=(?P<request>.*[^,])",
            r"HR=(?P<http_referer>.*[^,])",
            // user agents can contain commas
            r"HU=(?P<http_user_agent>.*[^,])",
            r"CS=(?P<cookie_sessionid>.*[^,])",
            r"UT=(?P<upstream_response_time>.*[^,])",
            r"RT=(?P<request_time>.*[^,])",
            r"US=(?P<upstream_status>.*[^,])",
            r"SC=(?P<status>.*?)\s*$",
        ]
        .join(","),
    )
    .expect("valid request_times pattern")
});
static TIMEZONE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [+-]?\d{4}").expect("valid offset pattern"));
static REQUEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<http_method>GET|HEAD|POST) (?P<url>\S+)").expect("valid request pattern")
});

/// Captured text of every field a dialect pattern must name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub ip: &'a str,
    pub time: &'a str,
    pub host: &'a str,
    pub request: &'a str,
    pub http_referer: &'a str,
    pub http_user_agent: &'a str,
    pub cookie_sessionid: &'a str,
    pub upstream_response_time: &'a str,
    pub request_time: &'a str,
    pub upstream_status: &'a str,
    pub status: &'a str,
}

impl<'a> RawFields<'a> {
    /// `None` when the pattern left any named group unmatched.
    pub fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        let field = |name: &str| caps.name(name).map(|m| m.as_str());
        Some(Self {
            ip: field("ip")?,
            time: field("time")?,
            host: field("host")?,
            request: field("request")?,
            http_referer: field("http_referer")?,
            http_user_agent: field("http_user_agent")?,
            cookie_sessionid: field("cookie_sessionid")?,
            upstream_response_time: field("upstream_response_time")?,
            request_time: field("request_time")?,
            upstream_status: field("upstream_status")?,
            status: field("status")?,
        })
    }
}

/// Fields a dialect's post-processing step produces from the raw captures.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub http_method: Option<HttpMethod>,
    pub url: Option<String>,
    pub request_time: f64,
    pub upstream_response_time: f64,
}

pub type PostProcess = fn(&RawFields<'_>, &Settings) -> Result<Derived>;

/// A log line schema: where the fields are and how to finish them off.
#[derive(Debug, Clone)]
pub struct Dialect {
    pub name: &'static str,
    pub pattern: Regex,
    /// `None` stamps records with the current local time instead.
    pub date_format: Option<&'static str>,
    /// Removed from the timestamp text before `date_format` is applied.
    pub date_ignore_pattern: Option<Regex>,
    pub post_process: PostProcess,
}

impl Dialect {
    /// nginx `request_times` log format.
    pub fn request_times() -> Self {
        Self {
            name: "request_times",
            pattern: REQUEST_TIMES_PATTERN.clone(),
            date_format: Some("%d/%b/%Y:%H:%M:%S"),
            date_ignore_pattern: Some(TIMEZONE_OFFSET.clone()),
            post_process: request_times_post_process,
        }
    }
}

fn request_times_post_process(raw: &RawFields<'_>, settings: &Settings) -> Result<Derived> {
    let (http_method, url) = match REQUEST_LINE.captures(raw.request) {
        Some(caps) => (
            caps["http_method"].parse::<HttpMethod>().ok(),
            Some(caps["url"].to_string()),
        ),
        None => (None, None),
    };

    let request_time = parse_seconds("request_time", raw.request_time)?;

    // nginx stopped waiting on the upstream. A fast 499 is the user bailing
    // (usually a double click), so it keeps its own request time; anything
    // else is charged the penalty.
    let upstream_response_time = if raw.upstream_response_time == NO_VALUE {
        if raw.status == CLIENT_CLOSED_REQUEST && request_time < settings.slow_threshold {
            request_time
        } else {
            UPSTREAM_PENALTY_SECS
        }
    } else {
        parse_seconds("upstream_response_time", raw.upstream_response_time)?
    };

    Ok(Derived {
        http_method,
        url,
        request_time,
        upstream_response_time,
    })
}

fn parse_seconds(field: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| Error::MalformedNumericField {
            field,
            value: value.into(),
            source,
        })
}
