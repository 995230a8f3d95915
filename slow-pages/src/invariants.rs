use std::str::FromStr;

use derive_more::{AsRef, Debug, Display};
use serde::Serialize;

use crate::error::Error;

/// Request methods the request-times dialect recognises inside `RQ=`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[display("GET")]
    Get,
    #[display("HEAD")]
    Head,
    #[display("POST")]
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            other => Err(format!("unsupported http method {other:?}")),
        }
    }
}

/// A request path with query string and fragment removed.
#[derive(Debug, Display, AsRef, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let target = s.split(['?', '#']).next().unwrap_or_default();
        // absolute-form targets carry scheme and authority in front of the path
        let path = match target.split_once("://") {
            Some((_, rest)) if !target.starts_with('/') => {
                rest.find('/').map_or("", |at| &rest[at..])
            }
            _ => target,
        };
        if path.is_empty() {
            return Err(Error::ContractViolation {
                url: s.into(),
                reason: "request target has no path".into(),
            });
        }
        Ok(Self(path.into()))
    }
}
