use std::num::ParseFloatError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed timestamp {value:?}: {source}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("malformed {field} value {value:?}: {source}")]
    MalformedNumericField {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("record violates aggregation contract ({url:?}): {reason}")]
    ContractViolation { url: String, reason: String },

    #[error("failed to read log input: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
