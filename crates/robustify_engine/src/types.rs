use std::collections::BTreeMap;
use std::fmt;

use crate::RobustifyRecord;

pub type RunId = u64;

/// Stored URI-R -> URI-M records of a document, keyed by URI.
pub type Mappings = BTreeMap<String, RobustifyRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// One record of a robustify stream, in arrival order.
    Record { run_id: RunId, record: RobustifyRecord },
    /// Sent exactly once per robustify run, after its last record.
    StreamFinished {
        run_id: RunId,
        result: Result<StreamSummary, EngineError>,
    },
    LdnLoaded(Result<String, EngineError>),
    LdnPreviewed(Result<String, EngineError>),
    LdnSent(Result<u16, EngineError>),
    MappingsLoaded(Result<Mappings, EngineError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    pub records: usize,
    /// Non-empty lines that did not look like a JSON object.
    pub skipped_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: FailureKind,
    pub message: String,
}

impl EngineError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    LineTooLong { max_bytes: usize },
    MalformedRecord,
    NotJson,
    Runtime,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::LineTooLong { max_bytes } => {
                write!(f, "stream line longer than {max_bytes} bytes")
            }
            FailureKind::MalformedRecord => write!(f, "malformed record"),
            FailureKind::NotJson => write!(f, "response is not JSON"),
            FailureKind::Runtime => write!(f, "runtime error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
