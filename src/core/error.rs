use thiserror::Error;

/// Which input list a malformed record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Hotel,
    Restaurant,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Hotel => write!(f, "hotel"),
            RecordKind::Restaurant => write!(f, "restaurant"),
        }
    }
}

/// Errors that abort a matching run
///
/// Everything else (empty buckets, blank names, duplicate hotel ids) is a
/// valid data state and degrades to a `none` or `ambiguous` result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid {kind} record at position {position} (id {id:?}): {reason}")]
    InputValidation {
        kind: RecordKind,
        position: usize,
        id: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}
