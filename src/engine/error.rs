use ulid::Ulid;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Bad or missing input shape, caught before any rule runs.
    #[error("{0}")]
    Validation(String),
    /// A booking rule said no. The message is user-facing.
    #[error("{0}")]
    Rejected(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Venue calendar and booking store disagree.
    #[error("consistency fault on venue {venue_id}: {detail}")]
    ConsistencyFault { venue_id: Ulid, detail: String },
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
    #[error("WAL error: {0}")]
    WalError(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        EngineError::Rejected(reason.into())
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation",
            EngineError::Rejected(_) => "rejected",
            EngineError::NotFound(_) => "not_found",
            EngineError::ConsistencyFault { .. } => "consistency_fault",
            EngineError::LimitExceeded(_) => "limit_exceeded",
            EngineError::WalError(_) => "wal",
        }
    }
}

impl From<crate::model::ReversedRange> for EngineError {
    fn from(e: crate::model::ReversedRange) -> Self {
        EngineError::Validation(e.to_string())
    }
}

impl From<crate::rules::DateParseError> for EngineError {
    fn from(e: crate::rules::DateParseError) -> Self {
        EngineError::Validation(e.to_string())
    }
}
