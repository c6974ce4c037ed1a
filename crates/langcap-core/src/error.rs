use langcap_provider::LookupError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported store format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn word_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            kind: "Word",
            id: id.to_string(),
        }
    }

    pub fn group_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            kind: "Group",
            id: id.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Captured text is empty")]
    EmptyCapture,

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Store rejected the capture: {0}")]
    Store(#[from] StoreError),

    #[error("Capture cancelled")]
    Cancelled,

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}
