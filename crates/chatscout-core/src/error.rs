/// Errors surfaced by a [`PageDriver`](crate::page::PageDriver).
///
/// Detection code never propagates these: a failed query is treated as
/// "no match". They exist so drivers can report what went wrong and so the
/// binaries can log it.
#[derive(thiserror::Error, Debug, Clone)]
pub enum PageError {
    // ============================================================
    // Query Errors
    // ============================================================
    #[error("Query failed for {selector}: {reason}")]
    QueryFailed { selector: String, reason: String },

    #[error("Invalid selector: {selector}")]
    InvalidSelector { selector: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    Script(String),

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Not ready")]
    NotReady,

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<serde_json::Error> for PageError {
    fn from(err: serde_json::Error) -> Self {
        PageError::Serialization(err.to_string())
    }
}

impl PageError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PageError::QueryFailed { .. } => "QUERY_FAILED",
            PageError::InvalidSelector { .. } => "SELECTOR_INVALID",
            PageError::Script(_) => "SCRIPT_ERROR",
            PageError::Timeout { .. } => "TIMEOUT",
            PageError::Navigation(_) => "NAVIGATION_ERROR",
            PageError::NotReady => "NOT_READY",
            PageError::NotSupported(_) => "NOT_SUPPORTED",
            PageError::Serialization(_) => "SERIALIZATION_ERROR",
            PageError::Other(_) => "INTERNAL_ERROR",
        }
    }
}
