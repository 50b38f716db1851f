//! Error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new("Not found")
    }

    pub fn internal_error() -> Self {
        Self::new("Internal server error")
    }
}
