//! Request and response types for the local HTTP API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Stored design names, `GET /api/v1/blockdiagrams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramList {
    /// Design names, sorted.
    pub result: Vec<String>,
}

/// Name a diagram ended up stored under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDiagram {
    /// Sanitized (and possibly uniquified) design name.
    #[serde(rename = "designName")]
    pub design_name: String,
}

// ============================================================================
// Request Types
// ============================================================================

/// Upload body, `POST /api/v1/upload`.
///
/// `contents` is the exported diagram file verbatim; the store parses and
/// renames it as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Original file name; its stem seeds the design name.
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Raw diagram file text.
    pub contents: String,
}
