use serde::Serialize;
use utoipa::ToSchema;

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorPayload {
    /// Human-readable error message
    pub message: String,
    /// The HTTP status code
    pub code: u16,
    /// Machine-readable error type identifier
    pub r#type: String,
}
