use std::fmt::Debug;

use rollbook_core::{ApiResponse, AppError};
use tracing::error;

/// Finishes an operation at its boundary: successes pass through, failures
/// become the outbound envelope.
///
/// Unexpected errors are logged together with the operation's input payload
/// for diagnosis; the payload is never echoed to the caller, which only sees
/// the generic `fallback` message. Errors carrying an explicit business
/// status surface their own message.
pub fn complete<P: Debug>(
    result: Result<ApiResponse, AppError>,
    fallback: &str,
    payload: &P,
) -> ApiResponse {
    match result {
        Ok(response) => response,
        Err(err) => {
            if err.is_unexpected() {
                error!(error = %err.error, payload = ?payload, "{fallback}");
            }
            ApiResponse::from_app_error(&err, fallback)
        }
    }
}
