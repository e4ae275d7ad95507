//! Producer authentication for the `/api/v1` surface.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::error::RealtimeError;

/// Rejects requests that do not carry `Authorization: Bearer <token>`
/// matching the configured producer token.
///
/// # Errors
///
/// Returns [`RealtimeError::InvalidCredentials`] (401) when the header is
/// missing, malformed or wrong, or when no producer token is configured.
pub async fn require_producer_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RealtimeError> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match (state.producer_token.as_deref(), presented) {
        (Some(expected), Some(presented)) if tokens_match(expected, presented) => {
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "rejected unauthenticated producer request"
            );
            Err(RealtimeError::InvalidCredentials)
        }
    }
}

/// Length-then-bytes comparison that does not stop at the first mismatch.
fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
