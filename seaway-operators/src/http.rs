//! Shared wire-level error classification for the HTTP adapters.

use seaway_core::error::{OperatorCallError, OperatorError};

/// Transport-layer failures (refused, reset, timed out) all classify as
/// Connection so the retry policy treats them uniformly.
pub(crate) fn transport_error(operator: &str, err: reqwest::Error) -> OperatorCallError {
    OperatorCallError::Connection {
        operator: operator.to_string(),
        message: err.to_string(),
    }
}

/// Map a non-success HTTP status: 429 is the rate-limit signal, anything
/// else is an operator-reported API error carrying the body as message.
pub(crate) async fn check_status(
    operator: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, OperatorCallError> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(OperatorCallError::RateLimited {
            operator: operator.to_string(),
            message: "http 429".to_string(),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            format!("http {}", status.as_u16())
        } else {
            body.chars().take(500).collect()
        };
        return Err(OperatorCallError::Api(OperatorError {
            operator: operator.to_string(),
            message,
            code: None,
            http_status: Some(status.as_u16()),
        }));
    }
    Ok(response)
}

/// A 2xx body that does not parse is an operator fault, not ours.
pub(crate) fn malformed_body(operator: &str, err: reqwest::Error) -> OperatorCallError {
    OperatorCallError::Api(OperatorError {
        operator: operator.to_string(),
        message: format!("malformed response body: {err}"),
        code: None,
        http_status: None,
    })
}
