//! HTTP transport with a per-call deadline.
//!
//! The deadline covers connecting, sending and reading the whole body. When
//! it fires the in-flight future is dropped, which aborts the request. No
//! retries: a failed call is reported once to its caller.

use crate::providers::WireRequest;
use crate::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// POST `request` and return the parsed JSON body.
pub(crate) async fn send(
    http: &reqwest::Client,
    request: &WireRequest,
    timeout: Duration,
) -> Result<Value> {
    let call = async {
        let mut builder = http.post(&request.endpoint);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify(e, timeout))?;
        debug!(status = status.as_u16(), bytes = body.len(), "provider responded");

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}

/// The URL is stripped from the message: Google carries the key in its query.
fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout)
    } else {
        Error::Network(err.without_url().to_string())
    }
}

/// Best-effort provider error message from an error body.
///
/// Handles `{"error": {"message": ..}}` (OpenAI, Anthropic, Google),
/// `{"error": ".."}` and `{"message": ..}`, including the array-wrapped
/// form some Google endpoints return.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let value = match value {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };

    let message = match value.get("error") {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(error) => error.get("message").and_then(Value::as_str),
        None => value.get("message").and_then(Value::as_str),
    };
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_error_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[test]
    fn string_error_and_top_level_message() {
        assert_eq!(error_detail(r#"{"error":"quota"}"#).as_deref(), Some("quota"));
        assert_eq!(
            error_detail(r#"{"message":"not found"}"#).as_deref(),
            Some("not found")
        );
    }

    #[test]
    fn array_wrapped_error() {
        let body = r#"[{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}]"#;
        assert_eq!(error_detail(body).as_deref(), Some("API key not valid"));
    }

    #[test]
    fn unparseable_body_has_no_detail() {
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail(r#"{"error":{"code":500}}"#), None);
        assert_eq!(error_detail(""), None);
    }
}
