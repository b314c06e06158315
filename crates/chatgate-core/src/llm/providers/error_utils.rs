//! Normalizing and sanitizing upstream error responses

use crate::error::UpstreamFailure;
use crate::llm::parsers::ResponseParser;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::time::Duration;

const MAX_ERROR_TEXT_CHARS: usize = 1_024;
const REDACTED: &str = "[REDACTED]";

/// Headers carrying a retry hint in seconds, in lookup order
const RETRY_AFTER_HEADERS: &[&str] = &["x-retry-after", "retry-after"];

static BEARER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._\-+/=]{8,}").expect("valid bearer token regex")
});

static KEY_VALUE_SECRET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(api[_-]?key|access[_-]?token|token|secret|password|authorization)\b\s*[:=]\s*["']?[^"',\s}]+"#,
    )
    .expect("valid key/value secret regex")
});

static SK_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsk-[A-Za-z0-9]{16,}\b").expect("valid api key regex"));

/// Redact secrets from upstream error text and cap its length
pub fn sanitize_provider_error_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<empty error response body>".to_string();
    }

    if let Ok(mut json) = serde_json::from_str::<Value>(trimmed) {
        redact_json_value(&mut json);
        let serialized =
            serde_json::to_string(&json).unwrap_or_else(|_| "<unserializable error>".to_string());
        return truncate_with_suffix(serialized);
    }

    truncate_with_suffix(redact_inline_secrets(trimmed))
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *val = Value::String(REDACTED.to_string());
                } else {
                    redact_json_value(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json_value),
        Value::String(s) => *s = redact_inline_secrets(s),
        _ => {}
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.to_ascii_lowercase().replace(['-', ' '], "_");
    ["api_key", "token", "secret", "password", "authorization", "cookie"]
        .iter()
        .any(|marker| normalized.contains(marker))
}

fn redact_inline_secrets(input: &str) -> String {
    let text = BEARER_TOKEN_RE.replace_all(input, "Bearer [REDACTED]");
    let text = KEY_VALUE_SECRET_RE.replace_all(&text, "$1=[REDACTED]");
    SK_KEY_RE.replace_all(&text, REDACTED).into_owned()
}

fn truncate_with_suffix(input: String) -> String {
    let char_count = input.chars().count();
    if char_count <= MAX_ERROR_TEXT_CHARS {
        return input;
    }

    let truncated: String = input.chars().take(MAX_ERROR_TEXT_CHARS).collect();
    format!(
        "{}... [truncated {} chars]",
        truncated,
        char_count - MAX_ERROR_TEXT_CHARS
    )
}

/// Retry hint from `x-retry-after` or `retry-after`, in seconds
///
/// HTTP-date values are ignored; the backoff falls back to its own base.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    RETRY_AFTER_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    })
}

/// Build an `UpstreamFailure` from a non-success HTTP response
pub async fn failure_from_response(response: reqwest::Response) -> UpstreamFailure {
    let status = response.status().as_u16();
    let retry_after = parse_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    failure_from_parts(status, retry_after, &body)
}

fn failure_from_parts(status: u16, retry_after: Option<Duration>, body: &str) -> UpstreamFailure {
    let (error_type, error_code, message) = ResponseParser::parse_error_body(body);
    let message = match message {
        Some(message) => sanitize_provider_error_text(&message),
        None => sanitize_provider_error_text(body),
    };

    UpstreamFailure {
        status_code: Some(status),
        error_type,
        error_code,
        retry_after,
        message,
    }
}
