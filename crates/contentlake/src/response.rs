use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a failed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// 4xx: the request itself was rejected (auth, bad query syntax, rate
    /// limiting).
    ClientRequest,
    /// 5xx: the service failed.
    Server,
    /// The body could not be parsed on an endpoint expecting JSON.
    Decode,
    /// The transport collaborator failed before a status was available.
    Transport,
}

/// Error descriptor carried by a failed [`ApiResult`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub code: Option<String>,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: None,
            message: message.into(),
            code: None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "api error ({status}): {}", self.message),
            None => write!(f, "api error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Uniform result of one API call.
///
/// Created per call and never retained by the client. Expected failure modes
/// land here rather than in [`crate::Error`], so callers branch on the
/// outcome instead of catching errors.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResult {
    Ok { status: u16, data: Value },
    Err(ApiError),
}

impl ApiResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResult::Ok { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiResult::Ok { status, .. } => Some(*status),
            ApiResult::Err(err) => err.status,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiResult::Ok { data, .. } => Some(data),
            ApiResult::Err(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiResult::Ok { .. } => None,
            ApiResult::Err(err) => Some(err),
        }
    }

    pub fn into_data(self) -> std::result::Result<Value, ApiError> {
        match self {
            ApiResult::Ok { data, .. } => Ok(data),
            ApiResult::Err(err) => Err(err),
        }
    }
}

/// Classify an HTTP status and JSON body into a uniform result.
///
/// Never propagates transport failures itself; those are synthesized into
/// [`ApiError::transport`] by the caller.
pub fn normalize(status: u16, body: &[u8]) -> ApiResult {
    if (200..300).contains(&status) {
        return match serde_json::from_slice::<Value>(body) {
            Ok(data) => ApiResult::Ok { status, data },
            Err(err) => ApiResult::Err(ApiError {
                kind: ApiErrorKind::Decode,
                status: Some(status),
                message: format!("invalid json body: {err}"),
                code: None,
            }),
        };
    }

    let kind = if status < 500 {
        ApiErrorKind::ClientRequest
    } else {
        ApiErrorKind::Server
    };
    let (message, code) = extract_error(status, body);
    ApiResult::Err(ApiError {
        kind,
        status: Some(status),
        message,
        code,
    })
}

/// Classify an NDJSON response; each non-empty line becomes one array entry,
/// in body order.
pub fn normalize_ndjson(status: u16, body: &[u8]) -> ApiResult {
    if !(200..300).contains(&status) {
        return normalize(status, body);
    }

    let Ok(text) = std::str::from_utf8(body) else {
        return ApiResult::Err(ApiError {
            kind: ApiErrorKind::Decode,
            status: Some(status),
            message: "ndjson body is not utf-8".to_string(),
            code: None,
        });
    };

    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(record) => records.push(record),
            Err(err) => {
                return ApiResult::Err(ApiError {
                    kind: ApiErrorKind::Decode,
                    status: Some(status),
                    message: format!("invalid ndjson record: {err}"),
                    code: None,
                })
            }
        }
    }
    ApiResult::Ok {
        status,
        data: Value::Array(records),
    }
}

// Error bodies come in two shapes: {"error": "..."} and
// {"error": {"description": ..., "type": ...}}, sometimes with a top-level
// "message" instead.
fn extract_error(status: u16, body: &[u8]) -> (String, Option<String>) {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let message = if text.is_empty() {
            format!("http status {status}")
        } else {
            text
        };
        return (message, None);
    };

    match value.get("error") {
        Some(Value::String(message)) => (message.clone(), None),
        Some(Value::Object(map)) => {
            let message = map
                .get("description")
                .and_then(Value::as_str)
                .or_else(|| map.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| format!("http status {status}"));
            let code = map.get("type").and_then(Value::as_str).map(str::to_string);
            (message, code)
        }
        _ => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("http status {status}"));
            (message, None)
        }
    }
}
