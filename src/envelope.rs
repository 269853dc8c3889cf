//! The `{ success, data, error }` envelope wrapped around every API response,
//! and the one function that turns a raw response into a typed result.

use axum::http::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::client::ClientError;

/// Machine-readable failure class carried next to the human message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    NotFound,
    ValidationError,
    InternalError,
    ServiceUnavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            message: None,
        }
    }

    pub fn failure(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code),
            message: None,
        }
    }
}

impl Envelope<()> {
    /// Success without a payload (delete, reorder, contact intake).
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            code: None,
            message: Some(message.into()),
        }
    }
}

/// Message used when a failed response carries none of its own.
pub const FALLBACK_ERROR: &str = "Request failed";

/// Decodes a response body into its payload.
///
/// A non-2xx status or `success: false` is an error: 401 maps to
/// [`ClientError::Auth`], 404 to [`ClientError::NotFound`], anything else to
/// [`ClientError::Request`] with the server's message passed through.
pub fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<Option<T>, ClientError> {
    let parsed = serde_json::from_slice::<Envelope<T>>(body);

    let envelope = match parsed {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(ClientError::Request(format!("Malformed response: {}", e)));
        }
        Err(_) => {
            // Non-JSON error bodies still carry a status worth classifying.
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() {
                FALLBACK_ERROR.to_string()
            } else {
                text
            };
            return Err(classify(status, None, message));
        }
    };

    if status.is_success() && envelope.success {
        return Ok(envelope.data);
    }

    let message = envelope
        .error
        .or(envelope.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR.to_string());
    Err(classify(status, envelope.code, message))
}

fn classify(status: StatusCode, code: Option<ErrorCode>, message: String) -> ClientError {
    match (status, code) {
        (StatusCode::UNAUTHORIZED, _) | (_, Some(ErrorCode::Unauthorized)) => {
            ClientError::Auth(message)
        }
        (StatusCode::NOT_FOUND, _) | (_, Some(ErrorCode::NotFound)) => {
            ClientError::NotFound(message)
        }
        _ => ClientError::Request(message),
    }
}
