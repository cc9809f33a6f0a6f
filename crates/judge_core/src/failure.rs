use std::fmt;

use serde_json::Value;

/// Shown when a failure carries neither a server message nor its own message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred.";

/// Response attached to a failed call, when the service answered at all.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureResponse {
    pub status: Option<u16>,
    /// Parsed response body; `Value::Null` when absent or not JSON.
    pub data: Value,
}

/// Rejection produced by a resource producer.
///
/// `Display` renders the normalized, user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerFailure {
    response: Option<FailureResponse>,
    message: Option<String>,
}

impl ProducerFailure {
    /// Failure with a structured response payload and the transport's own message.
    pub fn structured(status: Option<u16>, data: Value, message: impl Into<String>) -> Self {
        Self {
            response: Some(FailureResponse { status, data }),
            message: Some(message.into()),
        }
    }

    /// Failure that only carries its own message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            response: None,
            message: Some(message.into()),
        }
    }

    /// Failure that carries nothing usable.
    pub fn opaque() -> Self {
        Self {
            response: None,
            message: None,
        }
    }

    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self::message(err.to_string())
    }

    pub fn response(&self) -> Option<&FailureResponse> {
        self.response.as_ref()
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().and_then(|response| response.status)
    }

    /// Server message field, then own message, then the generic fallback.
    /// Empty strings count as absent.
    pub fn normalized_message(&self) -> String {
        let server_message = self
            .response
            .as_ref()
            .and_then(|response| response.data.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty());
        if let Some(message) = server_message {
            return message.to_string();
        }
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for ProducerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized_message())
    }
}

impl std::error::Error for ProducerFailure {}
