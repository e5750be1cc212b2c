//! Action errors and the uniform `{success, data | error}` result shape.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Failure of a single user-visible operation. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Invalid fields")]
    InvalidFields,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No file provided")]
    NoFile,

    /// Non-2xx from the Document QA API; `message` is its `detail` or the operation fallback.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid token received.")]
    InvalidToken,

    #[error("An unexpected error occurred")]
    Transport(#[from] reqwest::Error),

    #[error("An unexpected error occurred")]
    Decode(String),
}

impl ActionError {
    /// Errors detected before any network traffic.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::InvalidFields | Self::Unauthorized | Self::NoFile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(String),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }
}

impl<T> From<Result<T, ActionError>> for ActionResult<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Failure(e.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionResult", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serializes_error_field() {
        let result: ActionResult<()> = Err(ActionError::NoFile).into();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "No file provided" }));
    }

    #[test]
    fn success_serializes_data_field() {
        let result = ActionResult::Success(vec![1, 2]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn upstream_message_is_shown_verbatim() {
        let err = ActionError::Upstream {
            status: 400,
            message: "Document not found".into(),
        };
        assert_eq!(err.to_string(), "Document not found");
        assert!(!err.is_local());
    }
}
