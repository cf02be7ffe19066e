//! Error type shared by every conversion path.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// Structured detail mapping attached to parsing errors, e.g. `{"encrypted": true}`
pub type Details = IndexMap<String, Value>;

/// Errors returned by a conversion.
///
/// Every variant maps onto a stable wire code (see [`ConversionError::code`])
/// so the surrounding service can translate it without matching on messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The source content (or an option value) is unusable as given.
    /// Always correctable by the caller.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The document container or markup could not be read.
    #[error("Parsing error: {message}")]
    Parsing { message: String, details: Details },

    /// Unexpected failure that is not attributable to the input.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ConversionError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConversionError::Validation {
            message: message.into(),
        }
    }

    pub fn parsing(message: impl Into<String>, details: Details) -> Self {
        ConversionError::Parsing {
            message: message.into(),
            details,
        }
    }

    /// Parsing error carrying a single detail entry
    pub fn parsing_with(
        message: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let mut details = Details::new();
        details.insert(key.into(), value.into());
        Self::parsing(message, details)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConversionError::Internal {
            message: message.into(),
        }
    }

    /// Stable error code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            ConversionError::Validation { .. } => "VALIDATION_ERROR",
            ConversionError::Parsing { .. } => "PARSING_ERROR",
            ConversionError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            ConversionError::Validation { message }
            | ConversionError::Parsing { message, .. }
            | ConversionError::Internal { message } => message,
        }
    }

    /// Detail mapping; only parsing errors carry one
    pub fn details(&self) -> Option<&Details> {
        match self {
            ConversionError::Parsing { details, .. } => Some(details),
            _ => None,
        }
    }
}

impl Serialize for ConversionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let empty = Details::new();
        let mut state = serializer.serialize_struct("ConversionError", 3)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", self.message())?;
        state.serialize_field("details", self.details().unwrap_or(&empty))?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
