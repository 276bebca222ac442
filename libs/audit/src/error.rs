//! Error types for audit event encoding, decoding, and validation.

use thiserror::Error;

use crate::enums::EventType;

/// Errors surfaced by the codec and the JSON mapping.
#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes are truncated or structurally invalid.
    #[error("malformed event bytes: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The output buffer could not hold the encoded record.
    #[error("failed to encode event: {0}")]
    Encode(#[from] prost::EncodeError),

    /// The textual representation could not be parsed.
    #[error("invalid event JSON: {0}")]
    Json(String),

    /// A timestamp could not be rendered or parsed.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    /// The record decoded fine but violates the type/payload contract.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl Error {
    /// Returns true if the error came from malformed wire bytes.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Returns the validation failure, if that is what this error is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Violations of the event envelope contract.
///
/// None of these are raised while decoding; the raw envelope fields stay
/// readable and it is up to the caller to decide what to do with the record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The event type is the reserved zero value and no payload is set.
    #[error("event type is unspecified")]
    UnspecifiedEventType,

    /// The event type is not known to this version of the schema.
    #[error("unknown event type: {0}")]
    UnknownEventType(i32),

    /// The event type requires a payload but none is set.
    #[error("event type {0} has no payload set")]
    MissingPayload(EventType),

    /// The active payload variant belongs to a different event type.
    #[error("event type {event_type} carries a payload for {payload}")]
    PayloadMismatch {
        event_type: EventType,
        payload: EventType,
    },

    /// A producer left out a field its policy requires.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ValidationError {
    /// Returns true if the envelope's type and payload disagree.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingPayload(_) | ValidationError::PayloadMismatch { .. }
        )
    }
}

/// Errors converting between wire timestamps and RFC 3339 text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Seconds or nanos fall outside 0001-01-01T00:00:00Z..=9999-12-31T23:59:59.999999999Z.
    #[error("timestamp out of range: seconds={seconds} nanos={nanos}")]
    OutOfRange { seconds: i64, nanos: i32 },

    /// The text is not an RFC 3339 date-time.
    #[error("invalid RFC 3339 timestamp '{input}': {message}")]
    Parse { input: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::PayloadMismatch {
            event_type: EventType::OrganizationCreated,
            payload: EventType::Unspecified,
        };
        assert_eq!(
            err.to_string(),
            "event type EVENT_TYPE_ORGANIZATION_CREATED carries a payload for EVENT_TYPE_UNSPECIFIED"
        );
        assert!(err.is_integrity_error());
        assert!(!ValidationError::UnknownEventType(7).is_integrity_error());
    }

    #[test]
    fn test_error_wraps_validation() {
        let err: Error = ValidationError::MissingField("event_id").into();
        assert_eq!(err.to_string(), "missing required field: event_id");
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::MissingField("event_id"))
        );
        assert!(!err.is_decode());
    }
}
