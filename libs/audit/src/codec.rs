//! Binary encode/decode entry points.
//!
//! These are thin wrappers over [`prost::Message`], which [`Event`] implements
//! directly. Decoding is permissive: unknown enum codes and unknown fields are
//! retained, and type/payload agreement is left to [`Event::validate`] (or to
//! [`decode_validated`]). A failed decode affects only the call that made it.

use bytes::{Buf, BufMut};
use prost::Message;

use crate::error::Error;
use crate::event::Event;

/// Decoder settings.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Drop unrecognised fields instead of retaining them for re-encoding.
    pub discard_unknown_fields: bool,
}

impl DecodeOptions {
    pub fn discard_unknown_fields(mut self, discard: bool) -> Self {
        self.discard_unknown_fields = discard;
        self
    }
}

/// Encodes an event into `buf`.
///
/// Fails only if `buf` lacks capacity for the whole record.
pub fn encode(event: &Event, buf: &mut impl BufMut) -> Result<(), Error> {
    event.encode(buf)?;
    Ok(())
}

/// Encodes an event into a new byte vector.
pub fn encode_to_vec(event: &Event) -> Vec<u8> {
    event.encode_to_vec()
}

/// Decodes an event with default options.
pub fn decode(buf: impl Buf) -> Result<Event, Error> {
    decode_with(buf, &DecodeOptions::default())
}

/// Decodes an event.
pub fn decode_with(buf: impl Buf, options: &DecodeOptions) -> Result<Event, Error> {
    let mut event = Event::decode(buf).map_err(|err| {
        tracing::debug!(error = %err, "failed to decode audit event");
        Error::from(err)
    })?;

    if options.discard_unknown_fields {
        event.discard_unknown_fields();
    } else if event.has_unknown_fields() {
        tracing::trace!(
            event_id = %event.event_id,
            event_type = %event.type_name(),
            unknown_fields = event.unknown_fields.len(),
            "retained unknown fields on audit event"
        );
    }

    Ok(event)
}

/// Decodes an event and checks that its type and payload agree.
pub fn decode_validated(buf: impl Buf) -> Result<Event, Error> {
    let event = decode(buf)?;
    event.validate()?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::unknown::UnknownValue;

    #[test]
    fn test_empty_input_decodes_to_default() {
        let event = decode(&b""[..]).unwrap();
        assert_eq!(event, Event::default());
    }

    #[test]
    fn test_truncated_input_fails() {
        // event_id claims 5 bytes, only 2 follow
        let err = decode(&[0x0a, 0x05, b'e', b'1'][..]).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_encode_into_short_buffer_fails() {
        let event = Event {
            event_id: "e1".to_string(),
            ..Default::default()
        };
        let mut storage = [0u8; 2];
        let mut buf = &mut storage[..];
        assert!(matches!(encode(&event, &mut buf), Err(Error::Encode(_))));
    }

    #[test]
    fn test_discard_unknown_fields_option() {
        let bytes = [0x0a, 0x02, b'e', b'1', 0x48, 0x01];

        let kept = decode(&bytes[..]).unwrap();
        assert_eq!(
            kept.unknown_fields.get(9).collect::<Vec<_>>(),
            vec![&UnknownValue::Varint(1)]
        );

        let options = DecodeOptions::default().discard_unknown_fields(true);
        let dropped = decode_with(&bytes[..], &options).unwrap();
        assert!(!dropped.has_unknown_fields());
        assert_eq!(dropped.event_id(), "e1");
    }

    #[test]
    fn test_decode_validated_rejects_missing_payload() {
        // type = ORGANIZATION_CREATED, no payload
        let err = decode_validated(&[0x10u8, 0x01][..]).unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::MissingPayload(_))
        ));
    }
}
