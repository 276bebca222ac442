//! Type-specific event payloads.
//!
//! The `payload` oneof on [`crate::Event`] is modelled as the [`Payload`] sum
//! type, so at most one variant can be set. [`PAYLOAD_VARIANTS`] is the single
//! table tying each [`EventType`] to its payload's wire tag and JSON key.
//!
//! Adding an event type means: a new `EventType` value, a new payload record,
//! a new `Payload` variant with an unused tag, and a new registry entry. Tags
//! already handed out are never reused.

use bytes::{Buf, BufMut};
use prost::encoding::{message, DecodeContext, WireType};
use prost::{DecodeError, Message};
use prost_types::Timestamp;

use crate::enums::EventType;
use crate::unknown::UnknownFields;

/// Wire tags of the `payload` oneof members on the event envelope.
pub mod tags {
    pub const ORGANIZATION_CREATED: u32 = 6;
}

// =============================================================================
// Variant Registry
// =============================================================================

/// Static description of one payload variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadVariant {
    /// The event type this payload belongs to.
    pub event_type: EventType,
    /// Field tag of the variant inside the `payload` oneof.
    pub tag: u32,
    /// JSON key (original proto field name).
    pub json_key: &'static str,
    /// lowerCamelCase JSON key, accepted when parsing.
    pub json_camel_key: &'static str,
}

const ORGANIZATION_CREATED: PayloadVariant = PayloadVariant {
    event_type: EventType::OrganizationCreated,
    tag: tags::ORGANIZATION_CREATED,
    json_key: "organization_created",
    json_camel_key: "organizationCreated",
};

/// Every payload variant known to this build.
pub static PAYLOAD_VARIANTS: &[PayloadVariant] = &[ORGANIZATION_CREATED];

/// Looks up the payload variant for an event type.
///
/// Returns `None` for `EVENT_TYPE_UNSPECIFIED`.
pub fn payload_variant_for(event_type: EventType) -> Option<&'static PayloadVariant> {
    PAYLOAD_VARIANTS
        .iter()
        .find(|variant| variant.event_type == event_type)
}

/// Looks up the payload variant stored under a oneof tag.
pub fn payload_variant_for_tag(tag: u32) -> Option<&'static PayloadVariant> {
    PAYLOAD_VARIANTS.iter().find(|variant| variant.tag == tag)
}

/// Looks up the payload variant by JSON key, in either naming style.
pub fn payload_variant_for_key(key: &str) -> Option<&'static PayloadVariant> {
    PAYLOAD_VARIANTS
        .iter()
        .find(|variant| variant.json_key == key || variant.json_camel_key == key)
}

// =============================================================================
// Payload Records
// =============================================================================

/// Payload for an `EVENT_TYPE_ORGANIZATION_CREATED` event.
///
/// `created_time` is when the organization came into existence. It is kept
/// apart from the envelope's `event_time`, which is when the audit record was
/// made.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PayloadOrganizationCreated {
    pub created_time: Option<Timestamp>,
    pub unknown_fields: UnknownFields,
}

impl PayloadOrganizationCreated {
    #[must_use]
    pub fn new(created_time: Timestamp) -> Self {
        Self {
            created_time: Some(created_time),
            unknown_fields: UnknownFields::new(),
        }
    }

    #[must_use]
    pub fn created_time(&self) -> Option<&Timestamp> {
        self.created_time.as_ref()
    }
}

impl Message for PayloadOrganizationCreated {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if let Some(created_time) = &self.created_time {
            message::encode(1, created_time, buf);
        }
        self.unknown_fields.encode_raw(buf);
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        match tag {
            1 => message::merge(
                wire_type,
                self.created_time.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(|mut error| {
                error.push("PayloadOrganizationCreated", "created_time");
                error
            }),
            _ => self.unknown_fields.merge_field(tag, wire_type, buf),
        }
    }

    fn encoded_len(&self) -> usize {
        self.created_time
            .as_ref()
            .map_or(0, |created_time| message::encoded_len(1, created_time))
            + self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        self.created_time = None;
        self.unknown_fields.clear();
    }
}

// =============================================================================
// Payload Oneof
// =============================================================================

/// The active payload of an event.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    OrganizationCreated(PayloadOrganizationCreated),
}

impl Payload {
    /// The event type this payload belongs to.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.variant().event_type
    }

    /// Registry entry for this payload.
    #[must_use]
    pub fn variant(&self) -> &'static PayloadVariant {
        match self {
            Payload::OrganizationCreated(_) => &ORGANIZATION_CREATED,
        }
    }

    #[must_use]
    pub fn field_tag(&self) -> u32 {
        self.variant().tag
    }

    #[must_use]
    pub fn json_key(&self) -> &'static str {
        self.variant().json_key
    }

    pub(crate) fn discard_unknown_fields(&mut self) {
        match self {
            Payload::OrganizationCreated(value) => value.unknown_fields.clear(),
        }
    }

    pub(crate) fn encode(&self, buf: &mut impl BufMut) {
        match self {
            Payload::OrganizationCreated(value) => {
                message::encode(tags::ORGANIZATION_CREATED, value, buf)
            }
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        match self {
            Payload::OrganizationCreated(value) => {
                message::encoded_len(tags::ORGANIZATION_CREATED, value)
            }
        }
    }

    /// Merges a oneof member into `field`.
    ///
    /// A repeat of the active member merges into it; any other member
    /// replaces it.
    pub(crate) fn merge(
        field: &mut Option<Payload>,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        match tag {
            tags::ORGANIZATION_CREATED => match field {
                Some(Payload::OrganizationCreated(value)) => {
                    message::merge(wire_type, value, buf, ctx)
                }
                _ => {
                    let mut owned = PayloadOrganizationCreated::default();
                    message::merge(wire_type, &mut owned, buf, ctx)?;
                    *field = Some(Payload::OrganizationCreated(owned));
                    Ok(())
                }
            },
            _ => Err(DecodeError::new(format!("invalid payload tag: {tag}"))),
        }
    }
}

impl From<PayloadOrganizationCreated> for Payload {
    fn from(value: PayloadOrganizationCreated) -> Self {
        Payload::OrganizationCreated(value)
    }
}
