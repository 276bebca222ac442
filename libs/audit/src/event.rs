//! The audit event envelope.

use std::borrow::Cow;

use bytes::{Buf, BufMut};
use chrono::{DateTime, Utc};
use prost::encoding::{int32, message, string, DecodeContext, WireType};
use prost::{DecodeError, Message};
use prost_types::Timestamp;

use crate::entity::{Actor, Resource, EMPTY_ACTOR, EMPTY_RESOURCE};
use crate::enums::{enum_name, EventType};
use crate::error::TimestampError;
use crate::payload::{self, Payload, PayloadOrganizationCreated};
use crate::timestamp;
use crate::unknown::UnknownFields;

/// Wire tags of the envelope fields.
///
/// Tags are the only stable identity of a field. They are never changed or
/// reused; a removed field's tag is retired.
pub mod tags {
    pub const EVENT_ID: u32 = 1;
    pub const TYPE: u32 = 2;
    pub const ACTOR: u32 = 3;
    pub const RESOURCE: u32 = 4;
    pub const EVENT_TIME: u32 = 5;
}

/// An audited action: what happened, who did it, to which resource, and when.
///
/// Fields follow proto3 rules: scalars default to zero/empty, sub-messages
/// are optional, and `payload` holds at most one variant. `type` should name
/// the event type whose payload is set; the wire format does not enforce it,
/// use [`Event::validate`] for that.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Opaque, globally unique event identifier.
    pub event_id: String,

    /// Raw [`EventType`] code. Codes from newer producers are kept as-is.
    pub r#type: i32,

    /// Who did it.
    pub actor: Option<Actor>,

    /// Which resource was affected.
    pub resource: Option<Resource>,

    /// When the audited action happened.
    pub event_time: Option<Timestamp>,

    /// Type-specific payload.
    pub payload: Option<Payload>,

    /// Fields read from the wire that this schema version does not define,
    /// including payload variants added after this build.
    pub unknown_fields: UnknownFields,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub fn builder() -> crate::validate::EventBuilder {
        crate::validate::EventBuilder::new()
    }

    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Returns the typed event type, or `Unspecified` if the raw code is not
    /// known to this build.
    #[must_use]
    pub fn r#type(&self) -> EventType {
        EventType::try_from(self.r#type).unwrap_or_default()
    }

    pub fn set_type(&mut self, value: EventType) {
        self.r#type = value as i32;
    }

    /// Symbolic name of the raw type code, or its decimal value.
    #[must_use]
    pub fn type_name(&self) -> Cow<'static, str> {
        enum_name::<EventType>(self.r#type)
    }

    /// Returns the actor, or an empty one if unset.
    #[must_use]
    pub fn actor(&self) -> &Actor {
        self.actor.as_ref().unwrap_or(&EMPTY_ACTOR)
    }

    /// Returns the resource, or an empty one if unset.
    #[must_use]
    pub fn resource(&self) -> &Resource {
        self.resource.as_ref().unwrap_or(&EMPTY_RESOURCE)
    }

    #[must_use]
    pub fn event_time(&self) -> Option<&Timestamp> {
        self.event_time.as_ref()
    }

    /// `event_time` as a `chrono` instant, if set.
    #[must_use]
    pub fn event_time_utc(&self) -> Option<Result<DateTime<Utc>, TimestampError>> {
        self.event_time.as_ref().map(timestamp::to_datetime)
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Sets the payload, replacing whichever variant was active.
    ///
    /// This does not touch `type`; [`EventBuilder`](crate::EventBuilder)
    /// keeps the two in step.
    pub fn set_payload(&mut self, payload: impl Into<Payload>) {
        self.payload = Some(payload.into());
    }

    /// The `organization_created` payload, if that variant is active.
    #[must_use]
    pub fn organization_created(&self) -> Option<&PayloadOrganizationCreated> {
        match &self.payload {
            Some(Payload::OrganizationCreated(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns true if the record carries fields this build cannot
    /// interpret, such as a payload variant from a newer schema.
    #[must_use]
    pub fn has_unknown_fields(&self) -> bool {
        !self.unknown_fields.is_empty()
    }

    /// Drops retained unknown fields here and in every sub-message.
    pub fn discard_unknown_fields(&mut self) {
        self.unknown_fields.clear();
        if let Some(actor) = &mut self.actor {
            actor.unknown_fields.clear();
        }
        if let Some(resource) = &mut self.resource {
            resource.unknown_fields.clear();
        }
        if let Some(payload) = &mut self.payload {
            payload.discard_unknown_fields();
        }
    }
}

impl Message for Event {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if !self.event_id.is_empty() {
            string::encode(tags::EVENT_ID, &self.event_id, buf);
        }
        if self.r#type != 0 {
            int32::encode(tags::TYPE, &self.r#type, buf);
        }
        if let Some(actor) = &self.actor {
            message::encode(tags::ACTOR, actor, buf);
        }
        if let Some(resource) = &self.resource {
            message::encode(tags::RESOURCE, resource, buf);
        }
        if let Some(event_time) = &self.event_time {
            message::encode(tags::EVENT_TIME, event_time, buf);
        }
        if let Some(payload) = &self.payload {
            payload.encode(buf);
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
        const STRUCT_NAME: &str = "Event";
        match tag {
            tags::EVENT_ID => {
                string::merge(wire_type, &mut self.event_id, buf, ctx).map_err(|mut error| {
                    error.push(STRUCT_NAME, "event_id");
                    error
                })
            }
            tags::TYPE => int32::merge(wire_type, &mut self.r#type, buf, ctx).map_err(|mut error| {
                error.push(STRUCT_NAME, "type");
                error
            }),
            tags::ACTOR => message::merge(
                wire_type,
                self.actor.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(|mut error| {
                error.push(STRUCT_NAME, "actor");
                error
            }),
            tags::RESOURCE => message::merge(
                wire_type,
                self.resource.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(|mut error| {
                error.push(STRUCT_NAME, "resource");
                error
            }),
            tags::EVENT_TIME => message::merge(
                wire_type,
                self.event_time.get_or_insert_with(Default::default),
                buf,
                ctx,
            )
            .map_err(|mut error| {
                error.push(STRUCT_NAME, "event_time");
                error
            }),
            _ if payload::payload_variant_for_tag(tag).is_some() => {
                Payload::merge(&mut self.payload, tag, wire_type, buf, ctx).map_err(|mut error| {
                    error.push(STRUCT_NAME, "payload");
                    error
                })
            }
            _ => self.unknown_fields.merge_field(tag, wire_type, buf),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.event_id.is_empty() {
            len += string::encoded_len(tags::EVENT_ID, &self.event_id);
        }
        if self.r#type != 0 {
            len += int32::encoded_len(tags::TYPE, &self.r#type);
        }
        if let Some(actor) = &self.actor {
            len += message::encoded_len(tags::ACTOR, actor);
        }
        if let Some(resource) = &self.resource {
            len += message::encoded_len(tags::RESOURCE, resource);
        }
        if let Some(event_time) = &self.event_time {
            len += message::encoded_len(tags::EVENT_TIME, event_time);
        }
        if let Some(payload) = &self.payload {
            len += payload.encoded_len();
        }
        len + self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        self.event_id.clear();
        self.r#type = 0;
        self.actor = None;
        self.resource = None;
        self.event_time = None;
        self.payload = None;
        self.unknown_fields.clear();
    }
}
