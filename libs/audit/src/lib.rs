//! # registry-audit
//!
//! Audit event schema for the registry: immutable records of who did what,
//! to which resource, and when.
//!
//! ## Design Principles
//!
//! - Events are immutable values; producers build them once and hand them off
//! - Every field is addressed on the wire by a stable tag, never by name or
//!   position
//! - Readers tolerate writers from the future: unknown enum codes and unknown
//!   fields are retained and re-encoded unchanged
//! - Each event type has exactly one payload variant, enforced by the
//!   [`Payload`] sum type and the [`PAYLOAD_VARIANTS`] registry
//!
//! ## Event Envelope
//!
//! | Tag | Field | Type |
//! |-----|-------|------|
//! | 1 | `event_id` | string |
//! | 2 | `type` | [`EventType`] |
//! | 3 | `actor` | [`Actor`] |
//! | 4 | `resource` | [`Resource`] |
//! | 5 | `event_time` | `google.protobuf.Timestamp` |
//! | 6 | `organization_created` | [`PayloadOrganizationCreated`] (oneof `payload`) |
//!
//! ## Encodings
//!
//! - Binary: protobuf wire format ([`codec`], or [`prost::Message`] directly)
//! - Text: protobuf JSON mapping with proto field names ([`json`])
//!
//! The schema source lives in `api/proto/buf/alpha/audit/v1alpha1/event.proto`.

mod entity;
mod enums;
mod error;
mod event;
mod macros;
mod payload;
mod unknown;
mod validate;

pub mod codec;
pub mod json;
pub mod timestamp;

pub use entity::{Actor, Resource};
pub use enums::{enum_name, is_known, ActorType, EventType, ProtoEnum, ResourceType};
pub use error::{Error, TimestampError, ValidationError};
pub use event::{tags, Event};
pub use payload::tags as payload_tags;
pub use payload::{
    payload_variant_for, payload_variant_for_key, payload_variant_for_tag, Payload,
    PayloadOrganizationCreated, PayloadVariant, PAYLOAD_VARIANTS,
};
pub use unknown::{UnknownField, UnknownFields, UnknownValue, RECURSION_LIMIT};
pub use validate::EventBuilder;

pub use codec::{decode, decode_validated, decode_with, encode, encode_to_vec, DecodeOptions};
pub use json::JsonOptions;

/// Re-export for callers that build timestamps directly.
pub use prost_types::Timestamp;
