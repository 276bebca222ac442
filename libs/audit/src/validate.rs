//! Envelope validation and the producer-side builder.
//!
//! The wire format accepts an event whose `type` and payload disagree. This
//! module is where that is caught: consumers call [`Event::validate`] on
//! decoded records, and producers go through [`EventBuilder`], which derives
//! `type` from the payload and refuses to build an inconsistent record.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;

use crate::entity::{Actor, Resource};
use crate::enums::EventType;
use crate::error::ValidationError;
use crate::event::Event;
use crate::payload::Payload;
use crate::timestamp;
use crate::unknown::UnknownFields;

impl Event {
    /// Checks that `type` is a known event type and the active payload
    /// belongs to it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let event_type = EventType::try_from(self.r#type)
            .map_err(|_| ValidationError::UnknownEventType(self.r#type))?;
        let result = match &self.payload {
            None if event_type == EventType::Unspecified => {
                Err(ValidationError::UnspecifiedEventType)
            }
            None => Err(ValidationError::MissingPayload(event_type)),
            Some(payload) if payload.event_type() != event_type => {
                Err(ValidationError::PayloadMismatch {
                    event_type,
                    payload: payload.event_type(),
                })
            }
            Some(_) => Ok(()),
        };
        if let Err(err) = &result {
            tracing::debug!(event_id = %self.event_id, error = %err, "audit event failed validation");
        }
        result
    }

    /// Returns true if [`Event::validate`] passes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Builder for constructing consistent events.
///
/// `type` is taken from the payload, so a built event always passes
/// [`Event::validate`]. `event_time` defaults to now.
#[derive(Debug, Default)]
pub struct EventBuilder {
    event_id: Option<String>,
    actor: Option<Actor>,
    resource: Option<Resource>,
    event_time: Option<Timestamp>,
    payload: Option<Payload>,
}

impl EventBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    pub fn actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn event_time(mut self, ts: Timestamp) -> Self {
        self.event_time = Some(ts);
        self
    }

    pub fn occurred_at(self, ts: DateTime<Utc>) -> Self {
        self.event_time(timestamp::from_datetime(&ts))
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Builds the event.
    ///
    /// Fails with [`ValidationError::MissingField`] if `event_id` is empty or
    /// `actor`, `resource` or `payload` was never set.
    pub fn build(self) -> Result<Event, ValidationError> {
        let event_id = self
            .event_id
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingField("event_id"))?;
        let actor = self.actor.ok_or(ValidationError::MissingField("actor"))?;
        let resource = self
            .resource
            .ok_or(ValidationError::MissingField("resource"))?;
        let payload = self
            .payload
            .ok_or(ValidationError::MissingField("payload"))?;

        let event = Event {
            event_id,
            r#type: payload.event_type() as i32,
            actor: Some(actor),
            resource: Some(resource),
            event_time: Some(
                self.event_time
                    .unwrap_or_else(|| timestamp::from_datetime(&Utc::now())),
            ),
            payload: Some(payload),
            unknown_fields: UnknownFields::new(),
        };
        event.validate()?;
        Ok(event)
    }
}
