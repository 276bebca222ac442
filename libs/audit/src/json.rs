//! Textual representation of audit events.
//!
//! Follows the protobuf JSON mapping with the original proto field names as
//! keys (`event_id`, `event_time`, `organization_created`, ...):
//! - enums render as their symbolic names; codes this build does not know
//!   render as numbers
//! - timestamps render as RFC 3339 strings in UTC
//! - the payload oneof renders as a single key named after the active variant
//! - fields holding their default value are omitted
//!
//! Parsing accepts proto names or lowerCamelCase names, and enum names or
//! numbers. Unknown binary fields have no JSON form and are not rendered.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::entity::{Actor, Resource};
use crate::enums::{ActorType, EventType, ProtoEnum, ResourceType};
use crate::error::Error;
use crate::event::Event;
use crate::payload::{payload_variant_for_key, Payload, PayloadOrganizationCreated, PayloadVariant};
use crate::timestamp;

/// Rendering and parsing settings.
#[derive(Debug, Clone, Default)]
pub struct JsonOptions {
    /// Render fields that hold their default value (unset messages as `null`).
    pub emit_defaults: bool,
    /// Render enums as numbers instead of symbolic names.
    pub enum_as_number: bool,
    /// Skip unrecognised keys while parsing instead of failing.
    pub ignore_unknown_fields: bool,
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders an event as a JSON value.
///
/// Fails only if a timestamp lies outside the RFC 3339 range.
pub fn to_json(event: &Event, options: &JsonOptions) -> Result<Value, Error> {
    let mut out = Map::new();

    if options.emit_defaults || !event.event_id.is_empty() {
        out.insert("event_id".into(), Value::String(event.event_id.clone()));
    }
    if options.emit_defaults || event.r#type != 0 {
        out.insert("type".into(), enum_to_json::<EventType>(event.r#type, options));
    }
    insert_message(&mut out, "actor", event.actor.as_ref(), options, |actor| {
        Ok(descriptor_to_json::<ActorType>(
            actor.r#type,
            &actor.id,
            &actor.name,
            options,
        ))
    })?;
    insert_message(&mut out, "resource", event.resource.as_ref(), options, |resource| {
        Ok(descriptor_to_json::<ResourceType>(
            resource.r#type,
            &resource.id,
            &resource.name,
            options,
        ))
    })?;
    insert_message(&mut out, "event_time", event.event_time.as_ref(), options, |ts| {
        Ok(Value::String(timestamp::format_rfc3339(ts)?))
    })?;
    if let Some(payload) = &event.payload {
        out.insert(payload.json_key().into(), payload_to_json(payload, options)?);
    }

    Ok(Value::Object(out))
}

/// Renders an event as a compact JSON string.
pub fn to_string(event: &Event, options: &JsonOptions) -> Result<String, Error> {
    Ok(serde_json::to_string(&to_json(event, options)?)?)
}

/// Renders an event as an indented JSON string.
pub fn to_string_pretty(event: &Event, options: &JsonOptions) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(&to_json(event, options)?)?)
}

fn insert_message<T>(
    out: &mut Map<String, Value>,
    key: &str,
    value: Option<&T>,
    options: &JsonOptions,
    render: impl FnOnce(&T) -> Result<Value, Error>,
) -> Result<(), Error> {
    match value {
        Some(value) => {
            out.insert(key.into(), render(value)?);
        }
        None if options.emit_defaults => {
            out.insert(key.into(), Value::Null);
        }
        None => {}
    }
    Ok(())
}

fn enum_to_json<E: ProtoEnum>(raw: i32, options: &JsonOptions) -> Value {
    if options.enum_as_number {
        return Value::from(raw);
    }
    match E::try_from(raw) {
        Ok(value) => Value::String(value.as_str_name().to_string()),
        Err(_) => Value::from(raw),
    }
}

fn descriptor_to_json<E: ProtoEnum>(
    raw_type: i32,
    id: &str,
    name: &str,
    options: &JsonOptions,
) -> Value {
    let mut out = Map::new();
    if options.emit_defaults || raw_type != 0 {
        out.insert("type".into(), enum_to_json::<E>(raw_type, options));
    }
    if options.emit_defaults || !id.is_empty() {
        out.insert("id".into(), Value::String(id.to_string()));
    }
    if options.emit_defaults || !name.is_empty() {
        out.insert("name".into(), Value::String(name.to_string()));
    }
    Value::Object(out)
}

fn payload_to_json(payload: &Payload, options: &JsonOptions) -> Result<Value, Error> {
    match payload {
        Payload::OrganizationCreated(value) => {
            let mut out = Map::new();
            insert_message(
                &mut out,
                "created_time",
                value.created_time.as_ref(),
                options,
                |ts| Ok(Value::String(timestamp::format_rfc3339(ts)?)),
            )?;
            Ok(Value::Object(out))
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses an event from a JSON value.
pub fn from_json(value: &Value, options: &JsonOptions) -> Result<Event, Error> {
    let object = expect_object(value, "Event")?;
    reject_duplicate_spellings(
        object,
        "Event",
        &[("event_id", "eventId"), ("event_time", "eventTime")],
    )?;
    let mut event = Event::default();

    for (key, value) in object {
        match key.as_str() {
            "event_id" | "eventId" => event.event_id = parse_string(value, key)?,
            "type" => event.r#type = parse_enum::<EventType>(value, key)?,
            "actor" => {
                event.actor = parse_message(value, |v| {
                    let (r#type, id, name) = parse_descriptor::<ActorType>(v, "Actor", options)?;
                    Ok(Actor {
                        r#type,
                        id,
                        name,
                        ..Default::default()
                    })
                })?
            }
            "resource" => {
                event.resource = parse_message(value, |v| {
                    let (r#type, id, name) =
                        parse_descriptor::<ResourceType>(v, "Resource", options)?;
                    Ok(Resource {
                        r#type,
                        id,
                        name,
                        ..Default::default()
                    })
                })?
            }
            "event_time" | "eventTime" => {
                event.event_time = parse_message(value, |v| parse_timestamp(v, key))?
            }
            other => match payload_variant_for_key(other) {
                Some(variant) => {
                    if value.is_null() {
                        continue;
                    }
                    if let Some(active) = &event.payload {
                        return Err(Error::Json(format!(
                            "payload oneof already set to '{}', cannot also set '{}'",
                            active.json_key(),
                            variant.json_key
                        )));
                    }
                    event.payload = Some(payload_from_json(variant, value, options)?);
                }
                None if options.ignore_unknown_fields => {
                    tracing::trace!(key = %other, "ignoring unknown audit event JSON key");
                }
                None => {
                    return Err(Error::Json(format!("unknown field '{other}' in Event")));
                }
            },
        }
    }

    Ok(event)
}

/// Parses an event from JSON text.
pub fn from_str(input: &str, options: &JsonOptions) -> Result<Event, Error> {
    let value: Value = serde_json::from_str(input)?;
    from_json(&value, options)
}

fn payload_from_json(
    variant: &PayloadVariant,
    value: &Value,
    options: &JsonOptions,
) -> Result<Payload, Error> {
    match variant.event_type {
        EventType::OrganizationCreated => {
            let object = expect_object(value, variant.json_key)?;
            reject_duplicate_spellings(object, variant.json_key, &[("created_time", "createdTime")])?;
            let mut payload = PayloadOrganizationCreated::default();
            for (key, value) in object {
                match key.as_str() {
                    "created_time" | "createdTime" => {
                        payload.created_time = parse_message(value, |v| parse_timestamp(v, key))?
                    }
                    other => reject_unknown(other, variant.json_key, options)?,
                }
            }
            Ok(Payload::OrganizationCreated(payload))
        }
        EventType::Unspecified => Err(Error::Json(format!(
            "no payload is defined for {}",
            EventType::Unspecified
        ))),
    }
}

fn parse_descriptor<E: ProtoEnum>(
    value: &Value,
    message: &str,
    options: &JsonOptions,
) -> Result<(i32, String, String), Error> {
    let object = expect_object(value, message)?;
    let (mut raw_type, mut id, mut name) = (0, String::new(), String::new());
    for (key, value) in object {
        match key.as_str() {
            "type" => raw_type = parse_enum::<E>(value, key)?,
            "id" => id = parse_string(value, key)?,
            "name" => name = parse_string(value, key)?,
            other => reject_unknown(other, message, options)?,
        }
    }
    Ok((raw_type, id, name))
}

fn reject_unknown(key: &str, message: &str, options: &JsonOptions) -> Result<(), Error> {
    if options.ignore_unknown_fields {
        Ok(())
    } else {
        Err(Error::Json(format!("unknown field '{key}' in {message}")))
    }
}

/// A field may be spelled with its proto name or its lowerCamelCase name,
/// but not both in one object.
fn reject_duplicate_spellings(
    object: &Map<String, Value>,
    message: &str,
    spellings: &[(&str, &str)],
) -> Result<(), Error> {
    for (proto_name, camel_name) in spellings {
        if object.contains_key(*proto_name) && object.contains_key(*camel_name) {
            return Err(Error::Json(format!(
                "field '{proto_name}' given twice in {message} (also as '{camel_name}')"
            )));
        }
    }
    Ok(())
}

fn expect_object<'a>(value: &'a Value, message: &str) -> Result<&'a Map<String, Value>, Error> {
    value
        .as_object()
        .ok_or_else(|| Error::Json(format!("expected object for {message}, got {value}")))
}

/// `null` means "unset" for message-typed fields.
fn parse_message<T>(
    value: &Value,
    parse: impl FnOnce(&Value) -> Result<T, Error>,
) -> Result<Option<T>, Error> {
    if value.is_null() {
        Ok(None)
    } else {
        parse(value).map(Some)
    }
}

fn parse_string(value: &Value, key: &str) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(Error::Json(format!("expected string for '{key}', got {other}"))),
    }
}

fn parse_enum<E: ProtoEnum>(value: &Value, key: &str) -> Result<i32, Error> {
    match value {
        Value::String(s) => E::from_str_name(s).map(Into::into).ok_or_else(|| {
            Error::Json(format!("unknown {} value '{s}' for '{key}'", E::FULL_NAME))
        }),
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| Error::Json(format!("enum value out of range for '{key}': {n}"))),
        Value::Null => Ok(0),
        other => Err(Error::Json(format!(
            "expected enum name or number for '{key}', got {other}"
        ))),
    }
}

fn parse_timestamp(value: &Value, key: &str) -> Result<prost_types::Timestamp, Error> {
    match value {
        Value::String(s) => Ok(timestamp::parse_rfc3339(s)?),
        other => Err(Error::Json(format!(
            "expected RFC 3339 string for '{key}', got {other}"
        ))),
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        to_json(self, &JsonOptions::default())
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        from_json(&value, &JsonOptions::default()).map_err(serde::de::Error::custom)
    }
}
