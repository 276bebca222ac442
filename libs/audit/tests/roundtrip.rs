//! Randomized round trips through the binary and JSON forms.

use proptest::prelude::*;
use prost_types::Timestamp;
use registry_audit::{
    decode, encode_to_vec, json, timestamp, Actor, Event, JsonOptions, Payload,
    PayloadOrganizationCreated, Resource,
};

fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
    (
        timestamp::MIN_SECONDS..=timestamp::MAX_SECONDS,
        0..1_000_000_000i32,
    )
        .prop_map(|(seconds, nanos)| Timestamp { seconds, nanos })
}

// Codes outside the known range stand in for values from newer producers.
fn arb_code() -> impl Strategy<Value = i32> {
    prop_oneof![4 => 0..8i32, 1 => -3..100i32]
}

fn arb_actor() -> impl Strategy<Value = Actor> {
    (arb_code(), "[a-z0-9-]{0,12}", "\\PC{0,16}").prop_map(|(r#type, id, name)| Actor {
        r#type,
        id,
        name,
        ..Default::default()
    })
}

fn arb_resource() -> impl Strategy<Value = Resource> {
    (arb_code(), "[a-z0-9-]{0,12}", "\\PC{0,16}").prop_map(|(r#type, id, name)| Resource {
        r#type,
        id,
        name,
        ..Default::default()
    })
}

fn arb_payload() -> impl Strategy<Value = Payload> {
    proptest::option::of(arb_timestamp()).prop_map(|created_time| {
        Payload::OrganizationCreated(PayloadOrganizationCreated {
            created_time,
            ..Default::default()
        })
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    (
        "[a-zA-Z0-9_-]{0,26}",
        prop_oneof![0..2i32, 2..50i32],
        proptest::option::of(arb_actor()),
        proptest::option::of(arb_resource()),
        proptest::option::of(arb_timestamp()),
        proptest::option::of(arb_payload()),
    )
        .prop_map(|(event_id, r#type, actor, resource, event_time, payload)| Event {
            event_id,
            r#type,
            actor,
            resource,
            event_time,
            payload,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn binary_roundtrip(event in arb_event()) {
        let bytes = encode_to_vec(&event);
        let decoded = decode(bytes.as_slice()).unwrap();
        prop_assert_eq!(&decoded, &event);
        prop_assert_eq!(encode_to_vec(&decoded), bytes);
    }

    #[test]
    fn json_roundtrip(event in arb_event()) {
        let options = JsonOptions::default();
        let text = json::to_string(&event, &options).unwrap();
        let parsed = json::from_str(&text, &options).unwrap();
        prop_assert_eq!(parsed, event);
    }

    #[test]
    fn json_roundtrip_with_defaults_and_numbers(event in arb_event()) {
        let options = JsonOptions {
            emit_defaults: true,
            enum_as_number: true,
            ..Default::default()
        };
        let value = json::to_json(&event, &options).unwrap();
        prop_assert_eq!(json::from_json(&value, &options).unwrap(), event);
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(bytes.as_slice());
    }
}
