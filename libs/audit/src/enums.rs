//! Enumerations carried by audit events.
//!
//! Every enum reserves `0` for "unspecified". Records store enum fields as raw
//! `i32` codes so that values added by newer producers are kept as-is; the
//! helpers here resolve those codes to names without failing on unknown ones.

use std::borrow::Cow;

use crate::macros::proto_enum;

/// A schema enum with symbolic proto names.
pub trait ProtoEnum: Copy + TryFrom<i32> + Into<i32> + 'static {
    /// Fully qualified proto name of the enum.
    const FULL_NAME: &'static str;

    /// The symbolic name, e.g. `ACTOR_TYPE_USER`.
    fn as_str_name(&self) -> &'static str;

    /// Parses a symbolic name back into a value.
    fn from_str_name(value: &str) -> Option<Self>;

    /// All values known to this build, in declaration order.
    fn values() -> &'static [Self];
}

/// Resolves a raw code to its symbolic name.
///
/// Codes this build does not know render as their decimal value, the same
/// placeholder the JSON mapping uses.
pub fn enum_name<E: ProtoEnum>(raw: i32) -> Cow<'static, str> {
    match E::try_from(raw) {
        Ok(value) => Cow::Borrowed(value.as_str_name()),
        Err(_) => Cow::Owned(raw.to_string()),
    }
}

/// Returns true if `raw` is a code this build knows for `E`.
pub fn is_known<E: ProtoEnum>(raw: i32) -> bool {
    E::try_from(raw).is_ok()
}

proto_enum! {
    /// The type of actor that caused the audited event.
    ActorType, "buf.alpha.audit.v1alpha1.ActorType" {
        Unspecified = 0 => "ACTOR_TYPE_UNSPECIFIED",
        User = 1 => "ACTOR_TYPE_USER",
    }
}

proto_enum! {
    /// The type of the resource affected by the audited event.
    ResourceType, "buf.alpha.audit.v1alpha1.ResourceType" {
        Unspecified = 0 => "RESOURCE_TYPE_UNSPECIFIED",
        User = 1 => "RESOURCE_TYPE_USER",
        Organization = 2 => "RESOURCE_TYPE_ORGANIZATION",
        OrganizationMember = 3 => "RESOURCE_TYPE_ORGANIZATION_MEMBER",
        Repository = 4 => "RESOURCE_TYPE_REPOSITORY",
        RepositoryMember = 5 => "RESOURCE_TYPE_REPOSITORY_MEMBER",
        RepositoryCommit = 6 => "RESOURCE_TYPE_REPOSITORY_COMMIT",
        Plugin = 7 => "RESOURCE_TYPE_PLUGIN",
    }
}

proto_enum! {
    /// The type of audited event.
    ///
    /// Each non-zero value has exactly one payload variant; see
    /// [`crate::PAYLOAD_VARIANTS`].
    EventType, "buf.alpha.audit.v1alpha1.EventType" {
        Unspecified = 0 => "EVENT_TYPE_UNSPECIFIED",
        OrganizationCreated = 1 => "EVENT_TYPE_ORGANIZATION_CREATED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_type_names() {
        assert_eq!(enum_name::<ActorType>(1), "ACTOR_TYPE_USER");
        assert_eq!(enum_name::<ActorType>(0), "ACTOR_TYPE_UNSPECIFIED");
        assert_eq!(enum_name::<ActorType>(99), "99");
        assert_eq!(ActorType::User.to_string(), "ACTOR_TYPE_USER");
    }

    #[test]
    fn test_unknown_code_is_not_an_error() {
        assert!(ActorType::try_from(99).is_err());
        assert!(!is_known::<ActorType>(99));
        assert!(is_known::<ResourceType>(7));
        assert_eq!(enum_name::<ResourceType>(-3), "-3");
    }

    #[test]
    fn test_full_names_use_schema_package() {
        assert_eq!(ActorType::FULL_NAME, "buf.alpha.audit.v1alpha1.ActorType");
        assert_eq!(ResourceType::FULL_NAME, "buf.alpha.audit.v1alpha1.ResourceType");
        assert_eq!(EventType::FULL_NAME, "buf.alpha.audit.v1alpha1.EventType");
    }

    #[test]
    fn test_zero_is_default() {
        assert_eq!(ActorType::default(), ActorType::Unspecified);
        assert_eq!(ResourceType::default(), ResourceType::Unspecified);
        assert_eq!(EventType::default(), EventType::Unspecified);
    }

    #[test]
    fn test_name_lookup_roundtrip() {
        for value in ResourceType::values() {
            assert_eq!(ResourceType::from_str_name(value.as_str_name()), Some(*value));
            assert_eq!(ResourceType::try_from(i32::from(*value)).ok(), Some(*value));
        }
        assert_eq!(ResourceType::values().len(), 8);
        assert_eq!(ResourceType::from_str_name("RESOURCE_TYPE_TEAM"), None);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ResourceType::Organization as i32, 2);
        assert_eq!(ResourceType::OrganizationMember as i32, 3);
        assert_eq!(ResourceType::RepositoryCommit as i32, 6);
        assert_eq!(ResourceType::Plugin as i32, 7);
        assert_eq!(EventType::OrganizationCreated as i32, 1);
    }

    #[test]
    fn test_enum_serde_uses_symbolic_names() {
        assert_eq!(
            serde_json::to_string(&EventType::OrganizationCreated).unwrap(),
            "\"EVENT_TYPE_ORGANIZATION_CREATED\""
        );
        let parsed: ResourceType = serde_json::from_str("\"RESOURCE_TYPE_PLUGIN\"").unwrap();
        assert_eq!(parsed, ResourceType::Plugin);
        assert!(serde_json::from_str::<ResourceType>("\"plugin\"").is_err());
    }
}
