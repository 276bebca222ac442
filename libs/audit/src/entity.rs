//! Actor and resource descriptors.
//!
//! Both are plain `{ type, id, name }` records. `id` is expected to be stable;
//! `name` is the display label as of the time of the event and is never
//! refreshed. This layer does not check `id` formats or whether the type and
//! id agree.

use crate::enums::{ActorType, ResourceType};
use crate::macros::define_descriptor;

define_descriptor! {
    /// The actor who caused the audited event.
    Actor, ActorType
}

define_descriptor! {
    /// The resource affected by the audited event.
    Resource, ResourceType
}

pub(crate) static EMPTY_ACTOR: Actor = Actor::empty();
pub(crate) static EMPTY_RESOURCE: Resource = Resource::empty();
