//! Actor definitions and the handler-facing API.
//!
//! Actors are declared with [`ActorBuilder`], which erases the user's types
//! into an [`ActorDescriptor`] function table. Descriptors are collected in an
//! immutable [`ActorRegistry`] that the dispatch engine reads from.

pub mod builder;
pub mod context;
pub mod descriptor;
pub mod registry;
pub mod value;

pub use builder::ActorBuilder;
pub use context::{ActorContext, InvocationContext, SystemHandle};
pub use descriptor::{
    ActionHandler, ActionSpec, ActorDescriptor, DispatchKind, HandlerInstance, InstanceFactory,
    StateType,
};
pub use registry::ActorRegistry;
pub use value::{ActionResult, ReplyMode, Value};

pub use crate::protocol::ActorKind;

/// Default idle time before the fabric deactivates an actor.
pub const DEFAULT_DEACTIVATION_TIMEOUT_MS: u64 = 60_000;
/// Default interval between state snapshots of a stateful actor.
pub const DEFAULT_SNAPSHOT_TIMEOUT_MS: u64 = 50_000;
/// Name of the action registered by [`ActorBuilder::init`].
pub const INIT_ACTION: &str = "Init";
