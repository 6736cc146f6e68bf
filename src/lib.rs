// ============================================================================
// Spawn SDK
// ============================================================================
//
// Hosts Rust actors for an external Spawn actor fabric. The fabric owns actor
// identity, placement and persistence; this crate receives invocations from
// it, runs the matching handler and answers with the new state and any
// follow-on workflow. It also lets Rust code call actors living anywhere in
// the fabric.

extern crate self as spawn_sdk;

pub mod actors;
pub mod cache;
pub mod client;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod workflows;

// Re-export main types for convenience
pub use actors::{
    ActionResult, ActorBuilder, ActorContext, ActorDescriptor, ActorKind, ActorRegistry,
    ReplyMode, SystemHandle, Value,
};
pub use cache::{ActorInstanceKey, InstanceCache};
pub use client::{
    ActorIdentity, ActorRef, ActorRefResolver, FabricTransport, HttpFabricClient,
    InvocationOptions, LoopbackFabric,
};
pub use config::{CacheConfig, SpawnConfig, TransportConfig};
pub use crate::core::{Empty, ErrorKind, Message, Noop, Result, SpawnError, Stateless, TypedAny};
pub use dispatch::DispatchEngine;
pub use runtime::SpawnRuntime;
pub use workflows::{Broadcast, Forward, Pipe, SideEffect, WorkflowBuilder};

/// `#[derive(Message)]`, see [`core::Message`].
pub use spawn_sdk_derive::Message;
