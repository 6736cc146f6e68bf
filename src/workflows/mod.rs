//! Follow-on intents a handler can attach to its result, and their
//! translation into wire-level [`Workflow`](crate::protocol::Workflow) blocks.

mod builder;
mod directives;

pub use builder::{WorkflowBuilder, effective_schedule};
pub use directives::{Broadcast, Forward, Pipe, SideEffect};
