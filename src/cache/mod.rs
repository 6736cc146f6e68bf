//! Size- and time-bounded caches with compute-if-absent semantics.

mod expiring;
mod instance;

pub use expiring::ExpiringCache;
pub use instance::{ActorInstance, ActorInstanceKey, InstanceCache};
