//! Outbound side: references to actors living anywhere in the fabric and
//! the transports that carry invocations to them.

mod actor_ref;
mod http;
mod identity;
mod loopback;
mod options;
mod resolver;
mod transport;

pub use actor_ref::ActorRef;
pub use self::http::{ACTOR_SYSTEM_PATH, HttpFabricClient};
pub use identity::ActorIdentity;
pub use loopback::LoopbackFabric;
pub use options::InvocationOptions;
pub use resolver::ActorRefResolver;
pub use transport::FabricTransport;
