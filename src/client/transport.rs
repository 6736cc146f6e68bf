use crate::core::Result;
use crate::protocol::{
    ActorId, InvocationRequest, InvocationResponse, RegistrationRequest, RegistrationResponse,
    SpawnResponse,
};
use async_trait::async_trait;

/// The three calls this process makes to the fabric.
#[async_trait]
pub trait FabricTransport: Send + Sync {
    /// Announces this process and its actor system. Sent once at startup.
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResponse>;

    /// Creates actors spawned from a registered parent definition.
    async fn create(&self, system: &str, actors: Vec<ActorId>) -> Result<SpawnResponse>;

    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse>;
}
