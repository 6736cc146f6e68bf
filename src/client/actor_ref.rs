use super::identity::ActorIdentity;
use super::options::InvocationOptions;
use super::transport::FabricTransport;
use crate::core::{Message, Result, SpawnError, TypedAny};
use crate::protocol::{
    ActorId, InvocationRequest, InvocationResponse, REQUEST_TIMEOUT_METADATA, StatusCode,
};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, Level, event, info_span};

/// Location-transparent handle to one actor.
///
/// Cheap to clone. Obtained from an
/// [`ActorRefResolver`](super::ActorRefResolver) or a
/// [`SystemHandle`](crate::actors::SystemHandle).
#[derive(Clone)]
pub struct ActorRef {
    identity: ActorIdentity,
    transport: Arc<dyn FabricTransport>,
    async_permits: Arc<Semaphore>,
}

impl ActorRef {
    pub(crate) fn new(
        identity: ActorIdentity,
        transport: Arc<dyn FabricTransport>,
        async_permits: Arc<Semaphore>,
    ) -> Self {
        Self {
            identity,
            transport,
            async_permits,
        }
    }

    pub fn identity(&self) -> &ActorIdentity {
        &self.identity
    }

    pub fn actor_id(&self) -> ActorId {
        self.identity.actor_id()
    }

    pub fn actor_name(&self) -> &str {
        &self.identity.name
    }

    pub fn system(&self) -> &str {
        &self.identity.system
    }

    /// Invokes an action that takes no payload.
    pub async fn invoke<O: Message>(&self, action: &str) -> Result<Option<O>> {
        self.call(action, TypedAny::empty(), InvocationOptions::default())
            .await
    }

    pub async fn invoke_with<I: Message, O: Message>(
        &self,
        action: &str,
        payload: &I,
    ) -> Result<Option<O>> {
        self.invoke_with_options(action, payload, InvocationOptions::default())
            .await
    }

    /// With `async_mode` set the call is sent fire-and-forget and resolves to
    /// `None` right away.
    pub async fn invoke_with_options<I: Message, O: Message>(
        &self,
        action: &str,
        payload: &I,
        options: InvocationOptions,
    ) -> Result<Option<O>> {
        self.route(action, TypedAny::pack(payload)?, options).await
    }

    /// Payload-less counterpart of
    /// [`invoke_with_options`](Self::invoke_with_options).
    pub async fn invoke_with_options_no_args<O: Message>(
        &self,
        action: &str,
        options: InvocationOptions,
    ) -> Result<Option<O>> {
        self.route(action, TypedAny::empty(), options).await
    }

    /// Fire-and-forget call without payload. Failures are only logged.
    pub fn invoke_async(&self, action: &str) {
        self.send_async(action, TypedAny::empty(), InvocationOptions::default());
    }

    pub fn invoke_async_with<I: Message>(&self, action: &str, payload: &I) {
        self.invoke_async_with_options(action, payload, InvocationOptions::default());
    }

    pub fn invoke_async_with_options<I: Message>(
        &self,
        action: &str,
        payload: &I,
        options: InvocationOptions,
    ) {
        match TypedAny::pack(payload) {
            Ok(value) => self.send_async(action, value, options),
            Err(err) => event!(
                Level::WARN,
                actor = %self.identity.name,
                action = %action,
                error = %err,
                "dropping async invocation with unencodable payload"
            ),
        }
    }

    pub fn invoke_async_with_options_no_args(&self, action: &str, options: InvocationOptions) {
        self.send_async(action, TypedAny::empty(), options);
    }

    /// Builds the outbound envelope for one call.
    pub fn request(&self, action: &str, value: TypedAny, options: &InvocationOptions) -> InvocationRequest {
        let mut metadata = HashMap::new();
        metadata.insert(
            REQUEST_TIMEOUT_METADATA.to_string(),
            options.timeout_millis().to_string(),
        );
        InvocationRequest {
            system: self.identity.system.clone(),
            actor: self.actor_id(),
            action_name: action.to_string(),
            value,
            async_mode: options.async_mode,
            metadata,
            scheduled_to: options.schedule_millis(Utc::now()),
            caller: None,
        }
    }

    async fn route<O: Message>(
        &self,
        action: &str,
        value: TypedAny,
        options: InvocationOptions,
    ) -> Result<Option<O>> {
        if options.async_mode {
            self.send_async(action, value, options);
            return Ok(None);
        }
        self.call(action, value, options).await
    }

    async fn call<O: Message>(
        &self,
        action: &str,
        value: TypedAny,
        options: InvocationOptions,
    ) -> Result<Option<O>> {
        let request = self.request(action, value, &options);
        let span = info_span!(
            "spawn.invoke",
            system = %self.identity.system,
            actor = %self.identity.name,
            action = %action
        );
        async move {
            let response = self.transport.invoke(request).await?;
            self.map_response(response)
        }
        .instrument(span)
        .await
    }

    fn map_response<O: Message>(&self, response: InvocationResponse) -> Result<Option<O>> {
        match response.status.status {
            StatusCode::Ok => match response.value {
                Some(value) if !value.is_marker() => Ok(Some(value.unpack::<O>()?)),
                _ => Ok(None),
            },
            StatusCode::ActorNotFound => Err(SpawnError::ActorNotFound(self.identity.name.clone())),
            StatusCode::Error | StatusCode::Unknown => {
                Err(SpawnError::Invocation(response.status.message))
            }
        }
    }

    fn send_async(&self, action: &str, value: TypedAny, mut options: InvocationOptions) {
        options.async_mode = true;
        let request = self.request(action, value, &options);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            event!(
                Level::WARN,
                actor = %self.identity.name,
                action = %action,
                "async invocation requires a tokio runtime; dropped"
            );
            return;
        };

        let transport = Arc::clone(&self.transport);
        let permits = Arc::clone(&self.async_permits);
        let span = info_span!(
            "spawn.invoke_async",
            system = %self.identity.system,
            actor = %self.identity.name,
            action = %action
        );
        runtime.spawn(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                match transport.invoke(request).await {
                    Ok(response) if response.status.is_ok() => {
                        event!(Level::TRACE, "async invocation delivered");
                    }
                    Ok(response) => event!(
                        Level::WARN,
                        status = ?response.status.status,
                        message = %response.status.message,
                        "async invocation rejected by fabric"
                    ),
                    Err(err) => event!(Level::WARN, error = %err, "async invocation failed"),
                }
            }
            .instrument(span),
        );
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef")
            .field("identity", &self.identity)
            .finish()
    }
}
