//! Server-side invocation pipeline: decode, resolve, run one action, encode.

use crate::actors::{ActionHandler, ActorRegistry, InvocationContext, SystemHandle};
use crate::cache::{ActorInstanceKey, InstanceCache};
use crate::config::CacheConfig;
use crate::core::{Result, SpawnError, TypedAny};
use crate::protocol::{
    self, ActorInvocation, ActorInvocationResponse, Context, RequestStatus, Workflow,
};
use crate::workflows::WorkflowBuilder;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// Runs inbound invocations against the registered actors.
///
/// The only state shared between requests is the instance cache.
pub struct DispatchEngine {
    registry: Arc<ActorRegistry>,
    instances: InstanceCache,
    system: SystemHandle,
}

impl DispatchEngine {
    pub fn new(registry: Arc<ActorRegistry>, system: SystemHandle, cache: &CacheConfig) -> Self {
        Self {
            registry,
            instances: InstanceCache::new(cache),
            system,
        }
    }

    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    pub fn instances(&self) -> &InstanceCache {
        &self.instances
    }

    pub fn system(&self) -> &SystemHandle {
        &self.system
    }

    /// Decodes a raw invocation and returns the encoded reply.
    ///
    /// Only a malformed envelope is an error here. Failures after decoding
    /// are reported inside the reply through its status.
    pub async fn handle(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let invocation: ActorInvocation = protocol::decode(raw)?;
        let response = self.dispatch_or_reply_error(invocation).await;
        protocol::encode(&response)
    }

    pub async fn dispatch_or_reply_error(&self, invocation: ActorInvocation) -> ActorInvocationResponse {
        let actor_name = invocation.actor.name.clone();
        let actor_system = invocation.actor.system.clone();
        match self.dispatch(invocation).await {
            Ok(response) => response,
            Err(err) => error_response(actor_name, actor_system, &err),
        }
    }

    /// Runs exactly one handler action for `invocation`.
    pub async fn dispatch(&self, invocation: ActorInvocation) -> Result<ActorInvocationResponse> {
        let span = info_span!(
            "spawn.dispatch",
            system = %invocation.actor.system,
            actor = %invocation.actor.name,
            action = %invocation.action_name
        );
        async move {
            let result = self.run(invocation).await;
            if let Err(err) = &result {
                event!(Level::ERROR, error = %err, kind = ?err.kind(), "dispatch failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, invocation: ActorInvocation) -> Result<ActorInvocationResponse> {
        let ActorInvocation {
            actor,
            action_name,
            payload,
            current_context,
            caller,
        } = invocation;

        let descriptor = self
            .registry
            .resolve(&actor.name, actor.parent.as_deref())
            .cloned()
            .ok_or_else(|| SpawnError::ActorNotFound(actor.name.clone()))?;

        let key = ActorInstanceKey::new(actor.system.clone(), actor.name.clone());
        let instance = self
            .instances
            .get_or_create(key, &descriptor, || descriptor.new_instance())
            .await?;

        let spec = descriptor
            .action(&action_name)
            .cloned()
            .ok_or_else(|| SpawnError::ActionNotFound {
                actor: descriptor.name().to_string(),
                action: action_name.clone(),
            })?;

        let prior_state = descriptor.decode_state(current_context.state.as_ref())?;
        let context = InvocationContext::new(actor.clone(), prior_state, self.system.clone())
            .with_caller(caller);

        let result = {
            let mut handler = instance.handler().lock().await;
            match spec.handler() {
                ActionHandler::NoArgs(action) => action(&mut handler, context)?,
                ActionHandler::WithPayload(action) => action(&mut handler, context, &payload)?,
            }
        };

        event!(
            Level::DEBUG,
            checkpoint = result.checkpoint,
            has_state = result.response_state.is_some(),
            effects = result.side_effects.len(),
            "action completed"
        );

        Ok(ActorInvocationResponse {
            value: result.reply_value(),
            updated_context: Context {
                state: result.response_state.clone(),
                metadata: Default::default(),
            },
            checkpoint: result.checkpoint,
            workflow: WorkflowBuilder::build(&result),
            actor_name: actor.name,
            actor_system: actor.system,
            status: RequestStatus::ok(),
        })
    }
}

/// Reply envelope describing a failed dispatch.
pub fn error_response(
    actor_name: String,
    actor_system: String,
    err: &SpawnError,
) -> ActorInvocationResponse {
    let status = match err {
        SpawnError::ActorNotFound(_) => RequestStatus::actor_not_found(err.to_string()),
        _ => RequestStatus::error(err.to_string()),
    };
    ActorInvocationResponse {
        actor_name,
        actor_system,
        value: TypedAny::noop(),
        updated_context: Context::default(),
        checkpoint: false,
        workflow: Workflow::default(),
        status,
    }
}
