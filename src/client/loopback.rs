use super::transport::FabricTransport;
use crate::core::{Result, SpawnError, TypedAny};
use crate::dispatch::DispatchEngine;
use crate::protocol::{
    ActorId, ActorInvocation, BroadcastDirective, BroadcastPayload, Context, InvocationRequest,
    InvocationResponse, PROTOCOL_MAJOR_VERSION, PROTOCOL_MINOR_VERSION, ProxyInfo,
    RegistrationRequest, RegistrationResponse, RequestStatus, SpawnResponse, StatusCode,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{Level, event};

/// In-process fabric that routes invocations straight into a
/// [`DispatchEngine`].
///
/// Keeps actor state between calls and carries out workflow directives, so a
/// whole actor system can run without a proxy. Meant for tests and local
/// development.
pub struct LoopbackFabric {
    me: Weak<LoopbackFabric>,
    engine: OnceLock<Weak<DispatchEngine>>,
    states: Mutex<HashMap<(String, String), TypedAny>>,
    parents: Mutex<HashMap<(String, String), String>>,
    registrations: Mutex<Vec<RegistrationRequest>>,
}

impl LoopbackFabric {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            engine: OnceLock::new(),
            states: Mutex::new(HashMap::new()),
            parents: Mutex::new(HashMap::new()),
            registrations: Mutex::new(Vec::new()),
        })
    }

    /// Connects the engine invocations are routed to. Only the first call wins.
    pub fn attach(&self, engine: &Arc<DispatchEngine>) -> Result<()> {
        self.engine
            .set(Arc::downgrade(engine))
            .map_err(|_| SpawnError::Config("loopback fabric already has an engine".to_string()))
    }

    /// Last state the fabric holds for an actor.
    pub async fn state_of(&self, system: &str, actor: &str) -> Option<TypedAny> {
        let states = self.states.lock().await;
        states.get(&(system.to_string(), actor.to_string())).cloned()
    }

    pub async fn registrations(&self) -> Vec<RegistrationRequest> {
        self.registrations.lock().await.clone()
    }

    fn engine(&self) -> Result<Arc<DispatchEngine>> {
        self.engine
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| SpawnError::Transport("loopback fabric has no engine attached".to_string()))
    }

    async fn run(&self, request: InvocationRequest) -> Result<InvocationResponse> {
        let engine = self.engine()?;
        let key = (request.system.clone(), request.actor.name.clone());
        let parent = match request.actor.parent.clone() {
            Some(parent) => Some(parent),
            None => self.parents.lock().await.get(&key).cloned(),
        };
        let state = self.states.lock().await.get(&key).cloned();

        let actor = ActorId {
            name: request.actor.name.clone(),
            system: request.system.clone(),
            parent,
        };
        let invocation = ActorInvocation {
            actor: actor.clone(),
            action_name: request.action_name.clone(),
            payload: request.value.clone(),
            current_context: Context {
                state,
                metadata: request.metadata.clone(),
            },
            caller: request.caller.clone(),
        };

        let reply = engine.dispatch_or_reply_error(invocation).await;
        if reply.status.status != StatusCode::Ok {
            return Ok(InvocationResponse::failed(reply.status, request.system));
        }
        if let Some(state) = reply.updated_context.state.clone() {
            self.states.lock().await.insert(key, state);
        }

        for effect in reply.workflow.effects.iter().cloned() {
            self.spawn_delivery(effect.request);
        }
        if let Some(broadcast) = &reply.workflow.broadcast {
            self.broadcast(&engine, &request.system, broadcast);
        }

        if let Some(forward) = &reply.workflow.forward {
            let next = follow_up(&request, &forward.actor, &forward.action_name, request.value.clone());
            return self.invoke(next).await;
        }
        if let Some(pipe) = &reply.workflow.pipe {
            let next = follow_up(&request, &pipe.actor, &pipe.action_name, reply.value.clone());
            return self.invoke(next).await;
        }

        let value = (!reply.value.is_marker()).then_some(reply.value);
        Ok(InvocationResponse::ok(request.system, actor, value))
    }

    fn broadcast(&self, engine: &DispatchEngine, system: &str, broadcast: &BroadcastDirective) {
        let Some(action) = broadcast.action_name.clone() else {
            event!(
                Level::WARN,
                channel = %broadcast.channel_group,
                "broadcast without action name is not delivered by the loopback fabric"
            );
            return;
        };
        let value = match &broadcast.payload {
            BroadcastPayload::Value(value) => value.clone(),
            BroadcastPayload::Noop => TypedAny::noop(),
        };
        let subscribers = engine
            .registry()
            .iter()
            .filter(|d| d.channel() == Some(broadcast.channel_group.as_str()));
        for descriptor in subscribers {
            self.spawn_delivery(InvocationRequest {
                system: system.to_string(),
                actor: ActorId::new(system, descriptor.name()),
                action_name: action.clone(),
                value: value.clone(),
                async_mode: true,
                metadata: HashMap::new(),
                scheduled_to: None,
                caller: None,
            });
        }
    }

    fn spawn_delivery(&self, request: InvocationRequest) {
        let Some(fabric) = self.me.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            if let Some(at) = request.scheduled_to {
                let wait = at.saturating_sub(Utc::now().timestamp_millis()).max(0);
                tokio::time::sleep(Duration::from_millis(wait as u64)).await;
            }
            if let Err(err) = fabric.run(request).await {
                event!(Level::WARN, error = %err, "loopback delivery failed");
            }
        });
    }
}

fn follow_up(
    request: &InvocationRequest,
    actor: &str,
    action: &str,
    value: TypedAny,
) -> InvocationRequest {
    InvocationRequest {
        system: request.system.clone(),
        actor: ActorId::new(request.system.clone(), actor),
        action_name: action.to_string(),
        value,
        async_mode: false,
        metadata: request.metadata.clone(),
        scheduled_to: None,
        caller: Some(request.actor.clone()),
    }
}

#[async_trait]
impl FabricTransport for LoopbackFabric {
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResponse> {
        self.registrations.lock().await.push(request);
        Ok(RegistrationResponse {
            status: RequestStatus::ok(),
            proxy_info: Some(ProxyInfo {
                protocol_major_version: PROTOCOL_MAJOR_VERSION,
                protocol_minor_version: PROTOCOL_MINOR_VERSION,
                proxy_name: "loopback".to_string(),
                proxy_version: env!("CARGO_PKG_VERSION").to_string(),
            }),
        })
    }

    async fn create(&self, system: &str, actors: Vec<ActorId>) -> Result<SpawnResponse> {
        let mut parents = self.parents.lock().await;
        for actor in actors {
            let Some(parent) = actor.parent else {
                return Ok(SpawnResponse {
                    status: RequestStatus::error(format!(
                        "actor '{}' has no parent to spawn from",
                        actor.name
                    )),
                });
            };
            parents.insert((system.to_string(), actor.name), parent);
        }
        Ok(SpawnResponse {
            status: RequestStatus::ok(),
        })
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse> {
        if request.async_mode {
            let system = request.system.clone();
            let actor = request.actor.clone();
            self.spawn_delivery(request);
            return Ok(InvocationResponse::ok(system, actor, None));
        }
        self.run(request).await
    }
}
