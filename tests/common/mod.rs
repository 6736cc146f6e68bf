#![allow(dead_code)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spawn_sdk::protocol::{
    ActorId, ActorInvocation, Context, InvocationRequest, InvocationResponse, RegistrationRequest,
    RegistrationResponse, RequestStatus, SpawnResponse,
};
use spawn_sdk::{
    ActorBuilder, ActorDescriptor, ActorRegistry, CacheConfig, DispatchEngine, FabricTransport,
    Message, SpawnError, SystemHandle, TypedAny, Value,
};
use std::sync::{Arc, Mutex};

pub const SYSTEM: &str = "sys";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Message)]
#[message(type_name = "test.GreeterState")]
pub struct GreeterState {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Message)]
#[message(type_name = "test.Tag")]
pub struct Tag {
    pub value: String,
}

impl Tag {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Message)]
#[message(type_name = "test.Ack")]
pub struct Ack {
    pub count: usize,
}

pub struct Greeter;

/// Stateful actor appending tags to its state.
pub fn greeter() -> ActorDescriptor {
    ActorBuilder::<Greeter, GreeterState>::stateful("Greeter", || Ok(Greeter))
        .action("SetTag", |_, ctx, tag: Tag| {
            let mut state = ctx.state().cloned().unwrap_or_default();
            state.tags.push(tag.value);
            let count = state.tags.len();
            Ok(Value::<GreeterState, Ack>::at()
                .state(state)
                .response(Ack { count })
                .reply())
        })
        .action_no_args("Tags", |_, ctx| {
            Ok(Value::<GreeterState, GreeterState>::at()
                .response(ctx.state().cloned().unwrap_or_default())
                .reply())
        })
        .build()
        .unwrap()
}

pub fn engine(descriptors: Vec<ActorDescriptor>) -> Arc<DispatchEngine> {
    let registry = ActorRegistry::from_descriptors(descriptors).unwrap();
    Arc::new(DispatchEngine::new(
        Arc::new(registry),
        SystemHandle::detached(SYSTEM),
        &CacheConfig::instances(),
    ))
}

pub fn invocation(actor: ActorId, action: &str, payload: TypedAny) -> ActorInvocation {
    ActorInvocation {
        actor,
        action_name: action.to_string(),
        payload,
        current_context: Context::default(),
        caller: None,
    }
}

pub fn with_state(mut invocation: ActorInvocation, state: TypedAny) -> ActorInvocation {
    invocation.current_context.state = Some(state);
    invocation
}

/// Transport that records outbound calls and answers with scripted replies.
pub struct RecordingTransport {
    pub invocations: Mutex<Vec<InvocationRequest>>,
    pub creates: Mutex<Vec<(String, Vec<ActorId>)>>,
    pub registrations: Mutex<Vec<RegistrationRequest>>,
    reply: Mutex<InvocationResponse>,
    create_status: Mutex<RequestStatus>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            invocations: Mutex::new(Vec::new()),
            creates: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            reply: Mutex::new(InvocationResponse::ok(SYSTEM, ActorId::new(SYSTEM, "any"), None)),
            create_status: Mutex::new(RequestStatus::ok()),
        })
    }

    pub fn reply_with(&self, status: RequestStatus, value: Option<TypedAny>) {
        *self.reply.lock().unwrap() = InvocationResponse {
            status,
            system: SYSTEM.to_string(),
            actor: None,
            value,
        };
    }

    pub fn fail_creates(&self, message: &str) {
        *self.create_status.lock().unwrap() = RequestStatus::error(message);
    }

    pub fn last_invocation(&self) -> InvocationRequest {
        self.invocations.lock().unwrap().last().cloned().unwrap()
    }

    pub fn create_calls(&self) -> usize {
        self.creates.lock().unwrap().len()
    }
}

#[async_trait]
impl FabricTransport for RecordingTransport {
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResponse, SpawnError> {
        self.registrations.lock().unwrap().push(request);
        Ok(RegistrationResponse {
            status: RequestStatus::ok(),
            proxy_info: None,
        })
    }

    async fn create(&self, system: &str, actors: Vec<ActorId>) -> Result<SpawnResponse, SpawnError> {
        self.creates.lock().unwrap().push((system.to_string(), actors));
        Ok(SpawnResponse {
            status: self.create_status.lock().unwrap().clone(),
        })
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse, SpawnError> {
        self.invocations.lock().unwrap().push(request);
        Ok(self.reply.lock().unwrap().clone())
    }
}
