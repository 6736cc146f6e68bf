use super::context::InvocationContext;
use super::value::ActionResult;
use crate::core::{Message, Result, SpawnError, TypedAny};
use crate::protocol::{
    ActionDefinition, ActorDefinition, ActorId, ActorKind, ActorMetadata, ActorSettings,
    FixedTimerAction,
};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A live handler object. Its concrete type is only known to the closures
/// registered alongside it.
pub type HandlerInstance = Box<dyn Any + Send>;

/// Builds a fresh handler object for one actor key.
pub type InstanceFactory = Arc<dyn Fn() -> Result<HandlerInstance> + Send + Sync>;

/// Type alias for an action that only receives its invocation context.
pub type NoArgsAction =
    Arc<dyn Fn(&mut HandlerInstance, InvocationContext) -> Result<ActionResult> + Send + Sync>;

/// Type alias for an action that receives the context and one typed payload.
pub type PayloadAction = Arc<
    dyn Fn(&mut HandlerInstance, InvocationContext, &TypedAny) -> Result<ActionResult>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub enum ActionHandler {
    NoArgs(NoArgsAction),
    WithPayload(PayloadAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Normal,
    Timer { period_seconds: u32 },
}

/// One entry of an actor's function table.
#[derive(Clone)]
pub struct ActionSpec {
    name: String,
    input_type: Option<&'static str>,
    output_type: &'static str,
    dispatch: DispatchKind,
    handler: ActionHandler,
}

impl ActionSpec {
    pub(crate) fn new(
        name: String,
        input_type: Option<&'static str>,
        output_type: &'static str,
        dispatch: DispatchKind,
        handler: ActionHandler,
    ) -> Self {
        Self {
            name,
            input_type,
            output_type,
            dispatch,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 0 for context-only actions, 1 for context plus payload.
    pub fn arity(&self) -> u8 {
        match self.handler {
            ActionHandler::NoArgs(_) => 0,
            ActionHandler::WithPayload(_) => 1,
        }
    }

    pub fn input_type(&self) -> Option<&'static str> {
        self.input_type
    }

    pub fn output_type(&self) -> &'static str {
        self.output_type
    }

    pub fn dispatch_kind(&self) -> DispatchKind {
        self.dispatch
    }

    pub fn handler(&self) -> &ActionHandler {
        &self.handler
    }
}

impl fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

/// Declared state type of a stateful actor, with its type-erased decoder.
#[derive(Clone, Copy)]
pub struct StateType {
    name: &'static str,
    decode: fn(&TypedAny) -> Result<Box<dyn Any + Send>>,
}

impl StateType {
    pub fn of<S: Message>() -> Self {
        fn decode<S: Message>(any: &TypedAny) -> Result<Box<dyn Any + Send>> {
            Ok(Box::new(any.unpack::<S>()?))
        }
        Self {
            name: S::TYPE_NAME,
            decode: decode::<S>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode(&self, any: &TypedAny) -> Result<Box<dyn Any + Send>> {
        (self.decode)(any)
    }
}

impl fmt::Debug for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Immutable definition of one actor type.
pub struct ActorDescriptor {
    pub(crate) name: String,
    pub(crate) kind: ActorKind,
    pub(crate) stateful: bool,
    pub(crate) state_type: Option<StateType>,
    pub(crate) actions: HashMap<String, ActionSpec>,
    pub(crate) timer_actions: HashMap<String, ActionSpec>,
    pub(crate) channel: Option<String>,
    pub(crate) deactivation_timeout_ms: u64,
    pub(crate) snapshot_timeout_ms: u64,
    pub(crate) min_pool_size: u32,
    pub(crate) max_pool_size: u32,
    pub(crate) factory: InstanceFactory,
}

impl ActorDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    pub fn state_type(&self) -> Option<StateType> {
        self.state_type
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn deactivation_timeout_ms(&self) -> u64 {
        self.deactivation_timeout_ms
    }

    pub fn snapshot_timeout_ms(&self) -> u64 {
        self.snapshot_timeout_ms
    }

    pub fn actions(&self) -> &HashMap<String, ActionSpec> {
        &self.actions
    }

    pub fn timer_actions(&self) -> &HashMap<String, ActionSpec> {
        &self.timer_actions
    }

    /// Looks the action up among regular actions first, then timer actions.
    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions
            .get(name)
            .or_else(|| self.timer_actions.get(name))
    }

    pub fn new_instance(&self) -> Result<HandlerInstance> {
        (self.factory)()
    }

    /// Decodes persisted state as the declared state type. Stateless actors
    /// ignore any state the fabric sends.
    pub fn decode_state(&self, state: Option<&TypedAny>) -> Result<Option<Box<dyn Any + Send>>> {
        match (self.state_type, state) {
            (Some(state_type), Some(any)) => state_type.decode(any).map(Some),
            _ => Ok(None),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SpawnError::Config("actor name must not be empty".to_string()));
        }
        if self.stateful != self.state_type.is_some() {
            return Err(SpawnError::Config(format!(
                "actor '{}': a state type is required exactly when the actor is stateful",
                self.name
            )));
        }
        if let Some(duplicate) = self
            .actions
            .keys()
            .find(|name| self.timer_actions.contains_key(*name))
        {
            return Err(SpawnError::Config(format!(
                "actor '{}': action '{}' is registered twice",
                self.name, duplicate
            )));
        }
        for spec in self.actions.values().chain(self.timer_actions.values()) {
            if spec.arity() == 1 && spec.input_type.is_none() {
                return Err(SpawnError::Config(format!(
                    "actor '{}': action '{}' takes a payload but declares no input type",
                    self.name, spec.name
                )));
            }
            if let DispatchKind::Timer { period_seconds: 0 } = spec.dispatch {
                return Err(SpawnError::Config(format!(
                    "actor '{}': timer action '{}' needs a period of at least one second",
                    self.name, spec.name
                )));
            }
        }
        if self.kind == ActorKind::Pooled
            && self.max_pool_size > 0
            && self.min_pool_size > self.max_pool_size
        {
            return Err(SpawnError::Config(format!(
                "actor '{}': min pool size {} exceeds max pool size {}",
                self.name, self.min_pool_size, self.max_pool_size
            )));
        }
        Ok(())
    }

    /// Registration form of this descriptor.
    pub fn to_definition(&self, system: &str) -> ActorDefinition {
        let mut actions: Vec<ActionDefinition> = self
            .actions
            .keys()
            .map(|name| ActionDefinition { name: name.clone() })
            .collect();
        actions.sort_by(|a, b| a.name.cmp(&b.name));

        let mut timer_actions: Vec<FixedTimerAction> = self
            .timer_actions
            .values()
            .filter_map(|spec| match spec.dispatch {
                DispatchKind::Timer { period_seconds } => Some(FixedTimerAction {
                    action: ActionDefinition {
                        name: spec.name.clone(),
                    },
                    seconds: period_seconds,
                }),
                DispatchKind::Normal => None,
            })
            .collect();
        timer_actions.sort_by(|a, b| a.action.name.cmp(&b.action.name));

        ActorDefinition {
            id: ActorId::new(system, self.name.clone()),
            settings: ActorSettings {
                kind: self.kind,
                stateful: self.stateful,
                snapshot_timeout_ms: self.stateful.then_some(self.snapshot_timeout_ms),
                deactivation_timeout_ms: self.deactivation_timeout_ms,
                min_pool_size: self.min_pool_size,
                max_pool_size: self.max_pool_size,
            },
            metadata: ActorMetadata {
                channel_group: self.channel.clone(),
                tags: Default::default(),
            },
            actions,
            timer_actions,
        }
    }
}

impl fmt::Debug for ActorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("stateful", &self.stateful)
            .field("state_type", &self.state_type)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("timer_actions", &self.timer_actions.keys().collect::<Vec<_>>())
            .field("channel", &self.channel)
            .finish()
    }
}
