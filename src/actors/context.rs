use crate::client::{ActorIdentity, ActorRef, ActorRefResolver};
use crate::core::{Message, Result, SpawnError};
use crate::protocol::ActorId;
use std::any::Any;
use std::fmt;

/// Handle to the actor system an invocation runs in.
///
/// Handlers use it to address other actors, usually to build workflow
/// directives. A detached handle has no fabric connection and refuses to
/// hand out references.
#[derive(Clone)]
pub struct SystemHandle {
    name: String,
    resolver: Option<ActorRefResolver>,
}

impl SystemHandle {
    pub fn new(name: impl Into<String>, resolver: ActorRefResolver) -> Self {
        Self {
            name: name.into(),
            resolver: Some(resolver),
        }
    }

    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolver: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolver(&self) -> Option<&ActorRefResolver> {
        self.resolver.as_ref()
    }

    /// Reference to a named actor of this system. No remote call is made.
    pub fn named(&self, actor: impl Into<String>) -> Result<ActorRef> {
        let resolver = self.attached_resolver()?;
        Ok(resolver.reference(ActorIdentity::named(self.name.clone(), actor)))
    }

    /// Resolves any identity, creating spawned actors on the fabric when needed.
    pub async fn actor_ref(&self, identity: ActorIdentity) -> Result<ActorRef> {
        self.attached_resolver()?.resolve(identity).await
    }

    fn attached_resolver(&self) -> Result<&ActorRefResolver> {
        self.resolver.as_ref().ok_or_else(|| {
            SpawnError::Config(format!(
                "actor system '{}' has no fabric transport attached",
                self.name
            ))
        })
    }
}

impl fmt::Debug for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemHandle")
            .field("name", &self.name)
            .field("attached", &self.resolver.is_some())
            .finish()
    }
}

/// Type-erased context built by the dispatch engine for one invocation.
pub struct InvocationContext {
    pub(crate) actor: ActorId,
    pub(crate) caller: Option<ActorId>,
    pub(crate) prior_state: Option<Box<dyn Any + Send>>,
    pub(crate) system: SystemHandle,
}

impl InvocationContext {
    pub fn new(actor: ActorId, prior_state: Option<Box<dyn Any + Send>>, system: SystemHandle) -> Self {
        Self {
            actor,
            caller: None,
            prior_state,
            system,
        }
    }

    pub fn with_caller(mut self, caller: Option<ActorId>) -> Self {
        self.caller = caller;
        self
    }

    pub fn has_state(&self) -> bool {
        self.prior_state.is_some()
    }
}

/// What a handler sees of the invocation: its identity, the last persisted
/// state and the surrounding actor system.
pub struct ActorContext<S> {
    actor: ActorId,
    caller: Option<ActorId>,
    state: Option<S>,
    system: SystemHandle,
}

impl<S: Message> ActorContext<S> {
    pub(crate) fn from_invocation(ctx: InvocationContext) -> Result<Self> {
        let state = match ctx.prior_state {
            Some(boxed) => Some(*boxed.downcast::<S>().map_err(|_| {
                SpawnError::Deserialization(format!(
                    "state of actor '{}' is not a '{}'",
                    ctx.actor.name,
                    S::TYPE_NAME
                ))
            })?),
            None => None,
        };
        Ok(Self {
            actor: ctx.actor,
            caller: ctx.caller,
            state,
            system: ctx.system,
        })
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn actor_id(&self) -> &ActorId {
        &self.actor
    }

    pub fn caller(&self) -> Option<&ActorId> {
        self.caller.as_ref()
    }

    pub fn system(&self) -> &SystemHandle {
        &self.system
    }
}

impl<S: fmt::Debug> fmt::Debug for ActorContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContext")
            .field("actor", &self.actor)
            .field("state", &self.state)
            .field("system", &self.system)
            .finish()
    }
}
