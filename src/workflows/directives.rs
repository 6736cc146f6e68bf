use crate::client::ActorRef;
use crate::core::{Message, Result, TypedAny};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Publish a message to every actor subscribed to a channel group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub(crate) channel: String,
    pub(crate) action: Option<String>,
    pub(crate) payload: Option<TypedAny>,
}

impl Broadcast {
    pub fn to<T: Message>(channel: impl Into<String>, action: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self {
            channel: channel.into(),
            action: Some(action.into()),
            payload: Some(TypedAny::pack(payload)?),
        })
    }

    /// Subscribers receive the payload on their default channel action.
    pub fn to_channel<T: Message>(channel: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self {
            channel: channel.into(),
            action: None,
            payload: Some(TypedAny::pack(payload)?),
        })
    }

    pub fn to_no_args(channel: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            action: Some(action.into()),
            payload: None,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    pub(crate) actor: String,
    pub(crate) action: String,
}

impl Forward {
    pub fn to(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
        }
    }

    pub fn to_ref(actor: &ActorRef, action: impl Into<String>) -> Self {
        Self::to(actor.actor_name(), action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipe {
    pub(crate) actor: String,
    pub(crate) action: String,
}

impl Pipe {
    pub fn to(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
        }
    }

    pub fn to_ref(actor: &ActorRef, action: impl Into<String>) -> Self {
        Self::to(actor.actor_name(), action)
    }
}

/// Fire-and-forget invocation the fabric performs once the action has
/// completed, optionally delayed or scheduled for an absolute time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffect {
    pub(crate) system: String,
    pub(crate) actor: String,
    pub(crate) action: String,
    pub(crate) payload: TypedAny,
    pub(crate) delay: Option<Duration>,
    pub(crate) scheduled_to: Option<DateTime<Utc>>,
}

impl SideEffect {
    pub fn to<T: Message>(
        system: impl Into<String>,
        actor: impl Into<String>,
        action: impl Into<String>,
        payload: &T,
    ) -> Result<Self> {
        Ok(Self {
            system: system.into(),
            actor: actor.into(),
            action: action.into(),
            payload: TypedAny::pack(payload)?,
            delay: None,
            scheduled_to: None,
        })
    }

    pub fn to_ref<T: Message>(actor: &ActorRef, action: impl Into<String>, payload: &T) -> Result<Self> {
        Self::to(actor.system(), actor.actor_name(), action, payload)
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Takes precedence over [`delay`](Self::delay) when both are set.
    pub fn scheduled_to(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_to = Some(at);
        self
    }
}
