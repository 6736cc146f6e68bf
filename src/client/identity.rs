use crate::protocol::ActorId;

/// Who an [`ActorRef`](super::ActorRef) points at.
///
/// Parented identities address actors spawned at runtime from a registered
/// parent definition; with `lookup_on_create` set they are created on the
/// fabric before the reference is handed out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorIdentity {
    pub system: String,
    pub name: String,
    pub parent: Option<String>,
    pub lookup_on_create: bool,
}

impl ActorIdentity {
    pub fn named(system: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            name: name.into(),
            parent: None,
            lookup_on_create: false,
        }
    }

    pub fn unnamed(
        system: impl Into<String>,
        name: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            name: name.into(),
            parent: Some(parent.into()),
            lookup_on_create: true,
        }
    }

    pub fn with_lookup_on_create(mut self, lookup_on_create: bool) -> Self {
        self.lookup_on_create = lookup_on_create;
        self
    }

    /// True when resolving this identity must create the actor first.
    pub fn needs_creation(&self) -> bool {
        self.lookup_on_create && self.parent.is_some()
    }

    pub fn actor_id(&self) -> ActorId {
        ActorId {
            name: self.name.clone(),
            system: self.system.clone(),
            parent: self.parent.clone(),
        }
    }

    pub(crate) fn cache_key(&self) -> (String, String, Option<String>) {
        (self.system.clone(), self.name.clone(), self.parent.clone())
    }
}
