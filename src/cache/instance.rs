use super::expiring::ExpiringCache;
use crate::actors::{ActorDescriptor, HandlerInstance};
use crate::config::CacheConfig;
use crate::core::Result;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// `(system, actor)` pair identifying one live handler object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorInstanceKey {
    pub system: String,
    pub actor: String,
}

impl ActorInstanceKey {
    pub fn new(system: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            actor: actor.into(),
        }
    }
}

impl fmt::Display for ActorInstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.system, self.actor)
    }
}

/// A cached handler object and the descriptor it was built from.
///
/// The handler sits behind an async mutex: one invocation at a time runs
/// against a given instance.
#[derive(Clone)]
pub struct ActorInstance {
    descriptor: Arc<ActorDescriptor>,
    handler: Arc<Mutex<HandlerInstance>>,
}

impl ActorInstance {
    pub fn descriptor(&self) -> &Arc<ActorDescriptor> {
        &self.descriptor
    }

    pub fn handler(&self) -> &Arc<Mutex<HandlerInstance>> {
        &self.handler
    }

    pub fn same_instance(&self, other: &ActorInstance) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl fmt::Debug for ActorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorInstance")
            .field("actor", &self.descriptor.name())
            .finish()
    }
}

/// Server-side cache of live handler objects.
pub struct InstanceCache {
    entries: ExpiringCache<ActorInstanceKey, ActorInstance>,
}

impl InstanceCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: ExpiringCache::new(config),
        }
    }

    /// Returns the resident instance for `key` or builds one with `factory`.
    /// Concurrent first touches build exactly one instance.
    pub async fn get_or_create<F>(
        &self,
        key: ActorInstanceKey,
        descriptor: &Arc<ActorDescriptor>,
        factory: F,
    ) -> Result<ActorInstance>
    where
        F: FnOnce() -> Result<HandlerInstance>,
    {
        let descriptor = Arc::clone(descriptor);
        self.entries
            .get_or_try_init(key, || async move {
                let handler = factory()?;
                Ok(ActorInstance {
                    descriptor,
                    handler: Arc::new(Mutex::new(handler)),
                })
            })
            .await
    }

    pub fn get(&self, key: &ActorInstanceKey) -> Result<Option<ActorInstance>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> Result<usize> {
        self.entries.len()
    }
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new(&CacheConfig::instances())
    }
}
