use super::actor_ref::ActorRef;
use super::identity::ActorIdentity;
use super::transport::FabricTransport;
use crate::cache::ExpiringCache;
use crate::config::CacheConfig;
use crate::core::{Result, SpawnError};
use crate::protocol::ActorId;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Level, event};

type IdentityKey = (String, String, Option<String>);

struct ResolverInner {
    transport: Arc<dyn FabricTransport>,
    refs: ExpiringCache<IdentityKey, ActorRef>,
    async_permits: Arc<Semaphore>,
}

/// Hands out [`ActorRef`]s, creating spawned actors on the fabric the first
/// time they are resolved. Resolved references are memoized per identity.
#[derive(Clone)]
pub struct ActorRefResolver {
    inner: Arc<ResolverInner>,
}

impl ActorRefResolver {
    pub fn new(
        transport: Arc<dyn FabricTransport>,
        cache: &CacheConfig,
        async_pool_size: usize,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                transport,
                refs: ExpiringCache::new(cache),
                async_permits: Arc::new(Semaphore::new(async_pool_size.max(1))),
            }),
        }
    }

    pub fn transport(&self) -> &Arc<dyn FabricTransport> {
        &self.inner.transport
    }

    /// Reference without creation or memoization.
    pub fn reference(&self, identity: ActorIdentity) -> ActorRef {
        ActorRef::new(
            identity,
            Arc::clone(&self.inner.transport),
            Arc::clone(&self.inner.async_permits),
        )
    }

    pub async fn resolve(&self, identity: ActorIdentity) -> Result<ActorRef> {
        let key = identity.cache_key();
        self.inner
            .refs
            .get_or_try_init(key, || async move {
                if identity.needs_creation() {
                    self.create(&identity.system, vec![identity.actor_id()])
                        .await?;
                }
                Ok(self.reference(identity))
            })
            .await
    }

    /// Resolves many identities with one create call per actor system for
    /// every spawned actor not already resolved.
    pub async fn resolve_all(&self, identities: Vec<ActorIdentity>) -> Result<Vec<ActorRef>> {
        let mut pending: BTreeMap<String, Vec<ActorId>> = BTreeMap::new();
        let mut seen = HashSet::new();
        for identity in &identities {
            if !identity.needs_creation() || !seen.insert(identity.cache_key()) {
                continue;
            }
            if self.inner.refs.get(&identity.cache_key())?.is_none() {
                pending
                    .entry(identity.system.clone())
                    .or_default()
                    .push(identity.actor_id());
            }
        }
        for (system, actors) in pending {
            self.create(&system, actors).await?;
        }

        let mut refs = Vec::with_capacity(identities.len());
        for identity in identities {
            let key = identity.cache_key();
            let actor_ref = self
                .inner
                .refs
                .get_or_try_init(key, || async move { Ok(self.reference(identity)) })
                .await?;
            refs.push(actor_ref);
        }
        Ok(refs)
    }

    async fn create(&self, system: &str, actors: Vec<ActorId>) -> Result<()> {
        let count = actors.len();
        let response = self
            .inner
            .transport
            .create(system, actors)
            .await
            .map_err(|err| match err {
                SpawnError::Creation(_) => err,
                other => SpawnError::Creation(other.to_string()),
            })?;
        if !response.status.is_ok() {
            return Err(SpawnError::Creation(format!(
                "fabric refused to create actors in '{}': {}",
                system, response.status.message
            )));
        }
        event!(Level::DEBUG, system = %system, count, "spawned actors created");
        Ok(())
    }
}

impl fmt::Debug for ActorRefResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRefResolver").finish_non_exhaustive()
    }
}
