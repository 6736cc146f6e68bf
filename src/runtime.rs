use crate::actors::{ActorRegistry, SystemHandle};
use crate::client::{
    ActorIdentity, ActorRef, ActorRefResolver, FabricTransport, HttpFabricClient, LoopbackFabric,
};
use crate::config::SpawnConfig;
use crate::core::{Result, SpawnError};
use crate::dispatch::DispatchEngine;
use crate::protocol::{RegistrationRequest, RegistrationResponse, ServiceInfo};
use crate::server;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::OnceCell;
use tracing::{Instrument, Level, event, info_span};

/// Wires registry, dispatch engine, reference resolver and transport into
/// one process-wide actor host.
pub struct SpawnRuntime {
    config: SpawnConfig,
    registry: Arc<ActorRegistry>,
    transport: Arc<dyn FabricTransport>,
    resolver: ActorRefResolver,
    engine: Arc<DispatchEngine>,
    registration: OnceCell<RegistrationResponse>,
}

impl SpawnRuntime {
    pub fn new(
        config: SpawnConfig,
        registry: ActorRegistry,
        transport: Arc<dyn FabricTransport>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(registry);
        let resolver = ActorRefResolver::new(
            Arc::clone(&transport),
            &config.actor_ref_cache,
            config.transport.async_pool_size,
        );
        let system = SystemHandle::new(config.system.clone(), resolver.clone());
        let engine = Arc::new(DispatchEngine::new(
            Arc::clone(&registry),
            system,
            &config.instance_cache,
        ));
        Ok(Self {
            config,
            registry,
            transport,
            resolver,
            engine,
            registration: OnceCell::new(),
        })
    }

    /// Runtime talking to the fabric proxy over HTTP.
    pub fn with_http(config: SpawnConfig, registry: ActorRegistry) -> Result<Self> {
        let transport = Arc::new(HttpFabricClient::new(&config.transport)?);
        Self::new(config, registry, transport)
    }

    /// Runtime whose fabric is an in-process [`LoopbackFabric`].
    pub fn loopback(config: SpawnConfig, registry: ActorRegistry) -> Result<(Self, Arc<LoopbackFabric>)> {
        let fabric = LoopbackFabric::new();
        let runtime = Self::new(config, registry, fabric.clone())?;
        fabric.attach(&runtime.engine)?;
        Ok((runtime, fabric))
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    pub fn resolver(&self) -> &ActorRefResolver {
        &self.resolver
    }

    pub fn system(&self) -> &SystemHandle {
        self.engine.system()
    }

    pub fn router(&self) -> Router {
        server::router(Arc::clone(&self.engine))
    }

    pub fn registration_request(&self) -> RegistrationRequest {
        RegistrationRequest {
            service_info: ServiceInfo::default(),
            actor_system: self.registry.to_system_spec(&self.config.system),
        }
    }

    /// Registers the actor system with the fabric. Later calls return the
    /// first successful response without contacting the fabric again.
    pub async fn register(&self) -> Result<RegistrationResponse> {
        self.registration
            .get_or_try_init(|| async {
                let request = self.registration_request();
                let actors = request.actor_system.actors.len();
                let response = self
                    .transport
                    .register(request)
                    .await
                    .map_err(|err| match err {
                        SpawnError::Registration(_) => err,
                        other => SpawnError::Registration(other.to_string()),
                    })?;
                if !response.status.is_ok() {
                    return Err(SpawnError::Registration(format!(
                        "fabric rejected actor system '{}': {}",
                        self.config.system, response.status.message
                    )));
                }
                event!(
                    Level::INFO,
                    system = %self.config.system,
                    actors,
                    proxy = ?response.proxy_info.as_ref().map(|p| p.proxy_name.as_str()),
                    "actor system registered"
                );
                Ok(response)
            })
            .await
            .cloned()
    }

    /// Binds the action endpoint, registers with the fabric and serves until
    /// `shutdown` resolves.
    pub async fn start<S>(&self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let span = info_span!("spawn.runtime", system = %self.config.system);
        async move {
            let address = self.config.transport.bind_address();
            let listener = TcpListener::bind(&address)
                .await
                .map_err(|err| SpawnError::Transport(format!("bind {}: {}", address, err)))?;
            event!(Level::INFO, address = %address, "action endpoint listening");

            self.register().await?;
            server::serve(
                listener,
                self.router(),
                shutdown,
                self.config.termination_grace_period,
            )
            .await
        }
        .instrument(span)
        .await
    }

    pub async fn actor_ref(&self, identity: ActorIdentity) -> Result<ActorRef> {
        self.resolver.resolve(identity).await
    }

    pub async fn actor_refs(&self, identities: Vec<ActorIdentity>) -> Result<Vec<ActorRef>> {
        self.resolver.resolve_all(identities).await
    }
}
