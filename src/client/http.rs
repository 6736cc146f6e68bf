use super::transport::FabricTransport;
use crate::config::TransportConfig;
use crate::core::{Result, SpawnError};
use crate::protocol::{
    self, ActorId, InvocationRequest, InvocationResponse, RegistrationRequest,
    RegistrationResponse, SPAWN_MEDIA_TYPE, SpawnRequest, SpawnResponse,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const ACTOR_SYSTEM_PATH: &str = "/api/v1/system";

/// [`FabricTransport`] speaking MessagePack over HTTP to the fabric proxy.
#[derive(Debug, Clone)]
pub struct HttpFabricClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFabricClient {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        config.validate()?;
        // reqwest 0.11 has no separate read/write timeouts; the call timeout bounds both.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.call_timeout)
            .pool_max_idle_per_host(config.pool_max_idle)
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_nodelay(true)
            .build()?;
        Ok(Self {
            client,
            base_url: config.proxy_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let bytes = protocol::encode(body)?;
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, SPAWN_MEDIA_TYPE)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpawnError::Transport(format!(
                "POST {} returned HTTP {}",
                path, status
            )));
        }
        let body = response.bytes().await?;
        protocol::decode(&body)
    }
}

#[async_trait]
impl FabricTransport for HttpFabricClient {
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationResponse> {
        self.post(ACTOR_SYSTEM_PATH, &request)
            .await
            .map_err(|err| SpawnError::Registration(err.to_string()))
    }

    async fn create(&self, system: &str, actors: Vec<ActorId>) -> Result<SpawnResponse> {
        let path = format!("{}/{}/actors/spawn", ACTOR_SYSTEM_PATH, system);
        self.post(&path, &SpawnRequest { actors })
            .await
            .map_err(|err| SpawnError::Creation(err.to_string()))
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse> {
        let path = format!(
            "{}/{}/actors/{}/invoke",
            ACTOR_SYSTEM_PATH, request.system, request.actor.name
        );
        self.post(&path, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_points_at_proxy() {
        let client = HttpFabricClient::new(&TransportConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9001");
    }

    #[tokio::test]
    async fn unreachable_proxy_is_a_transport_error() {
        let config = TransportConfig {
            proxy_port: 1,
            connect_timeout: std::time::Duration::from_millis(200),
            ..TransportConfig::default()
        };
        let client = HttpFabricClient::new(&config).unwrap();
        let request = InvocationRequest {
            system: "sys".to_string(),
            actor: ActorId::new("sys", "Nobody"),
            action_name: "Ping".to_string(),
            value: crate::core::TypedAny::empty(),
            async_mode: false,
            metadata: Default::default(),
            scheduled_to: None,
            caller: None,
        };
        let err = client.invoke(request).await.unwrap_err();
        assert!(matches!(err, SpawnError::Transport(_)));
    }
}
