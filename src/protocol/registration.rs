#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    #[default]
    Named,
    Unnamed,
    Pooled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service_name: String,
    pub service_version: String,
    pub service_runtime: String,
    pub protocol_major_version: u32,
    pub protocol_minor_version: u32,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service_name: "rust-std-sdk".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            service_runtime: "rust".to_string(),
            protocol_major_version: PROTOCOL_MAJOR_VERSION,
            protocol_minor_version: PROTOCOL_MINOR_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedTimerAction {
    pub action: ActionDefinition,
    pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSettings {
    pub kind: ActorKind,
    pub stateful: bool,
    /// Only present for stateful actors.
    #[serde(default)]
    pub snapshot_timeout_ms: Option<u64>,
    pub deactivation_timeout_ms: u64,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorMetadata {
    #[serde(default)]
    pub channel_group: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDefinition {
    pub id: ActorId,
    pub settings: ActorSettings,
    pub metadata: ActorMetadata,
    pub actions: Vec<ActionDefinition>,
    pub timer_actions: Vec<FixedTimerAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSystemSpec {
    pub name: String,
    pub actors: BTreeMap<String, ActorDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub service_info: ServiceInfo,
    pub actor_system: ActorSystemSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyInfo {
    pub protocol_major_version: u32,
    pub protocol_minor_version: u32,
    pub proxy_name: String,
    pub proxy_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub status: RequestStatus,
    #[serde(default)]
    pub proxy_info: Option<ProxyInfo>,
}

/// Asks the fabric to create dynamically spawned actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub actors: Vec<ActorId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnResponse {
    pub status: RequestStatus,
}
