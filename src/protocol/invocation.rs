/// Actor context as seen by the fabric: the last persisted state, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub state: Option<TypedAny>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Inbound request: the fabric asks this process to run one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInvocation {
    pub actor: ActorId,
    pub action_name: String,
    pub payload: TypedAny,
    #[serde(default)]
    pub current_context: Context,
    #[serde(default)]
    pub caller: Option<ActorId>,
}

/// Reply to an [`ActorInvocation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInvocationResponse {
    pub actor_name: String,
    pub actor_system: String,
    pub value: TypedAny,
    #[serde(default)]
    pub updated_context: Context,
    #[serde(default)]
    pub checkpoint: bool,
    #[serde(default)]
    pub workflow: Workflow,
    /// `Ok` for a handled invocation; anything else describes a dispatch failure.
    #[serde(default)]
    pub status: RequestStatus,
}

/// Outbound request: this process asks the fabric to run an action elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub system: String,
    pub actor: ActorId,
    pub action_name: String,
    pub value: TypedAny,
    #[serde(rename = "async", default)]
    pub async_mode: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Absolute delivery time in Unix epoch milliseconds.
    #[serde(default)]
    pub scheduled_to: Option<i64>,
    #[serde(default)]
    pub caller: Option<ActorId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub status: RequestStatus,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub actor: Option<ActorId>,
    #[serde(default)]
    pub value: Option<TypedAny>,
}

impl InvocationResponse {
    pub fn ok(system: impl Into<String>, actor: ActorId, value: Option<TypedAny>) -> Self {
        Self {
            status: RequestStatus::ok(),
            system: system.into(),
            actor: Some(actor),
            value,
        }
    }

    pub fn failed(status: RequestStatus, system: impl Into<String>) -> Self {
        Self {
            status,
            system: system.into(),
            actor: None,
            value: None,
        }
    }
}
