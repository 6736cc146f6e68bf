/// Follow-on work the fabric performs after an action returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub broadcast: Option<BroadcastDirective>,
    #[serde(default)]
    pub forward: Option<ForwardDirective>,
    #[serde(default)]
    pub pipe: Option<PipeDirective>,
    #[serde(default)]
    pub effects: Vec<SideEffectDirective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadcastPayload {
    Value(TypedAny),
    Noop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastDirective {
    pub channel_group: String,
    #[serde(default)]
    pub action_name: Option<String>,
    pub payload: BroadcastPayload,
}

/// Hand the original request payload to another actor; its reply becomes ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardDirective {
    pub actor: String,
    pub action_name: String,
}

/// Hand our response value to another actor; its reply becomes ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeDirective {
    pub actor: String,
    pub action_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffectDirective {
    pub request: InvocationRequest,
}
