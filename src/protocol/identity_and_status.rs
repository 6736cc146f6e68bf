/// Fabric-level address of one actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    pub name: String,
    pub system: String,
    /// Set for actors spawned from a registered ("unnamed") parent definition.
    #[serde(default)]
    pub parent: Option<String>,
}

impl ActorId {
    pub fn new(system: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: system.into(),
            parent: None,
        }
    }

    pub fn with_parent(
        system: impl Into<String>,
        name: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            system: system.into(),
            parent: Some(parent.into()),
        }
    }
}

/// Canonical status code carried by every reply. Codes this crate does not
/// know decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    ActorNotFound,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub status: StatusCode,
    #[serde(default)]
    pub message: String,
}

impl RequestStatus {
    pub fn ok() -> Self {
        Self {
            status: StatusCode::Ok,
            message: String::new(),
        }
    }

    pub fn actor_not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::ActorNotFound,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::Ok
    }
}
