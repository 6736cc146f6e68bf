use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Actor '{0}' not found")]
    ActorNotFound(String),

    #[error("Action '{action}' not found on actor '{actor}'")]
    ActionNotFound { actor: String, action: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invocation error: {0}")]
    Invocation(String),

    #[error("Actor creation error: {0}")]
    Creation(String),

    #[error("Actor registration error: {0}")]
    Registration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

/// Flat tag for [`SpawnError`], handy for matching without binding payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Decoding,
    ActorNotFound,
    ActionNotFound,
    Deserialization,
    Invocation,
    Creation,
    Registration,
    Transport,
    Config,
    Lock,
}

impl SpawnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decoding(_) => ErrorKind::Decoding,
            Self::ActorNotFound(_) => ErrorKind::ActorNotFound,
            Self::ActionNotFound { .. } => ErrorKind::ActionNotFound,
            Self::Deserialization(_) => ErrorKind::Deserialization,
            Self::Invocation(_) => ErrorKind::Invocation,
            Self::Creation(_) => ErrorKind::Creation,
            Self::Registration(_) => ErrorKind::Registration,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Config(_) => ErrorKind::Config,
            Self::Lock(_) => ErrorKind::Lock,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpawnError>;

impl<T> From<std::sync::PoisonError<T>> for SpawnError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for SpawnError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for SpawnError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Invocation(format!("encode: {}", err))
    }
}

impl From<reqwest::Error> for SpawnError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = SpawnError::ActionNotFound {
            actor: "Greeter".to_string(),
            action: "Wave".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ActionNotFound);
        assert_eq!(err.to_string(), "Action 'Wave' not found on actor 'Greeter'");
    }

    #[test]
    fn poisoned_lock_maps_to_lock_error() {
        let mutex = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = mutex.lock().unwrap();
            panic!("poison");
        });
        let err: SpawnError = mutex.lock().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Lock);
    }
}
