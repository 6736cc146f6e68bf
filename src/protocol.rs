//! Wire envelopes exchanged with the fabric.
//!
//! Every envelope is a plain serde struct encoded as named-field MessagePack.
//! User payloads never appear here directly; they travel as [`TypedAny`].

use crate::core::{Result, SpawnError, TypedAny};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Content type for every request and reply body.
pub const SPAWN_MEDIA_TYPE: &str = "application/octet-stream";
pub const PROTOCOL_MAJOR_VERSION: u32 = 1;
pub const PROTOCOL_MINOR_VERSION: u32 = 1;
/// Metadata key carrying the caller's timeout hint in milliseconds.
pub const REQUEST_TIMEOUT_METADATA: &str = "request-timeout";

// Envelope definitions are split by direction to keep each file focused.
include!("protocol/identity_and_status.rs");
include!("protocol/invocation.rs");
include!("protocol/workflow.rs");
include!("protocol/registration.rs");

/// Encodes an envelope for the wire.
pub fn encode<T: Serialize>(envelope: &T) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(envelope)?)
}

/// Decodes an envelope read from the wire.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|err| SpawnError::Decoding(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_envelope_is_a_decoding_error() {
        let invocation = ActorInvocation {
            actor: ActorId::new("sys", "Greeter"),
            action_name: "SetTag".to_string(),
            payload: TypedAny::empty(),
            current_context: Context::default(),
            caller: None,
        };
        let bytes = encode(&invocation).unwrap();
        let err = decode::<ActorInvocation>(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, SpawnError::Decoding(_)));
    }

    #[test]
    fn missing_optional_fields_decode_to_defaults() {
        let invocation = ActorInvocation {
            actor: ActorId::with_parent("sys", "worker-1", "Worker"),
            action_name: "Run".to_string(),
            payload: TypedAny::empty(),
            current_context: Context::default(),
            caller: None,
        };
        let decoded: ActorInvocation = decode(&encode(&invocation).unwrap()).unwrap();
        assert_eq!(decoded.actor.parent.as_deref(), Some("Worker"));
        assert!(decoded.current_context.state.is_none());
        assert!(decoded.caller.is_none());
    }

    #[test]
    fn status_helpers_set_codes() {
        assert!(RequestStatus::ok().is_ok());
        assert_eq!(
            RequestStatus::actor_not_found("gone").status,
            StatusCode::ActorNotFound
        );
        assert_eq!(RequestStatus::error("boom").message, "boom");
    }

    #[test]
    fn unrecognized_status_code_decodes_as_unknown() {
        #[derive(Serialize)]
        struct ForeignStatus {
            status: &'static str,
            message: &'static str,
        }

        let bytes = encode(&ForeignStatus {
            status: "Timeout",
            message: "fabric timed out",
        })
        .unwrap();
        let status: RequestStatus = decode(&bytes).unwrap();
        assert_eq!(status.status, StatusCode::Unknown);
        assert_eq!(status.message, "fabric timed out");
    }
}
