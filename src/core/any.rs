use super::error::{Result, SpawnError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

// Unit structs encode as a single MessagePack nil.
const MSGPACK_NIL: u8 = 0xc0;

/// A payload type that can travel inside a [`TypedAny`].
///
/// `TYPE_NAME` is written next to the encoded bytes and checked again on
/// unpack, so it must be unique per message type inside one actor system.
/// Usually derived with `#[derive(Message)]`.
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
}

/// Self-describing payload wrapper: a declared type name plus the
/// MessagePack encoding of the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedAny {
    pub type_url: String,
    #[serde(with = "serde_bytes_compat")]
    pub value: Vec<u8>,
}

impl TypedAny {
    /// Encodes `message` and tags it with `T::TYPE_NAME`.
    pub fn pack<T: Message>(message: &T) -> Result<Self> {
        let value = rmp_serde::to_vec_named(message)?;
        Ok(Self {
            type_url: T::TYPE_NAME.to_string(),
            value,
        })
    }

    /// Decodes the payload as `T`, refusing payloads declared as another type.
    pub fn unpack<T: Message>(&self) -> Result<T> {
        if !self.is::<T>() {
            return Err(SpawnError::Deserialization(format!(
                "cannot unpack '{}' as '{}'",
                self.type_url,
                T::TYPE_NAME
            )));
        }
        rmp_serde::from_slice(&self.value).map_err(|err| {
            SpawnError::Deserialization(format!("payload '{}': {}", self.type_url, err))
        })
    }

    pub fn is<T: Message>(&self) -> bool {
        self.type_url == T::TYPE_NAME
    }

    pub fn noop() -> Self {
        Self {
            type_url: Noop::TYPE_NAME.to_string(),
            value: vec![MSGPACK_NIL],
        }
    }

    pub fn empty() -> Self {
        Self {
            type_url: Empty::TYPE_NAME.to_string(),
            value: vec![MSGPACK_NIL],
        }
    }

    /// True for the canonical "nothing here" markers.
    pub fn is_marker(&self) -> bool {
        self.is::<Noop>() || self.is::<Empty>()
    }
}

impl fmt::Debug for TypedAny {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAny")
            .field("type_url", &self.type_url)
            .field("len", &self.value.len())
            .finish()
    }
}

/// Reply marker used when an action produced no response value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noop;

impl Message for Noop {
    const TYPE_NAME: &'static str = "spawn.Noop";
}

/// Argument marker used when an invocation carries no payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty;

impl Message for Empty {
    const TYPE_NAME: &'static str = "spawn.Empty";
}

/// Marker state type for stateless actors; never packed on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stateless;

impl Message for Stateless {
    const TYPE_NAME: &'static str = "spawn.Stateless";
}

// Bytes are written as a MessagePack bin instead of an array of integers.
mod serde_bytes_compat {
    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = Vec<u8>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte buffer")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
                Ok(v.to_vec())
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
                Ok(v)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    out.push(byte);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}
