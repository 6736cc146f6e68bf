pub mod any;
pub mod error;

pub use any::{Empty, Message, Noop, Stateless, TypedAny};
pub use error::{ErrorKind, Result, SpawnError};
