pub mod agents;
pub mod codec;
pub mod constants;
pub mod error;
pub mod message;
pub mod payload;

pub use error::ProtocolError;
pub use message::{DecodedNote, MsgType, ProtocolMessage};
pub use payload::Payload;
