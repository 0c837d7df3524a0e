use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown alpha subtype: {0}")]
    UnknownAlphaKind(String),

    #[error("unknown direction: {0} (expected buy or sell)")]
    UnknownDirection(String),

    #[error("unknown exit reason: {0}")]
    UnknownExitReason(String),

    #[error("unknown outcome: {0} (expected win or loss)")]
    UnknownOutcome(String),

    #[error("invalid mint address '{addr}': {reason}")]
    InvalidMint { addr: String, reason: String },
}
