use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("invalid transaction signature '{0}'")]
    InvalidSignature(String),
}
