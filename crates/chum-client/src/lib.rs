pub mod error;
pub mod note;
pub mod rpc;

pub use error::ClientError;
pub use rpc::{
    InstructionPayload, InstructionView, LedgerReader, SignatureRecord, SolanaLedger,
    TransactionView,
};
