//! The ledger seam: the two read operations the room consumer needs, the
//! one write operation the producer needs, and the Solana implementation.
//!
//! The reader trait keeps the scanner independent of the RPC client, so a
//! scan can be driven by a stub in tests.

use std::str::FromStr;

use async_trait::async_trait;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::RpcTransactionConfig,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction, UiTransactionEncoding,
};

use crate::error::ClientError;
use crate::note::{build_note_instructions, room_address};

// ============================================================================
// Normalized transaction view
// ============================================================================

/// One entry from the room address's signature history.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    pub signature: String,
    /// Unix seconds; the ledger may omit it.
    pub block_time: Option<i64>,
    /// True when the transaction errored on-ledger.
    pub failed: bool,
}

/// Instruction payload as the RPC client surfaced it.
#[derive(Debug, Clone)]
pub enum InstructionPayload {
    /// Already-parsed text (the memo parser's output).
    Text(String),
    /// Undecoded instruction data, base64.
    Base64(String),
}

#[derive(Debug, Clone)]
pub struct InstructionView {
    pub program_id: String,
    pub payload: InstructionPayload,
}

/// A fetched transaction reduced to what the note consumer needs.
#[derive(Debug, Clone)]
pub struct TransactionView {
    /// Fee payer; by room convention, the emitting agent.
    pub fee_payer: Option<String>,
    pub failed: bool,
    pub instructions: Vec<InstructionView>,
}

// ============================================================================
// Reader seam
// ============================================================================

#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Most recent transaction signatures touching the room address,
    /// newest first.
    async fn recent_signatures(&self, limit: usize)
        -> Result<Vec<SignatureRecord>, ClientError>;

    /// Fetch one transaction by signature.
    async fn fetch_transaction(&self, signature: &str)
        -> Result<TransactionView, ClientError>;
}

// ============================================================================
// Solana implementation
// ============================================================================

pub struct SolanaLedger {
    rpc: RpcClient,
    room: Pubkey,
}

impl SolanaLedger {
    /// Client for the canonical room address.
    pub fn new(rpc_url: &str) -> Self {
        Self::with_room(rpc_url, room_address())
    }

    pub fn with_room(rpc_url: &str, room: Pubkey) -> Self {
        Self {
            rpc: RpcClient::new(rpc_url.to_owned()),
            room,
        }
    }

    pub fn room(&self) -> &Pubkey {
        &self.room
    }

    /// Submit one protocol message inside a note carrier transaction.
    /// The only write operation the room needs.
    pub async fn submit_note(
        &self,
        keypair: &Keypair,
        bytes: &[u8],
    ) -> Result<Signature, ClientError> {
        let instructions = build_note_instructions(&keypair.pubkey(), &self.room, bytes);
        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| ClientError::Rpc(e.to_string()))?;
        let tx = Transaction::new_signed_with_payer(
            &instructions,
            Some(&keypair.pubkey()),
            &[keypair],
            blockhash,
        );
        let sig = self
            .rpc
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| ClientError::Rpc(e.to_string()))?;

        tracing::info!(
            tx = %sig,
            payload_len = bytes.len(),
            "Note submitted to the room",
        );
        Ok(sig)
    }
}

#[async_trait]
impl LedgerReader for SolanaLedger {
    async fn recent_signatures(
        &self,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, ClientError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };
        let records = self
            .rpc
            .get_signatures_for_address_with_config(&self.room, config)
            .await
            .map_err(|e| ClientError::Rpc(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|r| SignatureRecord {
                signature: r.signature,
                block_time: r.block_time,
                failed: r.err.is_some(),
            })
            .collect())
    }

    async fn fetch_transaction(
        &self,
        signature: &str,
    ) -> Result<TransactionView, ClientError> {
        let sig = Signature::from_str(signature)
            .map_err(|_| ClientError::InvalidSignature(signature.to_string()))?;
        let tx = self
            .rpc
            .get_transaction_with_config(
                &sig,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::JsonParsed),
                    commitment: Some(CommitmentConfig::confirmed()),
                    max_supported_transaction_version: Some(0),
                },
            )
            .await
            .map_err(|e| ClientError::Rpc(e.to_string()))?;
        Ok(transaction_view(tx))
    }
}

/// Reduce a json-parsed RPC transaction to a [`TransactionView`].
fn transaction_view(tx: EncodedConfirmedTransactionWithStatusMeta) -> TransactionView {
    // No meta means success cannot be confirmed; treat as failed.
    let failed = match &tx.transaction.meta {
        Some(meta) => meta.err.is_some(),
        None => true,
    };

    let (fee_payer, instructions) = match tx.transaction.transaction {
        EncodedTransaction::Json(ui) => match ui.message {
            UiMessage::Parsed(msg) => {
                let fee_payer = msg.account_keys.first().map(|k| k.pubkey.clone());
                let instructions = msg
                    .instructions
                    .into_iter()
                    .filter_map(instruction_view)
                    .collect();
                (fee_payer, instructions)
            }
            UiMessage::Raw(_) => (None, Vec::new()),
        },
        _ => (None, Vec::new()),
    };

    TransactionView {
        fee_payer,
        failed,
        instructions,
    }
}

fn instruction_view(ix: UiInstruction) -> Option<InstructionView> {
    match ix {
        UiInstruction::Parsed(UiParsedInstruction::Parsed(p)) => {
            // The memo parser yields a bare string; other programs parse to
            // JSON objects the note consumer has no use for.
            let text = p.parsed.as_str()?.to_string();
            Some(InstructionView {
                program_id: p.program_id,
                payload: InstructionPayload::Text(text),
            })
        }
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(p)) => {
            Some(InstructionView {
                program_id: p.program_id,
                payload: InstructionPayload::Base64(p.data),
            })
        }
        UiInstruction::Compiled(_) => None,
    }
}
