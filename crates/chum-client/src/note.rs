//! Note carrier mapping: protocol bytes ↔ memo instructions.
//!
//! Producer side: the protocol bytes are hex-encoded to ASCII (the memo
//! field holds text, not arbitrary binary) and paired with a zero-lamport
//! transfer to the room address. The transfer has no value effect; it
//! exists so address-scoped history queries surface the transaction.
//!
//! Consumer side: the RPC client surfaces memo payloads in more than one
//! shape depending on how the transaction was parsed. Normalization is an
//! ordered list of strategies tried in sequence; the first producing bytes
//! wins, and a payload failing all of them is skipped, never fatal.

use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction,
};

use chum_protocol::constants::{CHUM_ROOM, MEMO_PROGRAM};

use crate::rpc::{InstructionPayload, TransactionView};

pub fn memo_program_id() -> Pubkey {
    Pubkey::from_str(MEMO_PROGRAM).expect("valid memo program id")
}

pub fn room_address() -> Pubkey {
    Pubkey::from_str(CHUM_ROOM).expect("valid room address")
}

// ============================================================================
// Producer
// ============================================================================

/// Build the two-instruction carrier for one protocol message:
/// memo (hex-encoded payload, signed by the sender) + zero-lamport
/// reference transfer to the room.
pub fn build_note_instructions(sender: &Pubkey, room: &Pubkey, bytes: &[u8]) -> [Instruction; 2] {
    let hex_payload = hex::encode(bytes);
    let memo_ix = Instruction {
        program_id: memo_program_id(),
        accounts: vec![AccountMeta::new(*sender, true)],
        data: hex_payload.into_bytes(),
    };
    let ref_ix = system_instruction::transfer(sender, room, 0);
    [memo_ix, ref_ix]
}

// ============================================================================
// Consumer normalization
// ============================================================================

type Strategy = fn(&InstructionPayload) -> Option<Vec<u8>>;

/// Tried in order; first hit wins. Extend here if the RPC client ever
/// hands back another representation.
const STRATEGIES: &[Strategy] = &[hex_text, utf8_text, base64_data];

/// Parsed memo text that is itself a hex string, the shape our own
/// producer emits.
fn hex_text(payload: &InstructionPayload) -> Option<Vec<u8>> {
    let InstructionPayload::Text(s) = payload else {
        return None;
    };
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    hex::decode(&compact).ok()
}

/// Parsed memo text that is not hex: take the raw UTF-8 bytes.
fn utf8_text(payload: &InstructionPayload) -> Option<Vec<u8>> {
    match payload {
        InstructionPayload::Text(s) => Some(s.as_bytes().to_vec()),
        _ => None,
    }
}

/// Undecoded instruction data, base64.
fn base64_data(payload: &InstructionPayload) -> Option<Vec<u8>> {
    match payload {
        InstructionPayload::Base64(s) => BASE64.decode(s).ok(),
        _ => None,
    }
}

/// Normalize one instruction payload to bytes, or None when no strategy
/// applies.
pub fn normalize_payload(payload: &InstructionPayload) -> Option<Vec<u8>> {
    STRATEGIES.iter().find_map(|strategy| strategy(payload))
}

/// Candidate note payloads of a transaction: every memo-program
/// instruction that normalizes to bytes, in instruction order.
pub fn note_candidates(tx: &TransactionView) -> Vec<Vec<u8>> {
    tx.instructions
        .iter()
        .filter(|ix| ix.program_id == MEMO_PROGRAM)
        .filter_map(|ix| normalize_payload(&ix.payload))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
