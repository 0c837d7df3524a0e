//! Wire codec: symmetric conversion between typed messages and memo bytes.
//!
//! Layout (big-endian throughout):
//!
//! ```text
//! [2: magic "CH"] [1: msg type] [2: agent id] [payload...]
//! ```
//!
//! Decoding is deliberately lenient past the header: a payload shorter than
//! the full layout populates whatever fields the available length permits.
//! Fields appended to a message type in the future therefore never break
//! old readers. Only a missing/mismatched magic or a length below the
//! 5-byte header classifies the bytes as "not a protocol message".

use crate::constants::{CHUM_MAGIC, HEADER_LEN};
use crate::error::ProtocolError;
use crate::message::{DecodedNote, MsgType};
use crate::payload::{
    AlphaKind, AlphaPayload, Direction, ExitPayload, ExitReason, Payload, RallyOutcome,
    RallyPayload, ResultPayload, SignalPayload, TradeAction,
};

// ============================================================================
// Decode
// ============================================================================

/// Decode one memo. Returns `None` iff the bytes are not a protocol
/// message (shorter than the header, or wrong magic).
pub fn decode_note(data: &[u8]) -> Option<DecodedNote> {
    if data.len() < HEADER_LEN {
        return None;
    }
    if data[0] != CHUM_MAGIC[0] || data[1] != CHUM_MAGIC[1] {
        return None;
    }

    let msg_type = MsgType::from_u8(data[2]);
    let agent_id = read_u16_be(data, 3)?;
    let payload = &data[HEADER_LEN..];

    let payload = match msg_type {
        MsgType::Alpha => Payload::Alpha(decode_alpha(payload)),
        MsgType::Signal => Payload::Signal(decode_signal(payload)),
        MsgType::Rally => Payload::Rally(decode_rally(payload)),
        MsgType::Exit => Payload::Exit(decode_exit(payload)),
        MsgType::Result => Payload::Result(decode_result(payload)),
        MsgType::Unknown(_) => Payload::Unknown,
    };

    Some(DecodedNote {
        msg_type,
        agent_id,
        payload,
    })
}

fn decode_alpha(p: &[u8]) -> AlphaPayload {
    let mut out = AlphaPayload::default();
    if !p.is_empty() {
        out.subtype = Some(AlphaKind::from_u8(p[0]));
        if p.len() >= 33 {
            out.token_mint = Some(render_mint(&p[1..33]));
        }
        if p.len() >= 41 {
            out.amount = read_u64_be(p, 33);
        }
    }
    out
}

fn decode_signal(p: &[u8]) -> SignalPayload {
    let mut out = SignalPayload::default();
    // Mint and direction travel together: below 33 bytes nothing is usable.
    if p.len() >= 33 {
        out.token_mint = Some(render_mint(&p[..32]));
        out.direction = Some(Direction::from_u8(p[32]));
        if p.len() >= 34 {
            out.confidence = Some(p[33]);
        }
    }
    out
}

fn decode_rally(p: &[u8]) -> RallyPayload {
    let mut out = RallyPayload::default();
    if p.len() >= 2 {
        out.rally_id = read_u16_be(p, 0);
        if p.len() >= 34 {
            out.token_mint = Some(render_mint(&p[2..34]));
        }
        if p.len() >= 35 {
            out.action = Some(TradeAction::from_u8(p[34]));
        }
        if p.len() >= 43 {
            out.entry_price = read_u64_be(p, 35);
        }
        if p.len() >= 51 {
            out.target_price = read_u64_be(p, 43);
        }
    }
    out
}

fn decode_exit(p: &[u8]) -> ExitPayload {
    let mut out = ExitPayload::default();
    if p.len() >= 2 {
        out.rally_id = read_u16_be(p, 0);
        if p.len() >= 3 {
            out.reason = Some(ExitReason::from_u8(p[2]));
        }
    }
    out
}

fn decode_result(p: &[u8]) -> ResultPayload {
    let mut out = ResultPayload::default();
    if p.len() >= 2 {
        out.rally_id = read_u16_be(p, 0);
        if p.len() >= 3 {
            out.outcome = Some(RallyOutcome::from_u8(p[2]));
        }
        if p.len() >= 11 {
            out.pnl_lamports = read_u64_be(p, 3);
        }
    }
    out
}

// ============================================================================
// Encode
// ============================================================================

fn header(msg_type: MsgType, agent_id: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + 51);
    buf.extend_from_slice(&CHUM_MAGIC);
    buf.push(msg_type.as_u8());
    buf.extend_from_slice(&agent_id.to_be_bytes());
    buf
}

pub fn encode_alpha(
    agent_id: u16,
    subtype: AlphaKind,
    mint: &[u8; 32],
    amount: Option<u64>,
) -> Vec<u8> {
    let mut buf = header(MsgType::Alpha, agent_id);
    buf.push(subtype.as_u8());
    buf.extend_from_slice(mint);
    if let Some(amount) = amount {
        buf.extend_from_slice(&amount.to_be_bytes());
    }
    buf
}

pub fn encode_signal(
    agent_id: u16,
    mint: &[u8; 32],
    direction: Direction,
    confidence: Option<u8>,
) -> Vec<u8> {
    let mut buf = header(MsgType::Signal, agent_id);
    buf.extend_from_slice(mint);
    buf.push(direction.as_u8());
    if let Some(confidence) = confidence {
        buf.push(confidence);
    }
    buf
}

pub fn encode_rally(
    agent_id: u16,
    rally_id: u16,
    mint: &[u8; 32],
    action: TradeAction,
    entry_price: u64,
    target_price: u64,
) -> Vec<u8> {
    let mut buf = header(MsgType::Rally, agent_id);
    buf.extend_from_slice(&rally_id.to_be_bytes());
    buf.extend_from_slice(mint);
    buf.push(action.as_u8());
    buf.extend_from_slice(&entry_price.to_be_bytes());
    buf.extend_from_slice(&target_price.to_be_bytes());
    buf
}

pub fn encode_exit(agent_id: u16, rally_id: u16, reason: ExitReason) -> Vec<u8> {
    let mut buf = header(MsgType::Exit, agent_id);
    buf.extend_from_slice(&rally_id.to_be_bytes());
    buf.push(reason.as_u8());
    buf
}

pub fn encode_result(
    agent_id: u16,
    rally_id: u16,
    outcome: RallyOutcome,
    pnl_lamports: u64,
) -> Vec<u8> {
    let mut buf = header(MsgType::Result, agent_id);
    buf.extend_from_slice(&rally_id.to_be_bytes());
    buf.push(outcome.as_u8());
    buf.extend_from_slice(&pnl_lamports.to_be_bytes());
    buf
}

// ============================================================================
// Addresses
// ============================================================================

/// Render 32 mint bytes as a base58 address. Anything that is not exactly
/// 32 bytes falls back to hex. Never fails.
pub fn render_mint(bytes: &[u8]) -> String {
    match <&[u8; 32]>::try_from(bytes) {
        Ok(arr) => bs58::encode(arr).into_string(),
        Err(_) => hex::encode(bytes),
    }
}

/// Parse a mint address from either base58 (standard Solana format) or hex
/// (with optional `0x` prefix).
pub fn parse_mint(s: &str) -> Result<[u8; 32], ProtocolError> {
    let s = s.trim();
    let bytes = if s.starts_with("0x") || s.chars().all(|c| c.is_ascii_hexdigit()) {
        hex::decode(s.trim_start_matches("0x")).map_err(|e| ProtocolError::InvalidMint {
            addr: s.to_string(),
            reason: e.to_string(),
        })?
    } else {
        bs58::decode(s)
            .into_vec()
            .map_err(|e| ProtocolError::InvalidMint {
                addr: s.to_string(),
                reason: e.to_string(),
            })?
    };
    bytes.try_into().map_err(|_| ProtocolError::InvalidMint {
        addr: s.to_string(),
        reason: "expected 32 bytes".to_string(),
    })
}

// ============================================================================
// Byte readers
// ============================================================================

fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

fn read_u64_be(data: &[u8], offset: usize) -> Option<u64> {
    let bytes: [u8; 8] = data.get(offset..offset + 8)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

    fn sol_mint() -> [u8; 32] {
        parse_mint(SOL_MINT).unwrap()
    }

    #[test]
    fn alpha_round_trip_with_amount() {
        let bytes = encode_alpha(1, AlphaKind::WhaleMove, &sol_mint(), Some(500_000_000_000));
        let note = decode_note(&bytes).unwrap();

        assert_eq!(note.msg_type, MsgType::Alpha);
        assert_eq!(note.agent_id, 1);
        let Payload::Alpha(p) = note.payload else {
            panic!("expected alpha payload");
        };
        assert_eq!(p.subtype, Some(AlphaKind::WhaleMove));
        assert_eq!(p.token_mint.as_deref(), Some(SOL_MINT));
        assert_eq!(p.amount, Some(500_000_000_000));
    }

    #[test]
    fn alpha_round_trip_without_amount() {
        let bytes = encode_alpha(7, AlphaKind::SocialSurge, &sol_mint(), None);
        let note = decode_note(&bytes).unwrap();

        let Payload::Alpha(p) = note.payload else {
            panic!("expected alpha payload");
        };
        assert_eq!(p.subtype, Some(AlphaKind::SocialSurge));
        assert_eq!(p.token_mint.as_deref(), Some(SOL_MINT));
        assert_eq!(p.amount, None);
    }

    #[test]
    fn signal_round_trip_both_confidence_variants() {
        for confidence in [Some(85u8), None] {
            let bytes = encode_signal(2, &sol_mint(), Direction::Sell, confidence);
            let note = decode_note(&bytes).unwrap();
            let Payload::Signal(p) = note.payload else {
                panic!("expected signal payload");
            };
            assert_eq!(p.token_mint.as_deref(), Some(SOL_MINT));
            assert_eq!(p.direction, Some(Direction::Sell));
            assert_eq!(p.confidence, confidence);
        }
    }

    #[test]
    fn rally_round_trip() {
        let bytes = encode_rally(3, 100, &sol_mint(), TradeAction::Buy, 900_000, 1_350_000);
        let note = decode_note(&bytes).unwrap();

        assert_eq!(note.agent_id, 3);
        let Payload::Rally(p) = note.payload else {
            panic!("expected rally payload");
        };
        assert_eq!(p.rally_id, Some(100));
        assert_eq!(p.token_mint.as_deref(), Some(SOL_MINT));
        assert_eq!(p.action, Some(TradeAction::Buy));
        assert_eq!(p.entry_price, Some(900_000));
        assert_eq!(p.target_price, Some(1_350_000));
    }

    #[test]
    fn exit_round_trip() {
        let bytes = encode_exit(3, 100, ExitReason::StopLoss);
        let note = decode_note(&bytes).unwrap();

        let Payload::Exit(p) = note.payload else {
            panic!("expected exit payload");
        };
        assert_eq!(p.rally_id, Some(100));
        assert_eq!(p.reason, Some(ExitReason::StopLoss));
    }

    #[test]
    fn result_round_trip() {
        let bytes = encode_result(3, 100, RallyOutcome::Win, 450_000);
        let note = decode_note(&bytes).unwrap();

        let Payload::Result(p) = note.payload else {
            panic!("expected result payload");
        };
        assert_eq!(p.rally_id, Some(100));
        assert_eq!(p.outcome, Some(RallyOutcome::Win));
        assert_eq!(p.pnl_lamports, Some(450_000));
    }

    #[test]
    fn full_u64_range_survives() {
        let bytes = encode_result(1, 1, RallyOutcome::Loss, u64::MAX);
        let note = decode_note(&bytes).unwrap();
        let Payload::Result(p) = note.payload else {
            panic!("expected result payload");
        };
        assert_eq!(p.pnl_lamports, Some(u64::MAX));
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut bytes = encode_exit(1, 1, ExitReason::Manual);
        bytes[0] = 0x58;
        assert!(decode_note(&bytes).is_none());

        // Payload content is irrelevant once the magic differs.
        assert!(decode_note(&[0x00, 0x00, 0x03, 0x00, 0x01, 0xff, 0xff]).is_none());
    }

    #[test]
    fn below_header_rejected() {
        assert!(decode_note(&[]).is_none());
        assert!(decode_note(&[0x43]).is_none());
        assert!(decode_note(&[0x43, 0x48, 0x03, 0x00]).is_none());
    }

    #[test]
    fn rally_truncated_target_price_is_partial_not_error() {
        let full = encode_rally(3, 100, &sol_mint(), TradeAction::Buy, 900_000, 1_350_000);
        let truncated = &full[..full.len() - 8];
        let note = decode_note(truncated).unwrap();

        let Payload::Rally(p) = note.payload else {
            panic!("expected rally payload");
        };
        assert_eq!(p.rally_id, Some(100));
        assert_eq!(p.token_mint.as_deref(), Some(SOL_MINT));
        assert_eq!(p.action, Some(TradeAction::Buy));
        assert_eq!(p.entry_price, Some(900_000));
        assert_eq!(p.target_price, None);
    }

    #[test]
    fn signal_below_mint_boundary_decodes_empty() {
        let full = encode_signal(2, &sol_mint(), Direction::Buy, None);
        // 32 payload bytes: mint present but direction byte missing, so
        // neither field is usable.
        let note = decode_note(&full[..HEADER_LEN + 32]).unwrap();
        let Payload::Signal(p) = note.payload else {
            panic!("expected signal payload");
        };
        assert_eq!(p.token_mint, None);
        assert_eq!(p.direction, None);
        assert_eq!(p.confidence, None);
    }

    #[test]
    fn unknown_type_tag_kept_with_empty_payload() {
        let bytes = [0x43, 0x48, 0x2a, 0x00, 0x07, 0x01, 0x02, 0x03];
        let note = decode_note(&bytes).unwrap();
        assert_eq!(note.msg_type, MsgType::Unknown(0x2a));
        assert_eq!(note.agent_id, 7);
        assert_eq!(note.payload, Payload::Unknown);
    }

    #[test]
    fn parse_mint_accepts_base58_and_hex() {
        let from_b58 = parse_mint(SOL_MINT).unwrap();
        let from_hex = parse_mint(&hex::encode(from_b58)).unwrap();
        assert_eq!(from_b58, from_hex);

        let prefixed = format!("0x{}", hex::encode(from_b58));
        assert_eq!(parse_mint(&prefixed).unwrap(), from_b58);

        assert!(parse_mint("not-a-mint!").is_err());
        assert!(parse_mint("abcdef").is_err()); // valid hex, wrong length
    }

    #[test]
    fn render_mint_falls_back_to_hex() {
        assert_eq!(render_mint(&[0xab, 0xcd]), "abcd");
    }
}
