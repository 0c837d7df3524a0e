use serde::Serialize;

use crate::agents::agent_name;
use crate::payload::Payload;

/// Room message types, one byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    /// Market intelligence: whale move, listing, social surge.
    Alpha,
    /// Directional call on a token.
    Signal,
    /// Trade call with entry and target, opens a rally.
    Rally,
    /// Closes a rally.
    Exit,
    /// Settled outcome of a rally.
    Result,
    /// Tag this reader does not know. Kept, not rejected: a type added in
    /// the future must not break old readers.
    Unknown(u8),
}

impl MsgType {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x01 => Self::Alpha,
            0x02 => Self::Signal,
            0x03 => Self::Rally,
            0x04 => Self::Exit,
            0x05 => Self::Result,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Alpha => 0x01,
            Self::Signal => 0x02,
            Self::Rally => 0x03,
            Self::Exit => 0x04,
            Self::Result => 0x05,
            Self::Unknown(tag) => tag,
        }
    }
}

impl std::fmt::Display for MsgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpha => write!(f, "ALPHA"),
            Self::Signal => write!(f, "SIGNAL"),
            Self::Rally => write!(f, "RALLY"),
            Self::Exit => write!(f, "EXIT"),
            Self::Result => write!(f, "RESULT"),
            Self::Unknown(tag) => write!(f, "UNKNOWN({tag:#04x})"),
        }
    }
}

impl Serialize for MsgType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// The header fields plus payload of one decoded memo, before the carrier
/// transaction's metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNote {
    pub msg_type: MsgType,
    pub agent_id: u16,
    pub payload: Payload,
}

/// One fully decoded room message: a [`DecodedNote`] joined with the
/// transaction that carried it.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolMessage {
    /// Transaction signature that carried the memo.
    pub signature: String,
    /// Fee payer of the carrier transaction; by convention the emitting
    /// agent's wallet.
    pub sender: String,
    /// Unix seconds; None when the ledger did not report a block time.
    pub block_time: Option<i64>,
    pub msg_type: MsgType,
    pub agent_id: u16,
    /// Cosmetic label from the known-agent table, not protocol-bearing.
    pub agent_name: String,
    pub payload: Payload,
    /// The undecoded memo bytes, hex-rendered, kept for diagnostics.
    pub raw_hex: String,
}

impl ProtocolMessage {
    /// Join a decoded note with its carrier transaction metadata.
    pub fn from_note(
        note: DecodedNote,
        raw: &[u8],
        signature: String,
        sender: String,
        block_time: Option<i64>,
    ) -> Self {
        Self {
            signature,
            sender,
            block_time,
            msg_type: note.msg_type,
            agent_id: note.agent_id,
            agent_name: agent_name(note.agent_id),
            payload: note.payload,
            raw_hex: hex::encode(raw),
        }
    }

    /// One-line human rendering, used by the CLI's plain output.
    pub fn summary(&self) -> String {
        match &self.payload {
            Payload::Alpha(p) => {
                let sub = p
                    .subtype
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "intel".into());
                match &p.token_mint {
                    Some(mint) => format!("{sub} — {}", truncate_address(mint)),
                    None => sub,
                }
            }
            Payload::Signal(p) => {
                let dir = p
                    .direction
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "?".into());
                let token = p
                    .token_mint
                    .as_deref()
                    .map(truncate_address)
                    .unwrap_or_else(|| "?".into());
                match p.confidence {
                    Some(c) => format!("{dir} {token} ({c}%)"),
                    None => format!("{dir} {token}"),
                }
            }
            Payload::Rally(p) => {
                let action = p
                    .action
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "BUY".into());
                let token = p
                    .token_mint
                    .as_deref()
                    .map(truncate_address)
                    .unwrap_or_else(|| "?".into());
                format!("Rally #{} — {action} {token}", fmt_id(p.rally_id))
            }
            Payload::Exit(p) => {
                let reason = p
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "MANUAL".into());
                format!("Exit Rally #{} — {reason}", fmt_id(p.rally_id))
            }
            Payload::Result(p) => {
                let outcome = p
                    .outcome
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "?".into());
                format!("Rally #{} — {outcome}", fmt_id(p.rally_id))
            }
            Payload::Unknown => {
                let head: String = self.raw_hex.chars().take(20).collect();
                format!("{head}...")
            }
        }
    }
}

fn fmt_id(id: Option<u16>) -> String {
    id.map(|i| i.to_string()).unwrap_or_else(|| "?".into())
}

/// `chumAA7Q..S4C6T` style shortening for display.
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}..{}", &address[..4], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_type_round_trips_known_tags() {
        for tag in 1u8..=5 {
            assert_eq!(MsgType::from_u8(tag).as_u8(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_kept() {
        let t = MsgType::from_u8(0x2a);
        assert_eq!(t, MsgType::Unknown(0x2a));
        assert_eq!(t.as_u8(), 0x2a);
        assert_eq!(t.to_string(), "UNKNOWN(0x2a)");
    }

    #[test]
    fn address_truncation() {
        assert_eq!(truncate_address("short"), "short");
        assert_eq!(
            truncate_address("chumAA7QjpFzpEtZ2XezM8onHrt8of4w35p3VMS4C6T"),
            "chum..4C6T"
        );
    }
}
