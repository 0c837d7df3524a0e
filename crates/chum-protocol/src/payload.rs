//! Per-type payload structs and their field enums.
//!
//! Every field is optional: a truncated memo decodes to whatever the
//! available bytes permit, never an error. The wire-byte mapping for each
//! enum lives next to it.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ProtocolError;

// ============================================================================
// Field enums
// ============================================================================

/// ALPHA subtype byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaKind {
    WhaleMove,
    DexListing,
    SocialSurge,
    /// Subtype byte this reader does not know.
    Unknown(u8),
}

impl AlphaKind {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x01 => Self::WhaleMove,
            0x02 => Self::DexListing,
            0x03 => Self::SocialSurge,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::WhaleMove => 0x01,
            Self::DexListing => 0x02,
            Self::SocialSurge => 0x03,
            Self::Unknown(b) => b,
        }
    }
}

impl std::fmt::Display for AlphaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WhaleMove => write!(f, "WHALE_MOVE"),
            Self::DexListing => write!(f, "DEX_LISTING"),
            Self::SocialSurge => write!(f, "SOCIAL_SURGE"),
            Self::Unknown(b) => write!(f, "UNKNOWN({b:#04x})"),
        }
    }
}

impl FromStr for AlphaKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "whale-move" | "whale" => Ok(Self::WhaleMove),
            "dex-listing" | "listing" => Ok(Self::DexListing),
            "social-surge" | "social" => Ok(Self::SocialSurge),
            _ => Err(ProtocolError::UnknownAlphaKind(s.to_string())),
        }
    }
}

/// SIGNAL direction byte: 0x01 = buy, anything else = sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn from_u8(v: u8) -> Self {
        if v == 0x01 {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Buy => 0x01,
            Self::Sell => 0x02,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(ProtocolError::UnknownDirection(s.to_string())),
        }
    }
}

/// RALLY action byte. Same wire mapping as [`Direction`].
pub type TradeAction = Direction;

/// EXIT reason byte: 0x01 target hit, 0x02 stop loss, anything else manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TargetHit,
    StopLoss,
    Manual,
}

impl ExitReason {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0x01 => Self::TargetHit,
            0x02 => Self::StopLoss,
            _ => Self::Manual,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::TargetHit => 0x01,
            Self::StopLoss => 0x02,
            Self::Manual => 0x03,
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetHit => write!(f, "TARGET_HIT"),
            Self::StopLoss => write!(f, "STOP_LOSS"),
            Self::Manual => write!(f, "MANUAL"),
        }
    }
}

impl FromStr for ExitReason {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "target-hit" | "target" => Ok(Self::TargetHit),
            "stop-loss" | "stop" => Ok(Self::StopLoss),
            "manual" => Ok(Self::Manual),
            _ => Err(ProtocolError::UnknownExitReason(s.to_string())),
        }
    }
}

/// RESULT outcome byte: 0x01 = win, anything else = loss. The pnl magnitude
/// is unsigned on the wire; this byte carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RallyOutcome {
    Win,
    Loss,
}

impl RallyOutcome {
    pub fn from_u8(v: u8) -> Self {
        if v == 0x01 {
            Self::Win
        } else {
            Self::Loss
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Win => 0x01,
            Self::Loss => 0x02,
        }
    }
}

impl std::fmt::Display for RallyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win => write!(f, "WIN"),
            Self::Loss => write!(f, "LOSS"),
        }
    }
}

impl FromStr for RallyOutcome {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "win" => Ok(Self::Win),
            "loss" | "lose" => Ok(Self::Loss),
            _ => Err(ProtocolError::UnknownOutcome(s.to_string())),
        }
    }
}

// Enums render as their protocol names in JSON output.
macro_rules! serialize_as_display {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }
    )*};
}

serialize_as_display!(AlphaKind, Direction, ExitReason, RallyOutcome);

// ============================================================================
// Payload variants
// ============================================================================

/// Market intelligence broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct AlphaPayload {
    pub subtype: Option<AlphaKind>,
    /// Base58 mint address (hex fallback for malformed identifiers).
    pub token_mint: Option<String>,
    /// Raw token units. Absent when the producer supplied none.
    pub amount: Option<u64>,
}

/// Directional call on a token.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SignalPayload {
    pub token_mint: Option<String>,
    pub direction: Option<Direction>,
    /// 0–100, absent when the producer supplied none.
    pub confidence: Option<u8>,
}

/// Trade call: opens a rally until a matching EXIT is observed.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RallyPayload {
    /// Scoped to the emitting agent's convention, not globally unique.
    pub rally_id: Option<u16>,
    pub token_mint: Option<String>,
    pub action: Option<TradeAction>,
    /// Raw integer price ticks.
    pub entry_price: Option<u64>,
    pub target_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ExitPayload {
    pub rally_id: Option<u16>,
    pub reason: Option<ExitReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResultPayload {
    pub rally_id: Option<u16>,
    pub outcome: Option<RallyOutcome>,
    /// Unsigned magnitude; sign implied by `outcome`.
    pub pnl_lamports: Option<u64>,
}

/// Payload shape is fully determined by the message type tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Alpha(AlphaPayload),
    Signal(SignalPayload),
    Rally(RallyPayload),
    Exit(ExitPayload),
    Result(ResultPayload),
    /// Unrecognized type tag: no protocol-defined fields.
    Unknown,
}
