// ============================================================================
// Protocol constants
// ============================================================================

/// Two magic bytes ("CH") opening every protocol memo.
pub const CHUM_MAGIC: [u8; 2] = [0x43, 0x48];

/// Fixed header length: magic (2) + message type (1) + agent id (2).
pub const HEADER_LEN: usize = 5;

// --- Addresses --------------------------------------------------------------

/// SPL Memo program (same address on mainnet and devnet).
pub const MEMO_PROGRAM: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// The room: a well-known rendezvous address. Every protocol transaction
/// carries a zero-lamport transfer to it so that querying its transaction
/// history surfaces all room traffic.
pub const CHUM_ROOM: &str = "chumAA7QjpFzpEtZ2XezM8onHrt8of4w35p3VMS4C6T";

// --- Scan window ------------------------------------------------------------

/// Default number of decoded messages a scan aims for.
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;

/// Signatures fetched per requested message. Not every transaction touching
/// the room carries a decodable memo, so we over-fetch.
pub const SIGNATURE_FETCH_FACTOR: usize = 2;

/// Hard cap on signatures fetched in one scan.
pub const MAX_SIGNATURE_FETCH: usize = 100;

/// How long a successfully scanned window is served before rescanning.
pub const CACHE_TTL_SECS: u64 = 15;

// --- Known tokens -----------------------------------------------------------
// Mints the original agents broadcast about. Symbol lookup is a convenience
// for producers; the wire always carries the raw 32 bytes.

pub const KNOWN_TOKENS: &[(&str, &str)] = &[
    ("SOL", "So11111111111111111111111111111111111111112"),
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
    ("BONK", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263"),
    ("JUP", "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
    ("MSOL", "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So"),
    ("RAY", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R"),
    ("ORCA", "orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE"),
    ("WIF", "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm"),
    ("CHUM", "AXCAxuwc2UFFuavpWHVDSXFKM4U9E76ZARZ1Gc2Cpump"),
];

/// Resolve a known token symbol (case-insensitive) to its mint address.
pub fn token_by_symbol(symbol: &str) -> Option<&'static str> {
    KNOWN_TOKENS
        .iter()
        .find(|(sym, _)| sym.eq_ignore_ascii_case(symbol))
        .map(|(_, mint)| *mint)
}
