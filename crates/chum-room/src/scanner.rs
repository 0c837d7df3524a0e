//! Room scanner: turns recent ledger activity into a decoded message
//! window.
//!
//! Every per-transaction step runs inside its own failure boundary: a
//! malformed memo, an undecodable instruction, or a fetch error skips that
//! transaction and the scan continues. Only total ledger unavailability
//! escalates, and the cache absorbs even that by serving the last good
//! window.

use std::sync::Arc;
use std::time::Duration;

use chum_client::{note, ClientError, LedgerReader};
use chum_protocol::codec::decode_note;
use chum_protocol::constants::{CACHE_TTL_SECS, MAX_SIGNATURE_FETCH, SIGNATURE_FETCH_FACTOR};
use chum_protocol::ProtocolMessage;

use crate::cache::{Clock, SystemClock, WindowCache};

pub struct RoomScanner<L> {
    ledger: L,
    cache: WindowCache,
    clock: Arc<dyn Clock>,
}

impl<L: LedgerReader> RoomScanner<L> {
    pub fn new(ledger: L) -> Self {
        Self::with_clock(
            ledger,
            Duration::from_secs(CACHE_TTL_SECS),
            Arc::new(SystemClock),
        )
    }

    /// Scanner with explicit TTL and clock, for deterministic tests.
    pub fn with_clock(ledger: L, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            cache: WindowCache::new(ttl),
            clock,
        }
    }

    /// The current message window, newest first, at most `limit` long.
    ///
    /// Serves the cached window while it is fresh; on scan failure falls
    /// back to the last good window (or an empty one), never an error.
    pub async fn read_messages(&self, limit: usize) -> Vec<ProtocolMessage> {
        let now = self.clock.now_millis();
        if let Some(window) = self.cache.fresh(now) {
            return truncated(&window, limit);
        }

        match self.scan(limit).await {
            Ok(messages) => {
                let out = truncated(&messages, limit);
                self.cache.replace(messages, now);
                out
            }
            Err(e) => {
                tracing::warn!(error = %e, "Room scan failed; serving cached window");
                self.cache
                    .any()
                    .map(|window| truncated(&window, limit))
                    .unwrap_or_default()
            }
        }
    }

    async fn scan(&self, limit: usize) -> Result<Vec<ProtocolMessage>, ClientError> {
        // Over-fetch: not every transaction touching the room carries a
        // decodable memo.
        let fetch = (limit * SIGNATURE_FETCH_FACTOR).min(MAX_SIGNATURE_FETCH);
        let signatures = self.ledger.recent_signatures(fetch).await?;

        let mut messages = Vec::new();
        for record in signatures {
            if messages.len() >= limit {
                break;
            }
            if record.failed {
                continue;
            }

            let tx = match self.ledger.fetch_transaction(&record.signature).await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::warn!(
                        signature = %record.signature,
                        error = %e,
                        "Failed to fetch transaction; skipping",
                    );
                    continue;
                }
            };
            if tx.failed {
                continue;
            }

            let sender = tx
                .fee_payer
                .clone()
                .unwrap_or_else(|| "unknown".to_string());

            // A transaction carries at most one protocol note: first
            // decodable candidate wins.
            for bytes in note::note_candidates(&tx) {
                if let Some(decoded) = decode_note(&bytes) {
                    messages.push(ProtocolMessage::from_note(
                        decoded,
                        &bytes,
                        record.signature.clone(),
                        sender.clone(),
                        record.block_time,
                    ));
                    break;
                }
            }
        }

        tracing::debug!(count = messages.len(), "Room scan complete");
        Ok(messages)
    }
}

fn truncated(window: &[ProtocolMessage], limit: usize) -> Vec<ProtocolMessage> {
    window.iter().take(limit).cloned().collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chum_client::{
        InstructionPayload, InstructionView, SignatureRecord, TransactionView,
    };
    use chum_protocol::codec::{encode_rally, encode_signal};
    use chum_protocol::constants::MEMO_PROGRAM;
    use chum_protocol::payload::{Direction, TradeAction};
    use chum_protocol::MsgType;

    struct TestClock(AtomicU64);

    impl Clock for TestClock {
        fn now_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct StubState {
        signatures: Vec<SignatureRecord>,
        transactions: HashMap<String, TransactionView>,
        fail: AtomicBool,
        signature_calls: AtomicUsize,
    }

    #[derive(Clone)]
    struct StubLedger(Arc<StubState>);

    impl StubLedger {
        fn new(
            signatures: Vec<SignatureRecord>,
            transactions: HashMap<String, TransactionView>,
        ) -> Self {
            Self(Arc::new(StubState {
                signatures,
                transactions,
                fail: AtomicBool::new(false),
                signature_calls: AtomicUsize::new(0),
            }))
        }
    }

    #[async_trait]
    impl LedgerReader for StubLedger {
        async fn recent_signatures(
            &self,
            limit: usize,
        ) -> Result<Vec<SignatureRecord>, ClientError> {
            self.0.signature_calls.fetch_add(1, Ordering::SeqCst);
            if self.0.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Rpc("endpoint unreachable".to_string()));
            }
            Ok(self.0.signatures.iter().take(limit).cloned().collect())
        }

        async fn fetch_transaction(
            &self,
            signature: &str,
        ) -> Result<TransactionView, ClientError> {
            if self.0.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Rpc("endpoint unreachable".to_string()));
            }
            self.0
                .transactions
                .get(signature)
                .cloned()
                .ok_or_else(|| ClientError::Rpc("transaction not found".to_string()))
        }
    }

    fn sol_mint() -> [u8; 32] {
        chum_protocol::codec::parse_mint("So11111111111111111111111111111111111111112").unwrap()
    }

    fn sig(signature: &str, block_time: i64) -> SignatureRecord {
        SignatureRecord {
            signature: signature.to_string(),
            block_time: Some(block_time),
            failed: false,
        }
    }

    fn memo_tx(sender: &str, payloads: &[Vec<u8>]) -> TransactionView {
        TransactionView {
            fee_payer: Some(sender.to_string()),
            failed: false,
            instructions: payloads
                .iter()
                .map(|bytes| InstructionView {
                    program_id: MEMO_PROGRAM.to_string(),
                    payload: InstructionPayload::Text(hex::encode(bytes)),
                })
                .collect(),
        }
    }

    fn plain_transfer_tx(sender: &str) -> TransactionView {
        TransactionView {
            fee_payer: Some(sender.to_string()),
            failed: false,
            instructions: Vec::new(),
        }
    }

    fn scanner_with(
        ledger: StubLedger,
        clock: Arc<TestClock>,
    ) -> RoomScanner<StubLedger> {
        RoomScanner::with_clock(ledger, Duration::from_secs(15), clock)
    }

    #[tokio::test]
    async fn scan_decodes_protocol_notes_and_skips_the_rest() {
        let rally = encode_rally(1, 100, &sol_mint(), TradeAction::Buy, 900_000, 1_350_000);
        let mut transactions = HashMap::new();
        transactions.insert("s1".to_string(), memo_tx("agent-a", &[rally]));
        transactions.insert("s2".to_string(), plain_transfer_tx("bystander"));

        let mut signatures = vec![sig("s1", 100), sig("s2", 99)];
        // An on-ledger failure is skipped before any fetch.
        signatures.push(SignatureRecord {
            signature: "s3".to_string(),
            block_time: Some(98),
            failed: true,
        });

        let ledger = StubLedger::new(signatures, transactions);
        let scanner = scanner_with(ledger, Arc::new(TestClock(AtomicU64::new(0))));

        let messages = scanner.read_messages(10).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].signature, "s1");
        assert_eq!(messages[0].sender, "agent-a");
        assert_eq!(messages[0].block_time, Some(100));
        assert_eq!(messages[0].msg_type, MsgType::Rally);
    }

    #[tokio::test]
    async fn one_bad_transaction_does_not_abort_the_scan() {
        let signal = encode_signal(2, &sol_mint(), Direction::Buy, Some(80));
        let mut transactions = HashMap::new();
        // "missing" is in the signature list but not fetchable.
        transactions.insert("good".to_string(), memo_tx("agent-a", &[signal]));

        let ledger = StubLedger::new(
            vec![sig("missing", 101), sig("good", 100)],
            transactions,
        );
        let scanner = scanner_with(ledger, Arc::new(TestClock(AtomicU64::new(0))));

        let messages = scanner.read_messages(10).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].signature, "good");
    }

    #[tokio::test]
    async fn first_note_per_transaction_wins() {
        let first = encode_signal(2, &sol_mint(), Direction::Buy, Some(80));
        let second = encode_signal(3, &sol_mint(), Direction::Sell, Some(60));
        let mut transactions = HashMap::new();
        transactions.insert("s1".to_string(), memo_tx("agent-a", &[first, second]));

        let ledger = StubLedger::new(vec![sig("s1", 100)], transactions);
        let scanner = scanner_with(ledger, Arc::new(TestClock(AtomicU64::new(0))));

        let messages = scanner.read_messages(10).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].agent_id, 2);
    }

    #[tokio::test]
    async fn fresh_cache_avoids_a_second_scan() {
        let rally = encode_rally(1, 100, &sol_mint(), TradeAction::Buy, 1, 2);
        let mut transactions = HashMap::new();
        transactions.insert("s1".to_string(), memo_tx("agent-a", &[rally]));

        let ledger = StubLedger::new(vec![sig("s1", 100)], transactions);
        let handle = ledger.clone();
        let clock = Arc::new(TestClock(AtomicU64::new(0)));
        let scanner = scanner_with(ledger, Arc::clone(&clock));

        assert_eq!(scanner.read_messages(10).await.len(), 1);
        // Second read within the TTL is served from the cache.
        clock.0.store(5_000, Ordering::SeqCst);
        assert_eq!(scanner.read_messages(10).await.len(), 1);
        assert_eq!(handle.0.signature_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_window_served_when_the_ledger_goes_away() {
        let rally = encode_rally(1, 100, &sol_mint(), TradeAction::Buy, 1, 2);
        let mut transactions = HashMap::new();
        transactions.insert("s1".to_string(), memo_tx("agent-a", &[rally]));

        let ledger = StubLedger::new(vec![sig("s1", 100)], transactions);
        let handle = ledger.clone();
        let clock = Arc::new(TestClock(AtomicU64::new(0)));
        let scanner = scanner_with(ledger, Arc::clone(&clock));

        let first = scanner.read_messages(10).await;
        assert_eq!(first.len(), 1);

        // TTL elapses and the endpoint becomes unreachable.
        clock.0.store(60_000, Ordering::SeqCst);
        handle.0.fail.store(true, Ordering::SeqCst);

        let degraded = scanner.read_messages(10).await;
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0].signature, first[0].signature);
    }

    #[tokio::test]
    async fn empty_window_when_nothing_was_ever_cached() {
        let ledger = StubLedger::new(Vec::new(), HashMap::new());
        let handle = ledger.clone();
        handle.0.fail.store(true, Ordering::SeqCst);

        let scanner = scanner_with(ledger, Arc::new(TestClock(AtomicU64::new(0))));
        assert!(scanner.read_messages(10).await.is_empty());
    }

    #[tokio::test]
    async fn limit_stops_the_scan_early() {
        let mut transactions = HashMap::new();
        let mut signatures = Vec::new();
        for i in 0..5 {
            let name = format!("s{i}");
            let note = encode_signal(i as u16, &sol_mint(), Direction::Buy, None);
            transactions.insert(name.clone(), memo_tx("agent-a", &[note]));
            signatures.push(sig(&name, 100 - i as i64));
        }

        let ledger = StubLedger::new(signatures, transactions);
        let scanner = scanner_with(ledger, Arc::new(TestClock(AtomicU64::new(0))));

        let messages = scanner.read_messages(2).await;
        assert_eq!(messages.len(), 2);
        // Newest first.
        assert_eq!(messages[0].signature, "s0");
        assert_eq!(messages[1].signature, "s1");
    }
}
