//! Stats aggregation: the live room view derived from one scan window.
//!
//! A pure function over the message list: every derived entity is
//! recomputed from scratch on each call, nothing is mutated between
//! calls, so aggregation is idempotent and cannot drift from the cache.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use chum_protocol::payload::{Payload, TradeAction};
use chum_protocol::ProtocolMessage;

/// A trade call observed in the window with no matching EXIT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RallyInfo {
    pub rally_id: u16,
    pub token_mint: String,
    pub action: TradeAction,
    pub entry_price: u64,
    pub target_price: u64,
}

/// Per-agent activity within the window, not an all-time ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentActivity {
    pub address: String,
    pub message_count: u64,
    /// Max block time seen for this address; 0 when the ledger reported
    /// none.
    pub last_seen: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomStats {
    pub total_messages: usize,
    pub unique_agents: usize,
    pub active_rallies: Vec<RallyInfo>,
    pub agent_list: Vec<AgentActivity>,
}

/// Derive [`RoomStats`] from a scan window.
///
/// Open-rally reconstruction is order-independent: the exited-id set is
/// collected over the whole window first, so an EXIT observed before its
/// RALLY (or after) closes it either way. Rally ids are matched across
/// agents by id alone; two agents reusing the same 16-bit id within one
/// window will shadow each other.
pub fn room_stats(messages: &[ProtocolMessage]) -> RoomStats {
    // Per-agent activity, first-seen order preserved so output is stable.
    let mut agent_index: HashMap<&str, usize> = HashMap::new();
    let mut agent_list: Vec<AgentActivity> = Vec::new();
    for msg in messages {
        let seen = msg.block_time.unwrap_or(0);
        match agent_index.get(msg.sender.as_str()) {
            Some(&i) => {
                agent_list[i].message_count += 1;
                agent_list[i].last_seen = agent_list[i].last_seen.max(seen);
            }
            None => {
                agent_index.insert(msg.sender.as_str(), agent_list.len());
                agent_list.push(AgentActivity {
                    address: msg.sender.clone(),
                    message_count: 1,
                    last_seen: seen,
                });
            }
        }
    }

    // Every rally id referenced by an EXIT, regardless of position.
    let exited: HashSet<u16> = messages
        .iter()
        .filter_map(|msg| match &msg.payload {
            Payload::Exit(p) => p.rally_id,
            _ => None,
        })
        .collect();

    // Open rallies: first RALLY per id wins; only one should exist per id
    // in practice.
    let mut recorded: HashSet<u16> = HashSet::new();
    let mut active_rallies: Vec<RallyInfo> = Vec::new();
    for msg in messages {
        if let Payload::Rally(p) = &msg.payload {
            let Some(rally_id) = p.rally_id else { continue };
            if !exited.contains(&rally_id) && recorded.insert(rally_id) {
                active_rallies.push(RallyInfo {
                    rally_id,
                    token_mint: p
                        .token_mint
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    action: p.action.unwrap_or(TradeAction::Buy),
                    entry_price: p.entry_price.unwrap_or(0),
                    target_price: p.target_price.unwrap_or(0),
                });
            }
        }
    }

    RoomStats {
        total_messages: messages.len(),
        unique_agents: agent_list.len(),
        active_rallies,
        agent_list,
    }
}
