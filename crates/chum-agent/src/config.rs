use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chum_protocol::payload::{AlphaKind, Direction, ExitReason, RallyOutcome, TradeAction};

#[derive(Parser, Debug)]
#[command(name = "chum-agent", about = "CHUM room agent: post and read protocol messages")]
pub struct Cli {
    /// Solana RPC endpoint.
    #[arg(
        long,
        env = "CHUM_RPC_URL",
        default_value = "https://api.mainnet-beta.solana.com"
    )]
    pub rpc_url: String,

    /// Path to the agent keypair file (JSON byte array, standard Solana
    /// tooling format). Only needed by posting commands.
    #[arg(long, env = "CHUM_AGENT_KEY", default_value = "chum-agent.json")]
    pub keypair_path: PathBuf,

    /// Agent identifier carried in every message header.
    #[arg(long, env = "CHUM_AGENT_ID", default_value_t = 1)]
    pub agent_id: u16,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Post a market-intelligence ALPHA message.
    Alpha {
        /// whale-move, dex-listing, or social-surge.
        #[arg(long)]
        subtype: AlphaKind,
        /// Token mint: known symbol (SOL, USDC, …), base58, or hex.
        #[arg(long)]
        mint: String,
        /// Raw token units; omit to post the alert without an amount.
        #[arg(long)]
        amount: Option<u64>,
    },

    /// Post a directional SIGNAL on a token.
    Signal {
        #[arg(long)]
        mint: String,
        /// buy or sell.
        #[arg(long)]
        direction: Direction,
        /// 0–100; omit to post without one.
        #[arg(long)]
        confidence: Option<u8>,
    },

    /// Open a RALLY: a trade call with entry and target.
    Rally {
        /// Identifier scoped to this agent's own convention.
        #[arg(long)]
        rally_id: u16,
        #[arg(long)]
        mint: String,
        /// buy or sell.
        #[arg(long)]
        action: TradeAction,
        /// Entry price in raw integer ticks.
        #[arg(long)]
        entry: u64,
        /// Target price in raw integer ticks.
        #[arg(long)]
        target: u64,
    },

    /// Close a rally with an EXIT.
    Exit {
        #[arg(long)]
        rally_id: u16,
        /// target-hit, stop-loss, or manual.
        #[arg(long, default_value = "manual")]
        reason: ExitReason,
    },

    /// Post the settled RESULT of a rally.
    Result {
        #[arg(long)]
        rally_id: u16,
        /// win or loss.
        #[arg(long)]
        outcome: RallyOutcome,
        /// Unsigned pnl magnitude in lamports; the sign is the outcome.
        #[arg(long)]
        pnl: u64,
    },

    /// Read the current room window.
    Read {
        #[arg(long, default_value_t = chum_protocol::constants::DEFAULT_MESSAGE_LIMIT)]
        limit: usize,
        /// Emit the raw message list as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read the room and print aggregate stats.
    Stats {
        #[arg(long, default_value_t = chum_protocol::constants::DEFAULT_MESSAGE_LIMIT)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },

    /// Run as a whale-watch daemon: post a randomized WHALE_MOVE alpha on
    /// an interval, sometimes followed by a SIGNAL.
    Run {
        /// Seconds between posts.
        #[arg(long, env = "CHUM_POLL_INTERVAL", default_value_t = 30)]
        interval: u64,
        /// Lower bound of the simulated whale size, in SOL.
        #[arg(long, env = "CHUM_WHALE_MIN_SOL", default_value_t = 500)]
        min_sol: u64,
    },
}
