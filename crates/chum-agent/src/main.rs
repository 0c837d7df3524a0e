mod config;
mod identity;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use rand::Rng;
use solana_sdk::{native_token::LAMPORTS_PER_SOL, signature::Keypair};

use chum_client::SolanaLedger;
use chum_protocol::codec::{
    encode_alpha, encode_exit, encode_rally, encode_result, encode_signal, parse_mint,
};
use chum_protocol::constants::{token_by_symbol, KNOWN_TOKENS};
use chum_protocol::payload::{AlphaKind, Direction};
use chum_room::{room_stats, RoomScanner};

use config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chum_agent=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Alpha {
            subtype,
            mint,
            amount,
        } => {
            let bytes = encode_alpha(cli.agent_id, *subtype, &resolve_mint(mint)?, *amount);
            post(&cli, &bytes).await
        }
        Command::Signal {
            mint,
            direction,
            confidence,
        } => {
            let bytes =
                encode_signal(cli.agent_id, &resolve_mint(mint)?, *direction, *confidence);
            post(&cli, &bytes).await
        }
        Command::Rally {
            rally_id,
            mint,
            action,
            entry,
            target,
        } => {
            let bytes = encode_rally(
                cli.agent_id,
                *rally_id,
                &resolve_mint(mint)?,
                *action,
                *entry,
                *target,
            );
            post(&cli, &bytes).await
        }
        Command::Exit { rally_id, reason } => {
            let bytes = encode_exit(cli.agent_id, *rally_id, *reason);
            post(&cli, &bytes).await
        }
        Command::Result {
            rally_id,
            outcome,
            pnl,
        } => {
            let bytes = encode_result(cli.agent_id, *rally_id, *outcome, *pnl);
            post(&cli, &bytes).await
        }
        Command::Read { limit, json } => read(&cli, *limit, *json).await,
        Command::Stats { limit, json } => stats(&cli, *limit, *json).await,
        Command::Run { interval, min_sol } => run_daemon(&cli, *interval, *min_sol).await,
    }
}

/// Resolve a mint argument: known symbol first, then base58/hex address.
fn resolve_mint(s: &str) -> anyhow::Result<[u8; 32]> {
    let addr = token_by_symbol(s).unwrap_or(s);
    Ok(parse_mint(addr)?)
}

async fn post(cli: &Cli, bytes: &[u8]) -> anyhow::Result<()> {
    let keypair = identity::load_keypair(&cli.keypair_path)?;
    let ledger = SolanaLedger::new(&cli.rpc_url);
    let sig = ledger.submit_note(&keypair, bytes).await?;
    println!("{sig}");
    Ok(())
}

// ============================================================================
// Consumer commands
// ============================================================================

async fn read(cli: &Cli, limit: usize, json: bool) -> anyhow::Result<()> {
    let scanner = RoomScanner::new(SolanaLedger::new(&cli.rpc_url));
    let messages = scanner.read_messages(limit).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    for msg in &messages {
        println!(
            "{:<14} {:<12} {:<11} {}",
            msg.msg_type.to_string(),
            msg.agent_name,
            fmt_age(msg.block_time),
            msg.summary(),
        );
    }
    Ok(())
}

async fn stats(cli: &Cli, limit: usize, json: bool) -> anyhow::Result<()> {
    let scanner = RoomScanner::new(SolanaLedger::new(&cli.rpc_url));
    let messages = scanner.read_messages(limit).await;
    let stats = room_stats(&messages);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!(
        "{} messages from {} agents",
        stats.total_messages, stats.unique_agents
    );
    println!();
    println!("Open rallies: {}", stats.active_rallies.len());
    for rally in &stats.active_rallies {
        println!(
            "  #{:<5} {} {}  entry {}  target {}",
            rally.rally_id,
            rally.action,
            chum_protocol::message::truncate_address(&rally.token_mint),
            rally.entry_price,
            rally.target_price,
        );
    }
    println!();
    println!("Agents:");
    for agent in &stats.agent_list {
        println!(
            "  {:<12} {:>3} msgs  last seen {}",
            chum_protocol::message::truncate_address(&agent.address),
            agent.message_count,
            fmt_age(Some(agent.last_seen)),
        );
    }
    Ok(())
}

fn fmt_age(block_time: Option<i64>) -> String {
    let Some(t) = block_time.filter(|t| *t > 0) else {
        return "unknown".to_string();
    };
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let diff = (now - t).max(0);
    match diff {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", diff / 60),
        3600..=86399 => format!("{}h ago", diff / 3600),
        _ => format!("{}d ago", diff / 86400),
    }
}

// ============================================================================
// Whale-watch daemon
// ============================================================================

/// One tick's worth of randomized decisions, drawn before any I/O.
struct TickPlan {
    symbol: &'static str,
    mint: [u8; 32],
    lamports: u64,
    sol: u64,
    signal: Option<(Direction, u8)>,
}

fn plan_tick(min_sol: u64) -> anyhow::Result<TickPlan> {
    let mut rng = rand::thread_rng();
    let (symbol, addr) = KNOWN_TOKENS[rng.gen_range(0..KNOWN_TOKENS.len())];
    let sol = rng.gen_range(min_sol..=min_sol.saturating_mul(10).max(min_sol.saturating_add(1)));
    let signal = if rng.gen_bool(0.4) {
        let direction = if rng.gen_bool(0.7) {
            Direction::Buy
        } else {
            Direction::Sell
        };
        Some((direction, rng.gen_range(70..=95)))
    } else {
        None
    };
    Ok(TickPlan {
        symbol,
        mint: parse_mint(addr)?,
        lamports: sol.saturating_mul(LAMPORTS_PER_SOL),
        sol,
        signal,
    })
}

async fn run_daemon(cli: &Cli, interval: u64, min_sol: u64) -> anyhow::Result<()> {
    let keypair = identity::load_keypair(&cli.keypair_path)?;
    let ledger = SolanaLedger::new(&cli.rpc_url);

    tracing::info!(
        agent_id = cli.agent_id,
        interval_secs = interval,
        min_sol,
        "Whale-watch daemon starting",
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    loop {
        ticker.tick().await;
        if let Err(e) = tick(&ledger, &keypair, cli.agent_id, min_sol).await {
            tracing::error!(error = %e, "Tick failed");
        }
    }
}

async fn tick(
    ledger: &SolanaLedger,
    keypair: &Keypair,
    agent_id: u16,
    min_sol: u64,
) -> anyhow::Result<()> {
    let plan = plan_tick(min_sol)?;

    let alpha = encode_alpha(agent_id, AlphaKind::WhaleMove, &plan.mint, Some(plan.lamports));
    ledger.submit_note(keypair, &alpha).await?;
    tracing::info!(token = plan.symbol, sol = plan.sol, "ALPHA WHALE_MOVE posted");

    if let Some((direction, confidence)) = plan.signal {
        let signal = encode_signal(agent_id, &plan.mint, direction, Some(confidence));
        ledger.submit_note(keypair, &signal).await?;
        tracing::info!(
            token = plan.symbol,
            direction = %direction,
            confidence,
            "SIGNAL posted",
        );
    }
    Ok(())
}
