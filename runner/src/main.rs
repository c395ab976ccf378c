// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for local bot matches and board inspection
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use nova_engine::lobby::Lobby;
use nova_engine::{setup, TeamId, TileKind};
use nova_net::{HostSession, LoopbackBroker};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nova-runner", about = "Hex territory conquest - local match runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a bot-only match on a loopback transport
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Number of bot players
        #[arg(short, long, default_value_t = 4)]
        bots: usize,
        /// Attacks to resolve before stopping
        #[arg(short, long, default_value_t = 40)]
        turns: u32,
    },
    /// Generate a board and print tile statistics
    Inspect {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value_t = 2)]
        teams: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play { seed, bots, turns } => cmd_play(seed, bots, turns),
        Commands::Inspect { seed, teams } => cmd_inspect(seed, teams),
    }
}

fn cmd_play(seed: u64, bots: usize, turns: u32) {
    println!("=== Nova: hex territory conquest ===\n");
    println!("Running bot match: seed={}, bots={}, turns={}\n", seed, bots, turns);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut host = HostSession::open(LoopbackBroker::new(), &mut rng);
    for _ in 0..bots {
        if host.add_bot().is_none() {
            eprintln!("bot name pool exhausted; continuing with fewer bots");
            break;
        }
    }
    host.set_bot_delay(Duration::ZERO);
    host.start_game("classic", Vec::new(), seed);

    for _ in 0..turns {
        host.tick(Instant::now());
    }

    let Some(game) = host.game() else {
        eprintln!("match never started");
        return;
    };

    println!("Room {} after {} attacks:", host.code(), turns);
    println!("  Active team: {}\n", game.active_team());
    println!("  {:<8} {:>6} {:>8} {:>6} {:>7}", "Team", "Hexes", "Shields", "Cards", "Streak");
    println!("  {}", "-".repeat(40));
    for &team in &game.teams {
        let owned = game.board.owned_by(team);
        let shields: u32 = owned.iter().map(|&hex| game.board.shield(hex) as u32).sum();
        let cards = game.card_state(team);
        println!(
            "  {:<8} {:>6} {:>8} {:>6} {:>7}",
            team.to_string(),
            owned.len(),
            shields,
            cards.hand.len(),
            cards.streak,
        );
    }
}

fn cmd_inspect(seed: u64, teams: usize) {
    let mut lobby = Lobby::new();
    let teams = teams.clamp(1, TeamId::ALL.len());
    for _ in 0..teams * 2 {
        let _ = lobby.add_bot();
    }
    let state = setup::create_initial_state(&lobby, seed);

    println!("Board for {} teams (seed {}): radius {}", teams, seed, state.board.radius);
    println!("  {} hexes total\n", state.board.tiles.len());

    let mut counts: HashMap<TileKind, usize> = HashMap::new();
    for tile in state.board.tiles.values() {
        *counts.entry(tile.kind).or_insert(0) += 1;
    }
    for kind in [
        TileKind::Normal,
        TileKind::Energy,
        TileKind::Unstable,
        TileKind::Relay,
        TileKind::Research,
    ] {
        println!("  {:<10} {:>4}", format!("{:?}", kind), counts.get(&kind).copied().unwrap_or(0));
    }

    println!("\n  Headquarters:");
    for &team in &state.teams {
        for hex in state.board.owned_by(team) {
            println!("    {:<8} {}", team.to_string(), hex);
        }
    }
}
