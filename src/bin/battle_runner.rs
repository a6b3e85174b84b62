//! Headless Battle Runner
//!
//! Builds a battle from a starter roster and a generated wave, records it,
//! and prints either a text summary or the full event log as JSON.

use std::path::PathBuf;

use clap::Parser;
use hex_skirmish::battle::{
    build_battle_state, default_deployment, expand_wave, generate_wave, record_battle, Arena,
    BattleEvent, BattleLog, BattleSetup, CombatUnit, UnitCatalog,
};
use hex_skirmish::core::{BattleConfig, Result, UnitIdAllocator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Headless Battle Runner - simulate one battle and report the outcome
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Simulate a single hex battle and print the result or full log")]
struct Args {
    /// Battle config TOML; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit catalog TOML (built-in catalog if omitted)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Player deployment width in hexes
    #[arg(long)]
    player_width: Option<u32>,

    /// Enemy deployment width in hexes
    #[arg(long)]
    enemy_width: Option<u32>,

    /// Wave number to generate
    #[arg(long)]
    wave: Option<u32>,

    /// Seed for wave generation
    #[arg(long)]
    seed: Option<u64>,

    /// Player roster as comma-separated unit ids
    #[arg(long, default_value = "knight,swordsman,swordsman,archer,wolf", value_delimiter = ',')]
    roster: Vec<String>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Print every event in text mode
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hex_skirmish=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!(error = %e, "Battle runner failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if let Some(width) = args.player_width {
        config.player_width = width;
    }
    if let Some(width) = args.enemy_width {
        config.enemy_width = width;
    }
    if let Some(wave) = args.wave {
        config.wave_number = wave;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.catalog.is_some() {
        config.catalog_path = args.catalog.clone();
    }
    config.validate()?;

    let catalog = match &config.catalog_path {
        Some(path) => UnitCatalog::load(path)?,
        None => UnitCatalog::builtin()?,
    };

    let mut ids = UnitIdAllocator::new();
    let player_units = args
        .roster
        .iter()
        .map(|def_id| -> Result<CombatUnit> {
            let def = catalog.require(def_id.trim())?;
            Ok(CombatUnit::from_def(ids.next_id(), def))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let wave = generate_wave(&catalog, config.wave_number, &mut rng);
    let enemy_units = expand_wave(&catalog, &wave, &mut ids);

    let arena = Arena::new(config.player_width, config.enemy_width);
    let deployment = default_deployment(&player_units, &arena);
    let mut state = build_battle_state(BattleSetup {
        player_units,
        enemy_units,
        deployment,
        player_width: config.player_width,
        enemy_width: config.enemy_width,
    });

    let log = record_battle(&mut state);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&log)?),
        "text" => print_summary(&log, &config, args.verbose),
        other => {
            tracing::warn!(format = other, "Unknown format, defaulting to json");
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
    }
    Ok(())
}

fn print_summary(log: &BattleLog, config: &BattleConfig, verbose: bool) {
    if verbose {
        for event in log.events() {
            println!("  {}", describe(event));
        }
        println!();
    }

    println!("Battle Result");
    println!("=============");
    println!("Winner: {:?}", log.result.winner);
    println!("Ticks: {}", log.total_ticks);
    println!("Events: {}", log.event_count());
    println!("Wave: {} (seed {})", config.wave_number, config.seed);
    println!();
    println!("Surviving allies:");
    for unit in &log.result.surviving_allies {
        println!(
            "  {} {} hp {:.1}/{:.1} lives {}",
            unit.id, unit.profile.def_id, unit.stats.hp, unit.stats.max_hp, unit.lives
        );
    }
    println!("Surviving enemies:");
    for unit in &log.result.surviving_enemies {
        println!(
            "  {} {} hp {:.1}/{:.1} lives {}",
            unit.id, unit.profile.def_id, unit.stats.hp, unit.stats.max_hp, unit.lives
        );
    }
}

fn describe(event: &BattleEvent) -> String {
    match event {
        BattleEvent::UnitMoved { tick, unit_id, from, to, .. } => {
            format!("[{tick}] {unit_id} moves {from} -> {to}")
        }
        BattleEvent::MeleeAttack { tick, attacker_id, target_id, damage, target_hp } => {
            format!("[{tick}] {attacker_id} strikes {target_id} for {damage:.1} ({target_hp:.1} left)")
        }
        BattleEvent::RangedAttack { tick, attacker_id, target_id, damage, target_hp, .. } => {
            format!("[{tick}] {attacker_id} shoots {target_id} for {damage:.1} ({target_hp:.1} left)")
        }
        BattleEvent::UnitDied { tick, unit_id, lives_remaining, .. } => {
            format!("[{tick}] {unit_id} falls ({lives_remaining} lives left)")
        }
        BattleEvent::Reinforcement { tick, unit_id, side, hex } => {
            format!("[{tick}] {unit_id} reinforces {side:?} at {hex}")
        }
        BattleEvent::BattleEnd { tick, winner } => format!("[{tick}] battle over, {winner:?} wins"),
    }
}
