//! SteamReels command-line front-end
//!
//! Usage:
//!   steamreels spin --count 5        - Spin the live engine
//!   steamreels simulate --spins N    - Monte Carlo statistics
//!   steamreels validate              - Theoretical vs simulated win rate
//!   steamreels report                - Full probability report
//!   steamreels streaks               - Win/loss streak analysis
//!   steamreels optimize --target 95  - Tune rarities towards an RTP
//!   steamreels battle --rounds 50    - Play the boss campaign
//!   steamreels config                - Print the active configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sr_sim::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_TARGET_RTP, DEFAULT_TOLERANCE, ProbabilityModel, REPORT_SPINS, RtpOptimizer,
    SimulationScope, Simulator, analyze_win_frequency, generate_probability_report, validate_calculations,
};
use sr_slot::{BattleSession, BattleStatus, BossAttack, GRID_ROWS, SlotConfig, SlotEngine, SlotError, SpinResult};

#[derive(Parser)]
#[command(name = "steamreels", about = "SteamReels slot engine and balancing tools")]
struct Cli {
    /// JSON or YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the live engine
    Spin {
        #[arg(short, long, default_value_t = 1)]
        count: u32,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Simulate spins and aggregate statistics
    Simulate {
        #[arg(short = 'n', long, default_value_t = 10_000)]
        spins: u64,
        #[arg(short, long)]
        seed: Option<u64>,
        /// Scan every live payline instead of rows, columns and diagonals
        #[arg(long)]
        live_paylines: bool,
    },
    /// Compare theoretical and simulated win rate
    Validate {
        #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Full probability report
    Report {
        #[arg(short = 'n', long, default_value_t = REPORT_SPINS)]
        spins: u64,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Win/loss streak analysis
    Streaks {
        #[arg(short = 'n', long, default_value_t = 10_000)]
        spins: u64,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Tune symbol rarities towards a target RTP
    Optimize {
        #[arg(short, long, default_value_t = DEFAULT_TARGET_RTP)]
        target: f64,
        #[arg(short, long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        iterations: u32,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Play the boss campaign
    Battle {
        #[arg(short, long, default_value_t = 50)]
        rounds: u32,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Print the active configuration as JSON
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Spin { count, seed } => run_spins(config, count, seed, json),
        Commands::Simulate {
            spins,
            seed,
            live_paylines,
        } => run_simulation(config, spins, seed, live_paylines, json),
        Commands::Validate { tolerance, seed } => run_validation(config, tolerance, seed, json),
        Commands::Report { spins, seed } => run_report(config, spins, seed),
        Commands::Streaks { spins, seed } => run_streaks(config, spins, seed, json),
        Commands::Optimize {
            target,
            iterations,
            seed,
        } => run_optimizer(config, target, iterations, seed, json),
        Commands::Battle { rounds, seed } => run_battle(config, rounds, seed, json),
        Commands::Config => print_json(&config),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<SlotConfig> {
    match path {
        Some(path) => SlotConfig::load(path).with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SlotConfig::standard()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn simulator(config: SlotConfig, seed: Option<u64>) -> Simulator {
    let sim = Simulator::new(config);
    match seed {
        Some(seed) => sim.with_seed(seed),
        None => sim,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

fn run_spins(config: SlotConfig, count: u32, seed: Option<u64>, json: bool) -> Result<()> {
    let mut engine = SlotEngine::try_with_config(config).context("Invalid configuration")?;
    if let Some(seed) = seed {
        engine.seed(seed);
    }

    let results: Vec<SpinResult> = (0..count).map(|_| engine.spin()).collect();
    if json {
        return print_json(&results);
    }

    for (i, result) in results.iter().enumerate() {
        println!("Spin {}", i + 1);
        print_spin(result);
    }
    let stats = engine.stats();
    println!(
        "{} spins, hit rate {:.1}%, total damage {}",
        stats.total_spins,
        stats.hit_rate(),
        stats.total_damage
    );
    Ok(())
}

fn print_spin(result: &SpinResult) {
    for row in 0..GRID_ROWS {
        let names: Vec<String> = result.grid.row(row).iter().map(|s| format!("{:<8}", s.name)).collect();
        println!("  {}", names.join(" "));
    }
    for win in &result.wins {
        println!(
            "  {:?} line {}: {} x{} → {} damage",
            win.line.kind, win.line.index, win.symbol.name, win.length, win.damage
        );
    }
    println!(
        "  damage {} (x{:.1}, combo {}), jackpot {}{}",
        result.total_damage,
        result.multiplier,
        result.combo_count,
        result.jackpot_progress,
        if result.is_jackpot { " JACKPOT" } else { "" }
    );
}

fn run_battle(config: SlotConfig, rounds: u32, seed: Option<u64>, json: bool) -> Result<()> {
    let engine = SlotEngine::try_with_config(config).context("Invalid configuration")?;
    let mut session = BattleSession::with_engine(engine);
    if let Some(seed) = seed {
        session.seed(seed);
    }

    let mut reports = Vec::new();
    for round in 1..=rounds {
        let report = match session.play_round() {
            Ok(report) => report,
            Err(SlotError::InsufficientFunds { bet, score }) => {
                log::info!("Out of funds: bet {bet}, score {score}");
                break;
            }
            Err(SlotError::BattleOver) => break,
            Err(e) => return Err(e).context("Battle round failed"),
        };

        if !json {
            let attack = match report.boss_attack {
                Some(BossAttack::Hit { damage }) => format!("boss hits for {damage}"),
                Some(BossAttack::Blocked) => "attack blocked".to_string(),
                None => "no attack".to_string(),
            };
            println!(
                "Round {round:>3}: dealt {:>3}, {attack}, HP {}/{}, score {}, free spins {}",
                report.damage_dealt,
                session.player_health(),
                session.max_health(),
                session.score(),
                session.free_spins()
            );
            for bonus in &report.power_ups {
                println!("           power-up: {}", bonus.name);
            }
            if let Some(boss) = &report.boss_defeated {
                println!("           {boss} defeated!");
            }
        }

        let finished = report.status != BattleStatus::InProgress;
        reports.push(report);
        if finished {
            break;
        }
    }

    if json {
        return print_json(&reports);
    }
    println!(
        "Status {:?} in {} (world {}), boss {} {}/{}",
        session.status(),
        session.current_world().name,
        session.world_index() + 1,
        session.current_boss().name,
        session.current_boss().health,
        session.current_boss().max_health
    );
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANALYSIS
// ═══════════════════════════════════════════════════════════════════════════════

fn run_simulation(config: SlotConfig, spins: u64, seed: Option<u64>, live_paylines: bool, json: bool) -> Result<()> {
    let scope = if live_paylines {
        SimulationScope::Live
    } else {
        SimulationScope::Reduced
    };
    let sim = simulator(config, seed).with_scope(scope);
    let results = sim.simulate_spins(spins);
    if json {
        return print_json(&*results);
    }

    println!("{} spins over {} lines", results.total_spins, sim.paylines().len());
    println!("  win rate            {:.4}", results.win_rate);
    println!("  average damage      {:.3}", results.average_damage);
    println!("  damage per win      {:.3}", results.average_damage_per_win);
    for (symbol, rate) in &results.symbol_win_rates {
        println!("  {symbol:<8} wins/spin {rate:.5}");
    }
    for (length, share) in &results.match_length_distribution {
        println!("  length {length}: {share:.4} per winning spin");
    }
    Ok(())
}

fn run_validation(config: SlotConfig, tolerance: f64, seed: Option<u64>, json: bool) -> Result<()> {
    let model = ProbabilityModel::from_config(&config);
    let report = validate_calculations(&model, &simulator(config, seed), tolerance);
    if json {
        return print_json(&report);
    }
    println!(
        "theoretical {:.4}, simulated {:.4}, difference {:.4} (tolerance {})",
        report.theoretical_win_rate, report.simulated_win_rate, report.difference, report.tolerance
    );
    println!("{}", report.message);
    Ok(())
}

fn run_report(config: SlotConfig, spins: u64, seed: Option<u64>) -> Result<()> {
    let model = ProbabilityModel::from_config(&config);
    let report = generate_probability_report(&model, &simulator(config, seed), spins);
    print_json(&report)
}

fn run_streaks(config: SlotConfig, spins: u64, seed: Option<u64>, json: bool) -> Result<()> {
    let analysis = analyze_win_frequency(&simulator(config, seed), spins);
    if json {
        return print_json(&analysis);
    }
    println!(
        "max wins in a row {}, max losses in a row {}",
        analysis.max_consecutive_wins, analysis.max_consecutive_losses
    );
    println!(
        "average win streak {:.2}, average loss streak {:.2}",
        analysis.average_win_streak, analysis.average_loss_streak
    );
    Ok(())
}

fn run_optimizer(config: SlotConfig, target: f64, iterations: u32, seed: Option<u64>, json: bool) -> Result<()> {
    let model = ProbabilityModel::from_config(&config);
    let optimizer = RtpOptimizer::new(target, iterations);
    let optimizer = match seed {
        Some(seed) => optimizer.with_seed(seed),
        None => optimizer,
    };
    let result = optimizer.optimize(&model);
    if json {
        return print_json(&result);
    }

    println!(
        "RTP {:.2}% → {:.2}% (target {:.2}%) in {} iterations",
        model.default_rtp(),
        result.achieved_rtp,
        result.target_rtp,
        result.iterations
    );
    for symbol in &result.optimized_distribution {
        println!("  {:<8} {:.4}", symbol.name, symbol.rarity);
    }
    Ok(())
}
