use clap::{Parser, ValueEnum};
use counter_sim::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    /// Counts cards, bets on the true count and deviates from basic strategy
    Counter,
    /// Basic strategy at a true count of zero with a flat minimum bet
    Basic,
    /// Flips a coin for every decision
    Random,
}

/// Simulates card counting players against a blackjack shoe.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON strategy file, the built-in Hi-Lo tables are used when omitted
    #[arg(short, long)]
    strategy: Option<PathBuf>,

    /// Players to simulate, each one runs on its own thread
    #[arg(short, long = "player", value_enum, default_values_t = [PlayerKind::Counter, PlayerKind::Basic])]
    players: Vec<PlayerKind>,

    #[arg(short, long, default_value_t = 6)]
    decks: u32,

    /// Decks behind the cut card, a quarter of the shoe by default
    #[arg(short, long)]
    cut: Option<f64>,

    /// Sessions per player
    #[arg(short = 'n', long, default_value_t = 100)]
    simulations: u32,

    /// Most rounds in a session
    #[arg(short, long, default_value_t = 1000)]
    rounds: u32,

    /// Seeds the shoe, every player then sees the same cards
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    hit_soft_seventeen: bool,

    #[arg(long)]
    no_surrender: bool,

    #[arg(long)]
    no_insurance: bool,

    #[arg(long, default_value_t = 1.5)]
    blackjack_payout: f64,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the summaries here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every session's stats as it finishes
    #[arg(short, long)]
    verbose: bool,

    /// Print the strategy as JSON and exit
    #[arg(long)]
    dump_strategy: bool,
}

fn run(cli: Cli) -> Result<(), SimulationError> {
    let strategy = match cli.strategy.as_ref() {
        Some(path) => StrategyConfig::from_path(path)?,
        None => StrategyConfig::default(),
    };

    if cli.dump_strategy {
        println!("{}", strategy.to_json_pretty()?);
        return Ok(());
    }

    let mut builder = BlackjackSimulatorConfig::new();
    builder
        .num_decks(cli.decks)
        .num_simulations(cli.simulations)
        .rounds_per_simulation(cli.rounds)
        .silent(!cli.verbose)
        .surrender(!cli.no_surrender)
        .insurance(!cli.no_insurance)
        .soft_seventeen(cli.hit_soft_seventeen)
        .blackjack_payout(cli.blackjack_payout);
    if let Some(cut) = cli.cut {
        builder.decks_cut(cut);
    }
    if let Some(seed) = cli.seed {
        builder.seed(seed);
    }
    let config = builder.build();
    log::info!("running {} players with {:?}", cli.players.len(), config);

    let mut simulator = MulStrategyBlackjackSimulator::new(config).build()?;
    for (i, kind) in cli.players.iter().enumerate() {
        match kind {
            PlayerKind::Counter => simulator.add_simulation(Counter::new(&strategy))?,
            PlayerKind::Basic => simulator.add_simulation(BasicPlayer::new(&strategy))?,
            PlayerKind::Random => {
                simulator.add_simulation(RandomPlayer::new(&strategy, cli.seed.map(|s| s.wrapping_add(i as u64))))?
            }
        }
    }

    let out: Box<dyn Write + Send> = match cli.output.as_ref() {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    simulator.run(out, cli.format)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
