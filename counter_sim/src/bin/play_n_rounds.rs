use clap::Parser;
use counter_sim::prelude::*;
use std::path::PathBuf;

/// Plays a counter through a number of rounds at one table, printing every round.
#[derive(Debug, Parser)]
struct Args {
    rounds: u32,

    #[arg(short, long)]
    strategy: Option<PathBuf>,

    #[arg(short, long, default_value_t = 6)]
    decks: u32,

    /// Decks behind the cut card, a quarter of the shoe by default
    #[arg(short, long)]
    cut: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,
}

fn play(args: Args) -> Result<(), SimulationError> {
    let strategy = match args.strategy.as_ref() {
        Some(path) => StrategyConfig::from_path(path)?,
        None => StrategyConfig::default(),
    };
    let cut = args.cut.unwrap_or_else(|| Shoe::default_cut(args.decks));
    let shoe = Shoe::new(args.decks, cut, args.seed)?;
    let table = BlackjackTableSim::new(shoe, TableRules::default());
    let mut game = BlackjackGameSim::new(table, Counter::new(&strategy), args.rounds);

    game.new_shoe();
    for round in 1..=args.rounds {
        let log = match game.play_round()? {
            Some(log) => log,
            None => {
                println!("out of money after {} rounds", round - 1);
                break;
            }
        };
        println!("round #{round}");
        println!("{log}");
        println!("{}", game.player());
        println!();
    }

    game.display_stats(&mut io::stdout())?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = play(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
