pub mod game;
pub mod write;

pub use game::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use thiserror::Error;

pub mod prelude {
    pub use super::{
        game::prelude::*, write::OutputFormat, BlackjackSimulation, BlackjackSimulator,
        BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder, MulStrategyBlackjackSimulator,
        MulStrategyBlackjackSimulatorBuilder, SimulationError, SimulationSummary,
    };
}

/// Message sent from a simulation thread to the collector: a session summary, or `None` once the
/// simulation with the given id is done.
pub type SummaryMessage = (Option<SimulationSummary>, usize);

/// Simple struct for recording all of the interesting data points accumulated during a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub label: String,
    pub sessions: u32,
    pub rounds: u32,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub surrenders: u32,
    pub player_blackjacks: u32,
    pub insurance_bets: u32,
    pub early_endings: u32,
    pub winnings: f64,
    pub wagered: f64,
}

impl SimulationSummary {
    /// Number of settled player hands, split hands count twice.
    pub fn hands(&self) -> u32 {
        self.wins + self.pushes + self.losses + self.surrenders
    }

    fn ratio(&self, n: u32) -> f64 {
        match self.hands() {
            0 => 0.0,
            hands => n as f64 / hands as f64,
        }
    }

    pub fn win_pct(&self) -> f64 {
        self.ratio(self.wins)
    }

    pub fn push_pct(&self) -> f64 {
        self.ratio(self.pushes)
    }

    pub fn loss_pct(&self) -> f64 {
        self.ratio(self.losses)
    }

    pub fn surrender_pct(&self) -> f64 {
        self.ratio(self.surrenders)
    }

    pub fn average_winnings_per_hand(&self) -> f64 {
        match self.hands() {
            0 => 0.0,
            hands => self.winnings / hands as f64,
        }
    }

    /// Net winnings as a fraction of the money wagered.
    pub fn edge(&self) -> f64 {
        if self.wagered > 0.0 {
            self.winnings / self.wagered
        } else {
            0.0
        }
    }

    /// Folds `other` into `self`, keeping this summary's label.
    pub fn merge(&mut self, other: &SimulationSummary) {
        self.sessions += other.sessions;
        self.rounds += other.rounds;
        self.wins += other.wins;
        self.pushes += other.pushes;
        self.losses += other.losses;
        self.surrenders += other.surrenders;
        self.player_blackjacks += other.player_blackjacks;
        self.insurance_bets += other.insurance_bets;
        self.early_endings += other.early_endings;
        self.winnings += other.winnings;
        self.wagered += other.wagered;
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let body = format!(
            "{}{}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n",
            "strategy: ",
            self.label,
            "sessions played",
            self.sessions,
            "rounds played",
            self.rounds,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "hands surrendered",
            self.surrenders,
            "winnings",
            self.winnings,
            "total wagered",
            self.wagered,
            "number of player blackjacks",
            self.player_blackjacks,
            "number of insurance bets",
            self.insurance_bets,
            "number of early endings",
            self.early_endings,
            "total hands played",
            self.hands(),
            "win percentage",
            self.win_pct(),
            "push percentage",
            self.push_pct(),
            "loss percentage",
            self.loss_pct(),
            "surrender percentage",
            self.surrender_pct(),
            "average winnings per hand",
            self.average_winnings_per_hand(),
            "edge",
            self.edge()
        );
        write!(f, "{}", body)
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("game error: {0}")]
    Game(#[from] CounterError),
    #[error("table error: {0}")]
    Table(String),
    #[error("shoe error: {0}")]
    Shoe(String),
    #[error("sending error: {0}")]
    Sending(String),
    #[error("write error: {0}")]
    Write(#[from] std::io::Error),
}

pub trait BlackjackSimulation: Send {
    /// Required method, the method that will be called to run all simulations.
    fn run(&mut self) -> Result<(), SimulationError>;
    /// Required method, the method that will be called to run a single simulation.
    fn run_single_simulation(&mut self) -> Result<(), SimulationError>;
    /// Required method, the method that will display the stats recorded for a given simulation.
    fn display_stats(&self);
    /// Required method, the method that will reset the simulation
    fn reset(&mut self);
    /// Required method, the method for producing output statistics/data recorded during the simulation
    fn summary(&self) -> SimulationSummary;
}

/// Runs a number of sessions for a single player and accumulates their tallies.
/// A `BlackjackSimulator`'s main purpose is convenience: it wraps the shoe, table and session so the caller only
/// chooses a player and the house parameters such as the number of decks, the cut depth and the table rules.
pub struct BlackjackSimulator<P: Player> {
    game: BlackjackGameSim<P>,
    num_simulations: u32,
    summary: SimulationSummary,
    silent: bool,
}

impl<P: Player> BlackjackSimulator<P> {
    pub fn new(player: P, config: &BlackjackSimulatorConfig) -> Result<Self, SimulationError> {
        let shoe = Shoe::new(config.num_decks, config.decks_cut, config.seed)?;
        let table = BlackjackTableSim::new(shoe, config.rules());
        let game = BlackjackGameSim::new(table, player, config.rounds_per_simulation);
        let summary = SimulationSummary {
            label: game.label(),
            ..SimulationSummary::default()
        };
        Ok(BlackjackSimulator {
            game,
            num_simulations: config.num_simulations,
            summary,
            silent: config.silent,
        })
    }

    fn record(&mut self) {
        let game = &self.game;
        self.summary.sessions += 1;
        self.summary.rounds += game.rounds_played;
        self.summary.wins += game.total_wins;
        self.summary.pushes += game.total_pushes;
        self.summary.losses += game.total_losses;
        self.summary.surrenders += game.total_surrenders;
        self.summary.player_blackjacks += game.num_player_blackjacks;
        self.summary.insurance_bets += game.num_insurance_bets;
        self.summary.winnings += game.total_winnings;
        self.summary.wagered += game.total_wagered;
        if game.ended_early {
            self.summary.early_endings += 1;
        }
    }
}

impl<P: Player + Send> BlackjackSimulation for BlackjackSimulator<P> {
    /// Runs every session, restoring the bankrole between them.
    fn run(&mut self) -> Result<(), SimulationError> {
        for i in 0..self.num_simulations {
            self.game.run()?;
            self.record();
            if !self.silent {
                println!("simulation #{}", i + 1);
                self.game.display_stats(&mut std::io::stdout())?;
            }
            self.game.reset();
        }
        Ok(())
    }

    /// Runs one session. Neither the session nor the accumulated summary is reset afterwards.
    fn run_single_simulation(&mut self) -> Result<(), SimulationError> {
        self.game.run()?;
        self.record();
        if !self.silent {
            self.game.display_stats(&mut std::io::stdout())?;
        }
        Ok(())
    }

    fn display_stats(&self) {
        const WIDTH: usize = 80;
        println!("{}", "-".repeat(WIDTH));
        println!(
            "{:-^WIDTH$}",
            format!("running {} simulations", self.num_simulations)
        );
        print!("{}", self.summary);
        println!("{}", "-".repeat(WIDTH));
    }

    /// Clears the accumulated summary and restores the starting bankrole.
    fn reset(&mut self) {
        self.game.reset();
        self.summary = SimulationSummary {
            label: self.game.label(),
            ..SimulationSummary::default()
        };
    }

    fn summary(&self) -> SimulationSummary {
        self.summary.clone()
    }
}

/// Tests several players under one configuration. Each player gets its own shoe and table and runs on its
/// own thread, summaries are sent over a channel to a single collector.
pub struct MulStrategyBlackjackSimulator {
    simulations: Vec<Box<dyn BlackjackSimulation>>,
    pub config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulator {
    /// Method that returns a new `MulStrategyBlackjackSimulatorBuilder` object.
    pub fn new(config: BlackjackSimulatorConfig) -> MulStrategyBlackjackSimulatorBuilder {
        MulStrategyBlackjackSimulatorBuilder {
            simulations: Vec::new(),
            config,
            error: None,
        }
    }

    pub fn simulations(&self) -> &[Box<dyn BlackjackSimulation>] {
        &self.simulations
    }

    /// Adds a simulation for `player` using the simulator's configuration.
    pub fn add_simulation<P: Player + Send + 'static>(&mut self, player: P) -> Result<(), SimulationError> {
        let simulation = BlackjackSimulator::new(player, &self.config)?;
        self.simulations.push(Box::new(simulation));
        Ok(())
    }

    /// Runs every simulation and writes the collected summaries to `out`.
    pub fn run(
        &mut self,
        out: Box<dyn Write + Send + 'static>,
        format: write::OutputFormat,
    ) -> Result<(), SimulationError> {
        self.run_with(move |receiver, ids| write::write_summaries(receiver, ids, out, format))
    }

    /// Runs every simulation, one thread each, while `collect` consumes the summaries on a thread of its own.
    /// Each simulation sends one summary per session and a final `None` tagged with its id. The simulations
    /// are consumed, the simulator is empty afterwards.
    pub fn run_with<F, T>(&mut self, collect: F) -> Result<T, SimulationError>
    where
        F: FnOnce(Receiver<SummaryMessage>, HashSet<usize>) -> Result<T, SimulationError> + Send + 'static,
        T: Send + 'static,
    {
        if self.simulations.is_empty() {
            return Err(SimulationError::Table(
                "no simulations have been added".to_string(),
            ));
        }

        let (write_sender, write_receiver) = mpsc::channel::<SummaryMessage>();
        let ids: HashSet<usize> = (1..=self.simulations.len()).collect();
        let write_handle = thread::spawn(move || collect(write_receiver, ids));

        let mut handles = vec![];
        let num_simulations = self.config.num_simulations;
        for (i, mut simulation) in self.simulations.drain(..).enumerate() {
            let id = i + 1;
            let sender = write_sender.clone();
            let handle = thread::spawn(move || -> Result<(), SimulationError> {
                for _ in 0..num_simulations {
                    simulation.run_single_simulation()?;
                    // each message carries one session, the collector adds them up
                    let summary = simulation.summary();
                    sender
                        .send((Some(summary), id))
                        .map_err(|e| SimulationError::Sending(e.to_string()))?;
                    simulation.reset();
                }
                sender
                    .send((None, id))
                    .map_err(|e| SimulationError::Sending(e.to_string()))
            });
            handles.push(handle);
        }
        // only the simulation threads hold senders now, the collector sees a closed channel if they all fail
        drop(write_sender);

        let mut result = Ok(());
        for (i, handle) in handles.into_iter().enumerate() {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(SimulationError::Table(format!("simulation #{} panicked", i + 1))));
            if let Err(e) = outcome {
                log::error!("error occured for simulation #{}: {}", i + 1, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        let collected = write_handle
            .join()
            .unwrap_or_else(|_| Err(SimulationError::Sending("collector panicked".to_string())));
        result?;
        collected
    }
}

/// Struct for building a `MulStrategyBlackjackSimulator` object
pub struct MulStrategyBlackjackSimulatorBuilder {
    simulations: Vec<Box<dyn BlackjackSimulation>>,
    config: BlackjackSimulatorConfig,
    error: Option<SimulationError>,
}

impl MulStrategyBlackjackSimulatorBuilder {
    /// Adds a simulation for `player`, the rest of its configuration comes from the `BlackjackSimulatorConfig`
    /// the builder was created with.
    pub fn simulation<P: Player + Send + 'static>(&mut self, player: P) -> &mut Self {
        if self.error.is_none() {
            match BlackjackSimulator::new(player, &self.config) {
                Ok(simulation) => self.simulations.push(Box::new(simulation)),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Builds the simulator, failing with the first error met while adding simulations.
    pub fn build(&mut self) -> Result<MulStrategyBlackjackSimulator, SimulationError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        Ok(MulStrategyBlackjackSimulator {
            simulations: std::mem::take(&mut self.simulations),
            config: self.config,
        })
    }
}

/// Struct for configuring a `BlackjackSimulator`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackjackSimulatorConfig {
    pub num_decks: u32,
    pub decks_cut: f64,
    pub num_simulations: u32,
    pub rounds_per_simulation: u32,
    pub seed: Option<u64>,
    pub silent: bool,
    pub surrender: bool,
    pub insurance: bool,
    pub soft_seventeen: bool,
    pub blackjack_payout: f64,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder` object. Allows customization of the
    /// house parameters of the simulation such as the number of decks, the cut depth and the number of sessions.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder {
            num_decks: None,
            decks_cut: None,
            num_simulations: None,
            rounds_per_simulation: None,
            seed: None,
            silent: None,
            surrender: None,
            insurance: None,
            soft_seventeen: None,
            blackjack_payout: None,
        }
    }

    pub fn rules(&self) -> TableRules {
        TableRules {
            surrender: self.surrender,
            insurance: self.insurance,
            hit_soft_seventeen: self.soft_seventeen,
            blackjack_payout: self.blackjack_payout,
        }
    }
}

impl Default for BlackjackSimulatorConfig {
    /// Returns the standard configurations for a game of blackjack.
    fn default() -> Self {
        BlackjackSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BlackjackSimulatorConfig`
#[derive(Debug, Clone, Copy)]
pub struct BlackjackSimulatorConfigBuilder {
    num_decks: Option<u32>,
    decks_cut: Option<f64>,
    num_simulations: Option<u32>,
    rounds_per_simulation: Option<u32>,
    seed: Option<u64>,
    silent: Option<bool>,
    surrender: Option<bool>,
    insurance: Option<bool>,
    soft_seventeen: Option<bool>,
    blackjack_payout: Option<f64>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Method for choosing the number of decks used in the game
    pub fn num_decks(&mut self, decks: u32) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    /// Method for setting how many decks sit behind the cut card, a quarter of the shoe when not set
    pub fn decks_cut(&mut self, decks: f64) -> &mut Self {
        self.decks_cut = Some(decks);
        self
    }

    /// Method for setting the number of sessions each player plays.
    pub fn num_simulations(&mut self, n: u32) -> &mut Self {
        self.num_simulations = Some(n);
        self
    }

    /// Method for setting the maximum number of rounds played in each session
    pub fn rounds_per_simulation(&mut self, rounds: u32) -> &mut Self {
        self.rounds_per_simulation = Some(rounds);
        self
    }

    /// Method for seeding the shoe, every player then sees the same sequence of shuffles
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Method for setting a boolean flag, if set to false each session prints its stats as it finishes
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = Some(silent);
        self
    }

    /// Method for setting a flag that determines if the game allows surrender or not
    pub fn surrender(&mut self, surrender: bool) -> &mut Self {
        self.surrender = Some(surrender);
        self
    }

    /// Method for setting the flag that determines if insurance is offered when the dealer shows an ace
    pub fn insurance(&mut self, insurance: bool) -> &mut Self {
        self.insurance = Some(insurance);
        self
    }

    /// Method for setting the flag that determines if the dealer must hit soft seventeens, default is false
    pub fn soft_seventeen(&mut self, seventeen: bool) -> &mut Self {
        self.soft_seventeen = Some(seventeen);
        self
    }

    /// Method for setting what a player blackjack pays per unit bet, default is 1.5
    pub fn blackjack_payout(&mut self, payout: f64) -> &mut Self {
        self.blackjack_payout = Some(payout);
        self
    }

    /// Method for building a `BlackjackSimulatorConfig` object from the given `BlackjackSimulatorConfigBuilder` object.
    pub fn build(&mut self) -> BlackjackSimulatorConfig {
        let num_decks = self.num_decks.unwrap_or(6);
        BlackjackSimulatorConfig {
            num_decks,
            decks_cut: self.decks_cut.unwrap_or_else(|| Shoe::default_cut(num_decks)),
            num_simulations: self.num_simulations.unwrap_or(100),
            rounds_per_simulation: self.rounds_per_simulation.unwrap_or(1000),
            seed: self.seed,
            silent: self.silent.unwrap_or(true),
            surrender: self.surrender.unwrap_or(true),
            insurance: self.insurance.unwrap_or(true),
            soft_seventeen: self.soft_seventeen.unwrap_or(false),
            blackjack_payout: self.blackjack_payout.unwrap_or(1.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn small_config() -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig::new()
            .num_simulations(4)
            .rounds_per_simulation(200)
            .seed(17)
            .build()
    }

    #[test]
    fn simple_simulation_test() {
        let config = small_config();
        let counter = Counter::new(&StrategyConfig::default());
        let mut simulator = BlackjackSimulator::new(counter, &config).unwrap();
        simulator.run().unwrap();

        let summary = simulator.summary();
        assert_eq!(summary.label, "counter");
        assert_eq!(summary.sessions, 4);
        assert!(summary.rounds > 0 && summary.rounds <= 800);
        assert!(summary.hands() >= summary.rounds);
        assert!(summary.wagered > 0.0);
        simulator.display_stats();

        simulator.reset();
        assert_eq!(simulator.summary().sessions, 0);
    }

    #[test]
    fn seeded_simulations_repeat() {
        let config = small_config();
        let run = || {
            let basic = BasicPlayer::new(&StrategyConfig::default());
            let mut simulator = BlackjackSimulator::new(basic, &config).unwrap();
            simulator.run().unwrap();
            simulator.summary()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn bad_shoe_is_rejected() {
        let config = BlackjackSimulatorConfig::new().num_decks(1).decks_cut(2.0).build();
        let basic = BasicPlayer::new(&StrategyConfig::default());
        assert!(matches!(
            BlackjackSimulator::new(basic, &config),
            Err(SimulationError::Shoe(_))
        ));
        let result = MulStrategyBlackjackSimulator::new(config)
            .simulation(BasicPlayer::new(&StrategyConfig::default()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn single_deck_uses_a_fitting_cut() {
        let config = BlackjackSimulatorConfig::new()
            .num_decks(1)
            .num_simulations(2)
            .rounds_per_simulation(100)
            .seed(3)
            .build();
        assert_eq!(config.decks_cut, 0.25);
        let mut simulator = BlackjackSimulator::new(Counter::new(&StrategyConfig::default()), &config).unwrap();
        simulator.run().unwrap();
        assert_eq!(simulator.summary().sessions, 2);
    }

    #[test]
    fn run_multiple_simulations() {
        let strategy = StrategyConfig::default();
        let mut simulator = MulStrategyBlackjackSimulator::new(small_config())
            .simulation(Counter::new(&strategy))
            .simulation(BasicPlayer::new(&strategy))
            .simulation(RandomPlayer::new(&strategy, Some(1)))
            .build()
            .unwrap();

        let summaries: BTreeMap<usize, SimulationSummary> =
            simulator.run_with(write::collect_summaries).unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[&1].label, "counter");
        assert_eq!(summaries[&2].label, "basic strategy");
        assert_eq!(summaries[&3].label, "random");
        for summary in summaries.values() {
            assert_eq!(summary.sessions, 4);
        }
        assert!(simulator.simulations().is_empty());
    }

    #[test]
    fn empty_simulator_fails() {
        let mut simulator = MulStrategyBlackjackSimulator::new(small_config()).build().unwrap();
        assert!(simulator.run(Box::new(std::io::sink()), write::OutputFormat::Text).is_err());
    }

    #[test]
    fn summary_merge_and_percentages() {
        let mut a = SimulationSummary {
            label: String::from("a"),
            sessions: 1,
            wins: 3,
            losses: 1,
            winnings: 20.0,
            wagered: 40.0,
            ..SimulationSummary::default()
        };
        let b = SimulationSummary {
            label: String::from("b"),
            sessions: 1,
            pushes: 2,
            losses: 1,
            surrenders: 1,
            winnings: -10.0,
            wagered: 40.0,
            ..SimulationSummary::default()
        };
        a.merge(&b);
        assert_eq!(a.label, "a");
        assert_eq!(a.sessions, 2);
        assert_eq!(a.hands(), 8);
        assert_eq!(a.win_pct(), 3.0 / 8.0);
        assert_eq!(a.average_winnings_per_hand(), 10.0 / 8.0);
        assert_eq!(a.edge(), 10.0 / 80.0);
        assert!(a.to_string().contains("hands surrendered"));
        assert_eq!(SimulationSummary::default().win_pct(), 0.0);
    }
}
