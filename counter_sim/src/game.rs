//! Module that focuses on the simulation of a single session of blackjack. In other words,
//! this module provides everything needed to play one player through a run of rounds at one table.

pub mod player;
pub mod shoe;
pub mod table;
pub mod prelude {
    pub use super::BlackjackGameSim;
    pub use crate::game::player::RandomPlayer;
    pub use crate::game::shoe::Shoe;
    pub use crate::game::table::{BlackjackTableSim, HandResult, Outcome, RoundLog, TableRules};
    pub use counter_lib::prelude::*;
    pub use std::io::{self, Write};
}

pub use prelude::*;
use crate::SimulationError;

/// Plays one player through sessions of up to `num_rounds` rounds, keeping the tallies for the current session.
pub struct BlackjackGameSim<P: Player> {
    table: BlackjackTableSim,
    player: P,
    num_rounds: u32,
    starting_bankrole: f64,
    pub rounds_played: u32,
    pub total_wins: u32,
    pub total_pushes: u32,
    pub total_losses: u32,
    pub total_surrenders: u32,
    pub num_player_blackjacks: u32,
    pub num_insurance_bets: u32,
    pub total_winnings: f64,
    pub total_wagered: f64,
    pub ended_early: bool,
}

impl<P: Player> BlackjackGameSim<P> {
    /// `num_rounds` is the most rounds a session plays, it ends sooner only when the player's bankrole
    /// drops below the table minimum.
    pub fn new(table: BlackjackTableSim, player: P, num_rounds: u32) -> BlackjackGameSim<P> {
        let starting_bankrole = player.bankrole();
        BlackjackGameSim {
            table,
            player,
            num_rounds,
            starting_bankrole,
            rounds_played: 0,
            total_wins: 0,
            total_pushes: 0,
            total_losses: 0,
            total_surrenders: 0,
            num_player_blackjacks: 0,
            num_insurance_bets: 0,
            total_winnings: 0.0,
            total_wagered: 0.0,
            ended_early: false,
        }
    }

    pub fn label(&self) -> String {
        self.player.label().to_string()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Plays a session on a freshly shuffled shoe.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        self.new_shoe();
        for _ in 0..self.num_rounds {
            if self.play_round()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    pub fn new_shoe(&mut self) {
        self.table.new_shoe();
    }

    /// Plays and records one round. Returns `None` instead once the player's bankrole is below the table minimum.
    pub fn play_round(&mut self) -> Result<Option<RoundLog>, SimulationError> {
        if self.player.bankrole() < self.player.minimum_bet() {
            if !self.ended_early {
                log::warn!(
                    "{} ended the session early after {} rounds with {:.2} left",
                    self.player.label(),
                    self.rounds_played,
                    self.player.bankrole()
                );
            }
            self.ended_early = true;
            return Ok(None);
        }
        let log = self.table.play_round(&mut self.player)?;
        self.record(&log);
        Ok(Some(log))
    }

    fn record(&mut self, log: &RoundLog) {
        self.rounds_played += 1;
        if log.insurance > 0.0 {
            self.num_insurance_bets += 1;
        }
        for result in &log.hands {
            match result.outcome {
                Outcome::Blackjack => {
                    self.num_player_blackjacks += 1;
                    self.total_wins += 1;
                }
                Outcome::Win => self.total_wins += 1,
                Outcome::Push => self.total_pushes += 1,
                Outcome::Loss | Outcome::Bust => self.total_losses += 1,
                Outcome::Surrender => self.total_surrenders += 1,
            }
        }
        self.total_winnings += log.net();
        self.total_wagered += log.wagered();
    }

    /// Writes the tallies of the current session to `out`.
    pub fn display_stats(&self, out: &mut impl Write) -> io::Result<()> {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks:".len() + 20;
        const NUMERIC_WIDTH: usize = WIDTH - TEXT_WIDTH;

        writeln!(out, "{}", "-".repeat(WIDTH))?;
        writeln!(out, "{:-^WIDTH$}", "stats")?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}", "rounds played:", self.rounds_played)?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}", "total wins:", self.total_wins)?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}", "total pushes:", self.total_pushes)?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}", "total losses:", self.total_losses)?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}", "total surrenders:", self.total_surrenders)?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$.2}", "total winnings:", self.total_winnings)?;
        writeln!(
            out,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$.2}",
            "players final bankrole:",
            self.player.bankrole()
        )?;
        writeln!(
            out,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "number of player blackjacks:", self.num_player_blackjacks
        )?;
        writeln!(out, "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}", "ended early:", self.ended_early)?;
        writeln!(out, "{}", "-".repeat(WIDTH))
    }

    /// Clears the tallies and restores the starting bankrole.
    pub fn reset(&mut self) {
        self.player.set_bankrole(self.starting_bankrole);
        self.rounds_played = 0;
        self.total_wins = 0;
        self.total_pushes = 0;
        self.total_losses = 0;
        self.total_surrenders = 0;
        self.num_player_blackjacks = 0;
        self.num_insurance_bets = 0;
        self.total_winnings = 0.0;
        self.total_wagered = 0.0;
        self.ended_early = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn game<P: Player>(player: P, rounds: u32, seed: u64) -> BlackjackGameSim<P> {
        let shoe = Shoe::new(6, 1.5, Some(seed)).unwrap();
        let table = BlackjackTableSim::new(shoe, TableRules::default());
        BlackjackGameSim::new(table, player, rounds)
    }

    #[test]
    fn test_game() {
        let mut game = game(Counter::new(&StrategyConfig::default()), 300, 5);
        game.run().unwrap();
        assert!(game.rounds_played > 0);
        let diff = game.player().bankrole() - StrategyConfig::default().bankrole;
        assert!((diff - game.total_winnings).abs() < 1e-6);
        assert!(game.total_wins + game.total_losses + game.total_pushes + game.total_surrenders >= game.rounds_played);

        let mut out = Vec::new();
        game.display_stats(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("total wins:"));
    }

    #[test]
    fn test_broke_player_ends_early() {
        let mut player = BasicPlayer::new(&StrategyConfig::default());
        player.set_bankrole(150.0);
        let mut game = game(player, 10_000, 9);
        game.run().unwrap();
        assert!(game.ended_early);
        assert!(game.player().bankrole() < 100.0);
        assert!(game.rounds_played < 10_000);
    }

    #[test]
    fn test_reset_restores_bankrole() {
        let mut player = BasicPlayer::new(&StrategyConfig::default());
        player.set_bankrole(150.0);
        let mut game = game(player, 50, 13);
        game.run().unwrap();
        game.reset();
        assert_eq!(game.player().bankrole(), 150.0);
        assert_eq!(game.rounds_played, 0);
        assert_eq!(game.total_winnings, 0.0);
        assert!(!game.ended_early);
    }
}
