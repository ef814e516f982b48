use counter_lib::prelude::{CounterError, Face, Hand, Player, StrategyConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Answers every question with a coin flip and flat bets the table minimum.
/// The floor any real strategy should beat.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    label: String,
    minimum_bet: f64,
    bankrole: f64,
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(config: &StrategyConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomPlayer {
            label: String::from("random"),
            minimum_bet: config.bet.minimum(),
            bankrole: config.bankrole,
            rng,
        }
    }

    fn flip(&mut self) -> Result<bool, CounterError> {
        Ok(self.rng.gen_bool(0.5))
    }
}

impl Player for RandomPlayer {
    fn label(&self) -> &str {
        &self.label
    }

    fn accepts_insurance(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
        self.flip()
    }

    fn accepts_surrender(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
        self.flip()
    }

    fn accepts_split(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
        self.flip()
    }

    fn accepts_double(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
        self.flip()
    }

    fn accepts_stand(&mut self, _hand: &Hand, _upcard: Face) -> Result<bool, CounterError> {
        self.flip()
    }

    fn show_card(&mut self, _face: Face) -> Result<(), CounterError> {
        Ok(())
    }

    fn shuffle(&mut self, _decks_in_shoe: f64) {}

    fn bet_amount(&self) -> f64 {
        self.minimum_bet
    }

    fn bankrole(&self) -> f64 {
        self.bankrole
    }

    fn set_bankrole(&mut self, amount: f64) {
        self.bankrole = amount;
    }

    fn minimum_bet(&self) -> f64 {
        self.minimum_bet
    }
}
