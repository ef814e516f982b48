use crate::betting::BetRamp;
use crate::card::Face;
use crate::count::RunningCount;
use crate::decision::Action;
use crate::hand::Hand;
use crate::strategy::{StrategyConfig, StrategyTables};
use crate::CounterError;
use std::fmt::Display;
use std::sync::Arc;

/// Everything a table needs from a seated player. The table asks the decision questions in a fixed order,
/// shows every visible card and settles the bankrole through `make_bet`/`receive_payoff`.
pub trait Player {
    fn label(&self) -> &str;

    fn accepts_insurance(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError>;

    fn accepts_surrender(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError>;

    fn accepts_split(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError>;

    fn accepts_double(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError>;

    fn accepts_stand(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError>;

    /// A card has been turned face up at the table.
    fn show_card(&mut self, face: Face) -> Result<(), CounterError>;

    /// A freshly shuffled shoe of `decks_in_shoe` decks is in play.
    fn shuffle(&mut self, decks_in_shoe: f64);

    /// The wager the player would place right now. Never changes any state.
    fn bet_amount(&self) -> f64;

    /// Takes `amount` out of the bankrole, once for the main bet and again for any insurance, split or double.
    fn make_bet(&mut self, amount: f64) {
        let bankrole = self.bankrole();
        self.set_bankrole(bankrole - amount);
    }

    fn receive_payoff(&mut self, amount: f64) {
        let bankrole = self.bankrole();
        self.set_bankrole(bankrole + amount);
    }

    fn bankrole(&self) -> f64;

    fn set_bankrole(&mut self, amount: f64);

    fn minimum_bet(&self) -> f64;

    /// The true count the player is acting on, zero for players that do not count.
    fn true_count(&self) -> f64 {
        0.0
    }
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn accepts_insurance(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        (**self).accepts_insurance(hand, upcard)
    }

    fn accepts_surrender(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        (**self).accepts_surrender(hand, upcard)
    }

    fn accepts_split(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        (**self).accepts_split(hand, upcard)
    }

    fn accepts_double(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        (**self).accepts_double(hand, upcard)
    }

    fn accepts_stand(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        (**self).accepts_stand(hand, upcard)
    }

    fn show_card(&mut self, face: Face) -> Result<(), CounterError> {
        (**self).show_card(face)
    }

    fn shuffle(&mut self, decks_in_shoe: f64) {
        (**self).shuffle(decks_in_shoe)
    }

    fn bet_amount(&self) -> f64 {
        (**self).bet_amount()
    }

    fn make_bet(&mut self, amount: f64) {
        (**self).make_bet(amount)
    }

    fn receive_payoff(&mut self, amount: f64) {
        (**self).receive_payoff(amount)
    }

    fn bankrole(&self) -> f64 {
        (**self).bankrole()
    }

    fn set_bankrole(&mut self, amount: f64) {
        (**self).set_bankrole(amount)
    }

    fn minimum_bet(&self) -> f64 {
        (**self).minimum_bet()
    }

    fn true_count(&self) -> f64 {
        (**self).true_count()
    }
}

/// A card counter, plays the strategy tables at the current true count and bets along its ramp.
#[derive(Debug, Clone)]
pub struct Counter {
    label: String,
    tables: Arc<StrategyTables>,
    count: RunningCount,
    bet: BetRamp,
    bankrole: f64,
}

impl Counter {
    pub fn new(config: &StrategyConfig) -> Self {
        Counter {
            label: String::from("counter"),
            tables: Arc::clone(&config.tables),
            count: RunningCount::new(config.counts),
            bet: config.bet,
            bankrole: config.bankrole,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn count(&self) -> &RunningCount {
        &self.count
    }

    fn wants(&self, action: Action, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.tables.wants(action, hand, upcard, self.count.true_count())
    }
}

impl Player for Counter {
    fn label(&self) -> &str {
        &self.label
    }

    fn accepts_insurance(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.wants(Action::Insurance, hand, upcard)
    }

    fn accepts_surrender(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.wants(Action::Surrender, hand, upcard)
    }

    fn accepts_split(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.wants(Action::Split, hand, upcard)
    }

    fn accepts_double(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.wants(Action::Double, hand, upcard)
    }

    fn accepts_stand(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.wants(Action::Stand, hand, upcard)
    }

    fn show_card(&mut self, face: Face) -> Result<(), CounterError> {
        self.count.observe(face)
    }

    fn shuffle(&mut self, decks_in_shoe: f64) {
        self.count.reset(decks_in_shoe);
    }

    fn bet_amount(&self) -> f64 {
        self.bet.bet(self.count.true_count())
    }

    fn bankrole(&self) -> f64 {
        self.bankrole
    }

    fn set_bankrole(&mut self, amount: f64) {
        self.bankrole = amount;
    }

    fn minimum_bet(&self) -> f64 {
        self.bet.minimum()
    }

    fn true_count(&self) -> f64 {
        self.count.true_count()
    }
}

impl Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: bankrole {:.2}\n{}", self.label, self.bankrole, self.count)
    }
}

/// Plays the same tables as if the count were always zero and flat bets the table minimum.
/// It is the baseline a counter is measured against.
#[derive(Debug, Clone)]
pub struct BasicPlayer {
    label: String,
    tables: Arc<StrategyTables>,
    minimum_bet: f64,
    bankrole: f64,
}

impl BasicPlayer {
    pub fn new(config: &StrategyConfig) -> Self {
        BasicPlayer {
            label: String::from("basic strategy"),
            tables: Arc::clone(&config.tables),
            minimum_bet: config.bet.minimum(),
            bankrole: config.bankrole,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }
}

impl Player for BasicPlayer {
    fn label(&self) -> &str {
        &self.label
    }

    fn accepts_insurance(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.tables.wants(Action::Insurance, hand, upcard, 0.0)
    }

    fn accepts_surrender(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.tables.wants(Action::Surrender, hand, upcard, 0.0)
    }

    fn accepts_split(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.tables.wants(Action::Split, hand, upcard, 0.0)
    }

    fn accepts_double(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.tables.wants(Action::Double, hand, upcard, 0.0)
    }

    fn accepts_stand(&mut self, hand: &Hand, upcard: Face) -> Result<bool, CounterError> {
        self.tables.wants(Action::Stand, hand, upcard, 0.0)
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
