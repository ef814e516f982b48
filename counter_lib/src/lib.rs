//! The rules engine behind the card counting simulator: card faces, hand values, the running/true count,
//! threshold based strategy tables and the decisions and bets a counter derives from them.
//!
//! Everything here is a deterministic calculation. Dealing, shuffling and settling rounds live in `counter_sim`.

pub mod betting;
pub mod card;
pub mod count;
pub mod decision;
pub mod hand;
pub mod player;
pub mod strategy;

use thiserror::Error;

pub mod prelude {
    pub use super::{
        betting::{bet_amount, BetRamp},
        card::{parse_faces, Face},
        count::{CountTags, RunningCount},
        decision::Action,
        hand::{hand_value, Hand, HandKey},
        player::{BasicPlayer, Counter, Player},
        strategy::{StrategyConfig, StrategyTables, ALWAYS, NEVER},
        CounterError, CARDS_PER_DECK,
    };
}

/// Number of cards in a single deck.
pub const CARDS_PER_DECK: u32 = 52;

/// Errors produced by the rules engine. None of these are transient, they all mean the caller fed the
/// engine something it cannot reason about.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("invalid card face '{0}', expected one of 23456789XA")]
    InvalidFace(char),
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error("shoe exhausted: {cards_seen} cards seen from a {decks_in_shoe} deck shoe")]
    ShoeExhausted { cards_seen: u32, decks_in_shoe: f64 },
    #[error("unable to read strategy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed strategy json: {0}")]
    Json(#[from] serde_json::Error),
}
