use crate::SimulationError;
use counter_lib::prelude::{Face, CARDS_PER_DECK};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A dealing shoe of `decks` decks with a cut card. Once the cut card is reached the table finishes the
/// current round and shuffles before the next one.
#[derive(Debug, Clone)]
pub struct Shoe {
    decks: u32,
    cards: Vec<Face>,
    next: usize,
    round_start: usize,
    cut_index: usize,
    cut_forced: bool,
    rng: Option<StdRng>,
}

impl Shoe {
    /// Builds and shuffles a shoe. `decks_cut` is how many decks sit behind the cut card, a seed makes the
    /// whole sequence of shuffles reproducible.
    pub fn new(decks: u32, decks_cut: f64, seed: Option<u64>) -> Result<Shoe, SimulationError> {
        if decks == 0 {
            return Err(SimulationError::Shoe(
                "a shoe needs at least one deck".to_string(),
            ));
        }
        if !(decks_cut > 0.0 && decks_cut < decks as f64) {
            return Err(SimulationError::Shoe(format!(
                "cut depth must be strictly between 0 and {} decks, got {}",
                decks, decks_cut
            )));
        }
        let size = decks.checked_mul(CARDS_PER_DECK).ok_or_else(|| {
            SimulationError::Shoe(format!("a shoe of {} decks is too large", decks))
        })?;
        let mut cards = Vec::with_capacity(size as usize);
        for _ in 0..decks * 4 {
            cards.extend_from_slice(&Face::SHOE_SUIT);
        }
        let cards_cut = (CARDS_PER_DECK as f64 * decks_cut + 0.5) as usize;
        let cut_index = cards.len() - cards_cut.min(cards.len() - 1);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut shoe = Shoe {
            decks,
            cards,
            next: 0,
            round_start: 0,
            cut_index,
            cut_forced: false,
            rng: Some(rng),
        };
        shoe.shuffle();
        Ok(shoe)
    }

    /// The cut used when none is given: a quarter of the shoe, 1.5 decks of a six deck shoe.
    pub fn default_cut(decks: u32) -> f64 {
        decks as f64 / 4.0
    }

    /// A shoe that deals `faces` in the given order and is never shuffled, shuffling only rewinds it.
    /// The cut card sits behind the last face.
    pub fn stacked(faces: Vec<Face>, decks: u32) -> Shoe {
        let cut_index = faces.len();
        Shoe {
            decks: decks.max(1),
            cards: faces,
            next: 0,
            round_start: 0,
            cut_index,
            cut_forced: false,
            rng: None,
        }
    }

    pub fn shuffle(&mut self) {
        if let Some(rng) = self.rng.as_mut() {
            self.cards.shuffle(rng);
        }
        self.next = 0;
        self.round_start = 0;
        self.cut_forced = false;
        log::debug!("shuffled a {} deck shoe", self.decks);
    }

    /// Marks the cards dealt so far as discards. Cards dealt after this are in play until the next call.
    pub fn start_round(&mut self) {
        self.round_start = self.next;
    }

    /// Shuffles the discards back in behind the cards still in play, for a round that ran the shoe dry.
    /// The cut card counts as reached afterwards, so the shoe is fully shuffled before the next round.
    pub fn reshuffle_discards(&mut self) -> Result<(), SimulationError> {
        if self.round_start == 0 {
            return Err(SimulationError::Shoe(format!(
                "no discards to reshuffle, all {} cards are in play",
                self.next
            )));
        }
        let discards = self.round_start;
        self.cards.rotate_left(discards);
        let in_play = self.cards.len() - discards;
        if let Some(rng) = self.rng.as_mut() {
            self.cards[in_play..].shuffle(rng);
        }
        self.next = in_play;
        self.round_start = 0;
        self.cut_forced = true;
        log::debug!("reshuffled {} discards in the middle of a round", discards);
        Ok(())
    }

    pub fn deal(&mut self) -> Result<Face, SimulationError> {
        match self.cards.get(self.next) {
            Some(face) => {
                self.next += 1;
                Ok(*face)
            }
            None => Err(SimulationError::Shoe(format!(
                "no cards left after dealing {}",
                self.next
            ))),
        }
    }

    /// Discards the next card face down.
    pub fn burn(&mut self) -> Result<(), SimulationError> {
        self.deal().map(|_| ())
    }

    pub fn reached_cut(&self) -> bool {
        self.cut_forced || self.next >= self.cut_index
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }

    pub fn decks(&self) -> u32 {
        self.decks
    }
}
