use crate::card::Face;
use crate::{CounterError, CARDS_PER_DECK};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// The count value assigned to each face, indexed by `Face::index()`. Defaults to Hi-Lo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountTags([f64; 10]);

impl CountTags {
    pub fn hi_lo() -> Self {
        let mut tags = [0.0; 10];
        for face in Face::ALL {
            tags[face.index()] = face.hi_lo() as f64;
        }
        CountTags(tags)
    }

    pub fn tag(&self, face: Face) -> f64 {
        self.0[face.index()]
    }

    /// Builds tags from a face -> value map, every face must be present.
    pub fn from_map(map: &BTreeMap<Face, f64>) -> Result<Self, CounterError> {
        let mut tags = [0.0; 10];
        for face in Face::ALL {
            match map.get(&face) {
                Some(v) if v.is_finite() => tags[face.index()] = *v,
                Some(v) => {
                    return Err(CounterError::InvalidStrategy(format!(
                        "count value {} for face {} is not finite",
                        v, face
                    )))
                }
                None => {
                    return Err(CounterError::InvalidStrategy(format!(
                        "count table is missing face {}",
                        face
                    )))
                }
            }
        }
        Ok(CountTags(tags))
    }

    pub fn to_map(&self) -> BTreeMap<Face, f64> {
        Face::ALL.iter().map(|f| (*f, self.tag(*f))).collect()
    }
}

impl Default for CountTags {
    fn default() -> Self {
        CountTags::hi_lo()
    }
}

impl Serialize for CountTags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CountTags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<Face, f64>::deserialize(deserializer)?;
        CountTags::from_map(&map).map_err(serde::de::Error::custom)
    }
}

/// Running count and depth of the current shoe. Reset at every shuffle, the true count is kept current
/// after every observed card.
#[derive(Debug, Clone, Default)]
pub struct RunningCount {
    tags: CountTags,
    count: f64,
    decks_in_shoe: f64,
    cards_seen: u32,
    true_count: f64,
}

impl RunningCount {
    pub fn new(tags: CountTags) -> Self {
        RunningCount {
            tags,
            count: 0.0,
            decks_in_shoe: 0.0,
            cards_seen: 0,
            true_count: 0.0,
        }
    }

    /// Starts counting a freshly shuffled shoe of `decks_in_shoe` decks.
    pub fn reset(&mut self, decks_in_shoe: f64) {
        self.count = 0.0;
        self.cards_seen = 0;
        self.true_count = 0.0;
        self.decks_in_shoe = decks_in_shoe;
    }

    /// Adds `face` to the count. A card that would leave no decks remaining is rejected, the table
    /// is expected to reshuffle at the cut card long before that point.
    pub fn observe(&mut self, face: Face) -> Result<(), CounterError> {
        let cards_seen = self.cards_seen + 1;
        let cards_unseen = self.decks_in_shoe * (CARDS_PER_DECK as f64) - cards_seen as f64;
        if cards_unseen <= 0.0 {
            return Err(CounterError::ShoeExhausted {
                cards_seen,
                decks_in_shoe: self.decks_in_shoe,
            });
        }
        self.count += self.tags.tag(face);
        self.cards_seen = cards_seen;
        self.true_count = self.count / (cards_unseen / CARDS_PER_DECK as f64);
        Ok(())
    }

    pub fn running_count(&self) -> f64 {
        self.count
    }

    pub fn cards_seen(&self) -> u32 {
        self.cards_seen
    }

    pub fn decks_remaining(&self) -> f64 {
        (self.decks_in_shoe * CARDS_PER_DECK as f64 - self.cards_seen as f64) / CARDS_PER_DECK as f64
    }

    pub fn true_count(&self) -> f64 {
        self.true_count
    }
}

impl Display for RunningCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = "total cards counted:".len();
        write!(
            f,
            "{:<width$}{:>8.1}\n{:<width$}{:>8}\n{:<width$}{:>8.2}",
            "running count:",
            self.count,
            "total cards counted:",
            self.cards_seen,
            "true count:",
            self.true_count,
        )
    }
}
