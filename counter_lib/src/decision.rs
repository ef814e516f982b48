//! The decision engine: a player takes an action exactly when the true count is at or above the table threshold.

use crate::card::Face;
use crate::hand::Hand;
use crate::strategy::StrategyTables;
use crate::CounterError;
use std::fmt::Display;

/// The yes/no questions a table asks a player, in the order a hand is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Insurance,
    Surrender,
    Split,
    Double,
    Stand,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Insurance => "insurance",
            Action::Surrender => "surrender",
            Action::Split => "split",
            Action::Double => "double",
            Action::Stand => "stand",
        };
        write!(f, "{}", name)
    }
}

fn precondition(action: Action, hand: &Hand, why: &str) -> CounterError {
    CounterError::Precondition(format!("cannot ask for {} on {}: {}", action, hand, why))
}

impl StrategyTables {
    /// Checks that asking `action` about `hand` against `upcard` makes sense at all.
    pub fn check(&self, action: Action, hand: &Hand, upcard: Face) -> Result<(), CounterError> {
        match action {
            Action::Insurance if upcard != Face::Ace => {
                Err(precondition(action, hand, "insurance is only offered against an ace"))
            }
            Action::Insurance | Action::Surrender | Action::Double if hand.len() != 2 => {
                Err(precondition(action, hand, "the hand must hold exactly two cards"))
            }
            Action::Split if !hand.is_pair() => Err(precondition(action, hand, "the hand is not a pair")),
            Action::Stand if hand.is_empty() => Err(precondition(action, hand, "the hand is empty")),
            Action::Stand if hand.is_bust() => Err(precondition(action, hand, "the hand is bust")),
            _ => Ok(()),
        }
    }

    /// The true count at or above which `action` is taken. Two card actions use the canonical hand key,
    /// standing uses the hand value and softness. Missing entries resolve to `NEVER`.
    pub fn threshold(&self, action: Action, hand: &Hand, upcard: Face) -> Result<f64, CounterError> {
        self.check(action, hand, upcard)?;
        let key = hand.key();
        let threshold = match (action, key) {
            (Action::Insurance, Some(key)) => self.insurance.lookup(key),
            (Action::Surrender, Some(key)) => self.surrender.lookup(key, upcard),
            (Action::Split, Some(key)) => self.split.lookup(key, upcard),
            (Action::Double, Some(key)) => self.double.lookup(key, upcard),
            (Action::Stand, _) => {
                if hand.is_soft() {
                    self.soft_stand.lookup(hand.value(), upcard)
                } else {
                    self.hard_stand.lookup(hand.value(), upcard)
                }
            }
            (_, None) => crate::strategy::NEVER,
        };
        Ok(threshold)
    }

    /// Answers whether a player at `true_count` takes `action`.
    pub fn wants(&self, action: Action, hand: &Hand, upcard: Face, true_count: f64) -> Result<bool, CounterError> {
        let threshold = self.threshold(action, hand, upcard)?;
        log::trace!(
            "{} on {} against {}: true count {:.2}, threshold {}",
            action,
            hand,
            upcard,
            true_count,
            threshold
        );
        Ok(true_count >= threshold)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hand::HandKey;
    use crate::strategy::{InsuranceTable, PairTable, StandTable, DEFAULT_TABLES, ALWAYS, NEVER, UPCARDS};
    use std::collections::BTreeMap;

    fn hand(symbols: &str) -> Hand {
        symbols.parse().unwrap()
    }

    fn face(symbol: &str) -> Face {
        symbol.parse().unwrap()
    }

    /// Tables where insurance and surrender disagree everywhere, so a mixed up lookup shows.
    fn disagreeing_tables() -> StrategyTables {
        let key: HandKey = "6X".parse().unwrap();
        let mut surrender = BTreeMap::new();
        surrender.insert(key, [ALWAYS; UPCARDS]);
        let mut insurance = BTreeMap::new();
        insurance.insert(key, NEVER);
        StrategyTables {
            surrender: PairTable::new(surrender),
            insurance: InsuranceTable::by_hand(insurance),
            ..StrategyTables::default()
        }
    }

    #[test]
    fn test_surrender_uses_surrender_table() {
        let tables = disagreeing_tables();
        assert!(tables.wants(Action::Surrender, &hand("X6"), face("A"), 0.0).unwrap());
        assert!(!tables.wants(Action::Insurance, &hand("X6"), face("A"), 0.0).unwrap());
    }

    #[test]
    fn test_insurance_consults_its_table() {
        let mut rows = BTreeMap::new();
        rows.insert("XX".parse::<HandKey>().unwrap(), 1.0);
        rows.insert("66".parse::<HandKey>().unwrap(), 5.0);
        let tables = StrategyTables {
            insurance: InsuranceTable::by_hand(rows),
            ..StrategyTables::default()
        };
        assert!(tables.wants(Action::Insurance, &hand("XX"), face("A"), 1.0).unwrap());
        assert!(!tables.wants(Action::Insurance, &hand("66"), face("A"), 4.9).unwrap());
        assert!(tables.wants(Action::Insurance, &hand("66"), face("A"), 5.0).unwrap());
        assert!(!tables.wants(Action::Insurance, &hand("78"), face("A"), 50.0).unwrap());
    }

    #[test]
    fn test_sentinels_hold_for_extreme_counts() {
        let mut rows = BTreeMap::new();
        rows.insert(17, [ALWAYS; UPCARDS]);
        rows.insert(12, [NEVER; UPCARDS]);
        let tables = StrategyTables {
            hard_stand: StandTable::new(rows),
            ..StrategyTables::default()
        };
        for true_count in [-1.0e300, -20.0, 0.0, 20.0, 1.0e300, f64::MAX, f64::MIN] {
            for upcard in Face::ALL {
                assert!(tables.wants(Action::Stand, &hand("X7"), upcard, true_count).unwrap());
                assert!(!tables.wants(Action::Stand, &hand("X2"), upcard, true_count).unwrap());
            }
        }
    }

    #[test]
    fn test_default_stand_decisions() {
        let tables = &**DEFAULT_TABLES;
        // hard 12 against a 2 needs +3
        assert!(!tables.wants(Action::Stand, &hand("X2"), face("2"), 2.9).unwrap());
        assert!(tables.wants(Action::Stand, &hand("X2"), face("2"), 3.0).unwrap());
        // hard 16 against a ten stands at zero or better
        assert!(tables.wants(Action::Stand, &hand("X6"), face("X"), 0.0).unwrap());
        assert!(!tables.wants(Action::Stand, &hand("X6"), face("X"), -0.1).unwrap());
        // three card hands stand by value
        assert!(tables.wants(Action::Stand, &hand("55X"), face("7"), -10.0).unwrap());
        // soft 17 is not in the soft table, it always hits
        assert!(!tables.wants(Action::Stand, &hand("A6"), face("6"), 10.0).unwrap());
        // soft 18 against a nine hits, against an ace it needs +1.5
        assert!(!tables.wants(Action::Stand, &hand("A7"), face("9"), 10.0).unwrap());
        assert!(tables.wants(Action::Stand, &hand("A7"), face("A"), 1.5).unwrap());
        // values of 11 or less are never stood on
        assert!(!tables.wants(Action::Stand, &hand("56"), face("6"), 10.0).unwrap());
    }

    #[test]
    fn test_default_two_card_decisions() {
        let tables = &**DEFAULT_TABLES;
        assert!(tables.wants(Action::Double, &hand("65"), face("6"), -10.0).unwrap());
        assert!(tables.wants(Action::Double, &hand("A6"), face("3"), -4.0).unwrap());
        assert!(!tables.wants(Action::Double, &hand("6A"), face("3"), -4.5).unwrap());
        assert!(!tables.wants(Action::Double, &hand("XX"), face("6"), 20.0).unwrap());
        assert!(tables.wants(Action::Split, &hand("88"), face("X"), -20.0).unwrap());
        assert!(tables.wants(Action::Split, &hand("AA"), face("A"), -20.0).unwrap());
        assert!(!tables.wants(Action::Split, &hand("XX"), face("6"), 4.0).unwrap());
        assert!(tables.wants(Action::Split, &hand("XX"), face("6"), 4.5).unwrap());
        assert!(tables.wants(Action::Surrender, &hand("X6"), face("X"), -3.0).unwrap());
        assert!(!tables.wants(Action::Surrender, &hand("X6"), face("X"), -3.5).unwrap());
        assert!(!tables.wants(Action::Surrender, &hand("X6"), face("6"), 20.0).unwrap());
    }

    #[test]
    fn test_insurance_scenario() {
        // six decks after A, 6, X: true count is about -0.168, well short of +3
        let tables = &**DEFAULT_TABLES;
        let true_count = -1.0 / ((6.0 * 52.0 - 3.0) / 52.0);
        assert!(!tables.wants(Action::Insurance, &hand("X6"), face("A"), true_count).unwrap());
        assert!(tables.wants(Action::Insurance, &hand("X6"), face("A"), 3.0).unwrap());
    }

    #[test]
    fn test_preconditions() {
        let tables = &**DEFAULT_TABLES;
        assert!(matches!(
            tables.wants(Action::Split, &hand("89"), face("6"), 0.0),
            Err(CounterError::Precondition(_))
        ));
        assert!(tables.wants(Action::Insurance, &hand("89"), face("X"), 0.0).is_err());
        assert!(tables.wants(Action::Stand, &hand("XX5"), face("6"), 0.0).is_err());
        assert!(tables.wants(Action::Double, &hand("234"), face("6"), 0.0).is_err());
        assert!(tables.wants(Action::Surrender, &hand("X"), face("6"), 0.0).is_err());
        assert!(tables.wants(Action::Stand, &Hand::new(), face("6"), 0.0).is_err());
    }
}
