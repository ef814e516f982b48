use crate::CounterError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// The rank of a card with the suit stripped off. `Ten` stands in for every ten valued card (10, J, Q, K),
/// its symbol is `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Ace,
}

impl Face {
    /// Every face, ordered by its upcard index.
    pub const ALL: [Face; 10] = [
        Face::Two,
        Face::Three,
        Face::Four,
        Face::Five,
        Face::Six,
        Face::Seven,
        Face::Eight,
        Face::Nine,
        Face::Ten,
        Face::Ace,
    ];

    /// The thirteen faces of a single suit, four of which are ten valued.
    pub const SHOE_SUIT: [Face; 13] = [
        Face::Two,
        Face::Three,
        Face::Four,
        Face::Five,
        Face::Six,
        Face::Seven,
        Face::Eight,
        Face::Nine,
        Face::Ten,
        Face::Ten,
        Face::Ten,
        Face::Ten,
        Face::Ace,
    ];

    /// Blackjack value of the face, aces count low.
    pub fn value(self) -> u8 {
        match self {
            Face::Two => 2,
            Face::Three => 3,
            Face::Four => 4,
            Face::Five => 5,
            Face::Six => 6,
            Face::Seven => 7,
            Face::Eight => 8,
            Face::Nine => 9,
            Face::Ten => 10,
            Face::Ace => 1,
        }
    }

    /// Hi-Lo count value of the face.
    pub fn hi_lo(self) -> i8 {
        match self {
            Face::Two | Face::Three | Face::Four | Face::Five | Face::Six => 1,
            Face::Seven | Face::Eight | Face::Nine => 0,
            Face::Ten | Face::Ace => -1,
        }
    }

    /// Position of the face in a row of a strategy table, `2` is 0 and `A` is 9.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> char {
        match self {
            Face::Two => '2',
            Face::Three => '3',
            Face::Four => '4',
            Face::Five => '5',
            Face::Six => '6',
            Face::Seven => '7',
            Face::Eight => '8',
            Face::Nine => '9',
            Face::Ten => 'X',
            Face::Ace => 'A',
        }
    }
}

impl TryFrom<char> for Face {
    type Error = CounterError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '2' => Ok(Face::Two),
            '3' => Ok(Face::Three),
            '4' => Ok(Face::Four),
            '5' => Ok(Face::Five),
            '6' => Ok(Face::Six),
            '7' => Ok(Face::Seven),
            '8' => Ok(Face::Eight),
            '9' => Ok(Face::Nine),
            'X' => Ok(Face::Ten),
            'A' => Ok(Face::Ace),
            other => Err(CounterError::InvalidFace(other)),
        }
    }
}

impl FromStr for Face {
    type Err = CounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Face::try_from(symbol),
            (Some(_), Some(extra)) => Err(CounterError::InvalidFace(extra)),
            (None, _) => Err(CounterError::InvalidFace(' ')),
        }
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Serialize for Face {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 4];
        serializer.serialize_str(self.symbol().encode_utf8(&mut buf))
    }
}

impl<'de> Deserialize<'de> for Face {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        symbol.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a string of face symbols such as `"A6X"`, failing on the first symbol outside the alphabet.
pub fn parse_faces(symbols: &str) -> Result<Vec<Face>, CounterError> {
    symbols.chars().map(Face::try_from).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_values_and_counts() {
        let values: Vec<u8> = Face::ALL.iter().map(|f| f.value()).collect();
        assert_eq!(values, vec![2, 3, 4, 5, 6, 7, 8, 9, 10, 1]);

        let counts: Vec<i8> = Face::ALL.iter().map(|f| f.hi_lo()).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 1, 0, 0, 0, -1, -1]);
    }

    #[test]
    fn test_upcard_index_order() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
        assert_eq!(Face::Ten.index(), 8);
        assert_eq!(Face::Ace.index(), 9);
    }

    #[test]
    fn test_balanced_suit() {
        let total: i32 = Face::SHOE_SUIT.iter().map(|f| f.hi_lo() as i32).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_parse_rejects_unknown_faces() {
        assert_eq!(parse_faces("A6X").unwrap(), vec![Face::Ace, Face::Six, Face::Ten]);
        assert!(matches!(parse_faces("A1"), Err(CounterError::InvalidFace('1'))));
        assert!(matches!(parse_faces("K"), Err(CounterError::InvalidFace('K'))));
        // no silent coercion of lower case symbols
        assert!("a".parse::<Face>().is_err());
        assert!("AX".parse::<Face>().is_err());
        assert!("".parse::<Face>().is_err());
    }

    #[test]
    fn test_symbol_round_trip() {
        for face in Face::ALL {
            assert_eq!(Face::try_from(face.symbol()).unwrap(), face);
            assert_eq!(face.to_string().parse::<Face>().unwrap(), face);
        }
        let json = serde_json::to_string(&Face::Ten).unwrap();
        assert_eq!(json, "\"X\"");
        let face: Face = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(face, Face::Ace);
    }
}
