use crate::card::Face;
use crate::CounterError;
use std::fmt::Display;
use std::str::FromStr;

/// Computes the blackjack value of `faces`, returning the value and whether it is soft.
/// Aces are counted as 1 and at most one of them is promoted to 11, and only when that does not bust the hand.
pub fn hand_value(faces: &[Face]) -> (u32, bool) {
    let total: u32 = faces.iter().map(|f| u32::from(f.value())).sum();
    let has_aces = faces.contains(&Face::Ace);
    if has_aces && total <= 11 {
        (total + 10, true)
    } else {
        (total, false)
    }
}

/// The cards held by one participant. Only the composition of the hand matters to the strategy,
/// the order of the faces is kept for display purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    faces: Vec<Face>,
}

impl Hand {
    pub fn new() -> Self {
        Hand { faces: Vec::new() }
    }

    pub fn push(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Sum of the blackjack values, every ace counted as 1.
    pub fn total(&self) -> u32 {
        self.faces.iter().map(|f| u32::from(f.value())).sum()
    }

    pub fn has_aces(&self) -> bool {
        self.faces.contains(&Face::Ace)
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.faces).0
    }

    pub fn is_soft(&self) -> bool {
        hand_value(&self.faces).1
    }

    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }

    /// An ace and a ten valued card, nothing else reaches 21 with two cards.
    pub fn is_blackjack(&self) -> bool {
        let (value, soft) = hand_value(&self.faces);
        self.faces.len() == 2 && value == 21 && soft
    }

    pub fn is_pair(&self) -> bool {
        self.faces.len() == 2 && self.faces[0] == self.faces[1]
    }

    /// The canonical key of a two card hand, `None` for any other size.
    pub fn key(&self) -> Option<HandKey> {
        match self.faces.as_slice() {
            [first, second] => Some(HandKey::new(*first, *second)),
            _ => None,
        }
    }

    /// Removes and returns the second card of a pair, leaving a one card hand behind.
    pub fn split_off(&mut self) -> Option<Face> {
        if self.is_pair() {
            self.faces.pop()
        } else {
            None
        }
    }
}

impl From<Vec<Face>> for Hand {
    fn from(faces: Vec<Face>) -> Self {
        Hand { faces }
    }
}

impl FromStr for Hand {
    type Err = CounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Hand::from(crate::card::parse_faces(s)?))
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for face in &self.faces {
            write!(f, "{}", face)?;
        }
        let (value, soft) = hand_value(&self.faces);
        if soft {
            write!(f, " (soft {})", value)
        } else {
            write!(f, " ({})", value)
        }
    }
}

/// A two card hand in canonical form: low card first with the ace always last, e.g. `"6A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandKey(Face, Face);

impl HandKey {
    pub fn new(a: Face, b: Face) -> Self {
        if a <= b {
            HandKey(a, b)
        } else {
            HandKey(b, a)
        }
    }

    pub fn is_pair(&self) -> bool {
        self.0 == self.1
    }

    /// Every canonical key, 55 in all.
    pub fn all() -> impl Iterator<Item = HandKey> {
        Face::ALL.into_iter().enumerate().flat_map(|(i, low)| {
            Face::ALL.into_iter().skip(i).map(move |high| HandKey(low, high))
        })
    }
}

impl FromStr for HandKey {
    type Err = CounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let faces = crate::card::parse_faces(s)?;
        match faces.as_slice() {
            [a, b] => Ok(HandKey::new(*a, *b)),
            _ => Err(CounterError::InvalidStrategy(format!(
                "hand key '{}' must have exactly two faces",
                s
            ))),
        }
    }
}

impl Display for HandKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}
