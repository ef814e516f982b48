use crate::CounterError;

/// Converts a true count into a wager: `unit * floor(true_count + true_adjust + 0.5)` clamped to the table limits.
/// Pure, calling it never touches a bankrole or a count.
pub fn bet_amount(true_count: f64, true_adjust: f64, unit: f64, minimum: f64, maximum: f64) -> f64 {
    let scale = true_count + true_adjust;
    let raw = unit * f64::floor(scale + 0.5);
    raw.clamp(minimum, maximum)
}

/// A betting ramp that raises the wager by one unit per point of true count.
/// `true_adjust` shifts the whole ramp, typically down so the counter only bets up with a real edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetRamp {
    unit: f64,
    true_adjust: f64,
    minimum: f64,
    maximum: f64,
    at_least_one_unit: bool,
}

impl BetRamp {
    /// Validates the ramp: a positive unit, a positive minimum and a maximum no smaller than the minimum.
    pub fn new(unit: f64, true_adjust: f64, minimum: f64, maximum: f64) -> Result<Self, CounterError> {
        if !(unit.is_finite() && unit > 0.0) {
            return Err(CounterError::InvalidStrategy(format!(
                "betting unit must be positive, got {}",
                unit
            )));
        }
        if !true_adjust.is_finite() {
            return Err(CounterError::InvalidStrategy(
                "true_adjust must be finite".to_string(),
            ));
        }
        if !(minimum.is_finite() && minimum > 0.0 && maximum.is_finite() && minimum <= maximum) {
            return Err(CounterError::InvalidStrategy(format!(
                "bet limits must satisfy 0 < minimum <= maximum, got {} and {}",
                minimum, maximum
            )));
        }
        Ok(BetRamp {
            unit,
            true_adjust,
            minimum,
            maximum,
            at_least_one_unit: false,
        })
    }

    /// Whether a wager below one unit is raised to a full unit before the table limits apply.
    pub fn at_least_one_unit(mut self, enabled: bool) -> Self {
        self.at_least_one_unit = enabled;
        self
    }

    pub fn bet(&self, true_count: f64) -> f64 {
        let scale = true_count + self.true_adjust;
        let mut raw = self.unit * f64::floor(scale + 0.5);
        if self.at_least_one_unit && raw < self.unit {
            raw = self.unit;
        }
        raw.clamp(self.minimum, self.maximum)
    }

    pub fn unit(&self) -> f64 {
        self.unit
    }

    pub fn true_adjust(&self) -> f64 {
        self.true_adjust
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn is_at_least_one_unit(&self) -> bool {
        self.at_least_one_unit
    }
}

impl Default for BetRamp {
    fn default() -> Self {
        BetRamp {
            unit: 100.0,
            true_adjust: -0.5,
            minimum: 100.0,
            maximum: 1000.0,
            at_least_one_unit: false,
        }
    }
}
