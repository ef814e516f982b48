//! Threshold based strategy tables. Every entry is the true count at or above which the player takes an action,
//! so a single table encodes basic strategy together with its count based deviations.
//!
//! Tables are loaded from a JSON strategy file and validated up front, a lookup never fails at play time:
//! a hand or value missing from a table simply means the action is never taken.

mod defaults;

use crate::betting::BetRamp;
use crate::card::Face;
use crate::count::CountTags;
use crate::hand::HandKey;
use crate::CounterError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Threshold satisfied by every true count.
pub const ALWAYS: f64 = f64::NEG_INFINITY;
/// Threshold no true count can reach.
pub const NEVER: f64 = f64::INFINITY;

/// Number of possible dealer upcards, i.e. the width of a table row.
pub const UPCARDS: usize = 10;

/// One row of a table, a threshold per dealer upcard in the order `2 3 4 5 6 7 8 9 X A`.
pub type UpcardThresholds = [f64; UPCARDS];

lazy_static! {
    /// The built-in Hi-Lo deviation tables.
    pub static ref DEFAULT_TABLES: Arc<StrategyTables> = Arc::new(defaults::tables());
}

/// A threshold as written in a strategy file, either a number or one of the words `ALWAYS`/`NEVER`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Count(f64),
    Sentinel(Sentinel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentinel {
    Always,
    Never,
}

impl Threshold {
    pub fn resolve(self) -> f64 {
        match self {
            Threshold::Count(v) => v,
            Threshold::Sentinel(Sentinel::Always) => ALWAYS,
            Threshold::Sentinel(Sentinel::Never) => NEVER,
        }
    }
}

impl From<f64> for Threshold {
    fn from(value: f64) -> Self {
        if value == ALWAYS {
            Threshold::Sentinel(Sentinel::Always)
        } else if value == NEVER {
            Threshold::Sentinel(Sentinel::Never)
        } else {
            Threshold::Count(value)
        }
    }
}

fn resolve_row(name: &str, key: &str, row: &[Threshold]) -> Result<UpcardThresholds, CounterError> {
    if row.len() != UPCARDS {
        return Err(CounterError::InvalidStrategy(format!(
            "{} table entry '{}' has {} thresholds, expected {}",
            name,
            key,
            row.len(),
            UPCARDS
        )));
    }
    let mut thresholds = [NEVER; UPCARDS];
    for (slot, threshold) in thresholds.iter_mut().zip(row) {
        let value = threshold.resolve();
        if value.is_nan() {
            return Err(CounterError::InvalidStrategy(format!(
                "{} table entry '{}' contains NaN",
                name, key
            )));
        }
        *slot = value;
    }
    Ok(thresholds)
}

fn unresolve_row(row: &UpcardThresholds) -> Vec<Threshold> {
    row.iter().map(|t| Threshold::from(*t)).collect()
}

/// Stand thresholds keyed by hand value, used for either hard or soft hands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandTable(BTreeMap<u8, UpcardThresholds>);

impl StandTable {
    pub fn new(rows: BTreeMap<u8, UpcardThresholds>) -> Self {
        StandTable(rows)
    }

    pub fn lookup(&self, value: u32, upcard: Face) -> f64 {
        u8::try_from(value)
            .ok()
            .and_then(|value| self.0.get(&value))
            .map_or(NEVER, |row| row[upcard.index()])
    }

    pub fn rows(&self) -> &BTreeMap<u8, UpcardThresholds> {
        &self.0
    }

    fn from_file(
        name: &str,
        rows: &BTreeMap<u8, Vec<Threshold>>,
        values: std::ops::RangeInclusive<u8>,
    ) -> Result<Self, CounterError> {
        let mut table = BTreeMap::new();
        for (value, row) in rows {
            if !values.contains(value) {
                return Err(CounterError::InvalidStrategy(format!(
                    "{} table value {} is outside {}..={}",
                    name,
                    value,
                    values.start(),
                    values.end()
                )));
            }
            table.insert(*value, resolve_row(name, &value.to_string(), row)?);
        }
        Ok(StandTable(table))
    }

    fn to_file(&self) -> BTreeMap<u8, Vec<Threshold>> {
        self.0.iter().map(|(v, row)| (*v, unresolve_row(row))).collect()
    }
}

/// Thresholds for a two card decision keyed by the canonical hand, used by the double, split and surrender tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairTable(BTreeMap<HandKey, UpcardThresholds>);

impl PairTable {
    pub fn new(rows: BTreeMap<HandKey, UpcardThresholds>) -> Self {
        PairTable(rows)
    }

    pub fn lookup(&self, key: HandKey, upcard: Face) -> f64 {
        self.0.get(&key).map_or(NEVER, |row| row[upcard.index()])
    }

    pub fn rows(&self) -> &BTreeMap<HandKey, UpcardThresholds> {
        &self.0
    }

    fn from_file(
        name: &str,
        rows: &BTreeMap<String, Vec<Threshold>>,
        pairs_only: bool,
    ) -> Result<Self, CounterError> {
        let mut table = BTreeMap::new();
        for (raw, row) in rows {
            let key: HandKey = raw.parse()?;
            if pairs_only && !key.is_pair() {
                return Err(CounterError::InvalidStrategy(format!(
                    "{} table key '{}' is not a pair",
                    name, raw
                )));
            }
            let thresholds = resolve_row(name, raw, row)?;
            if table.insert(key, thresholds).is_some() {
                return Err(CounterError::InvalidStrategy(format!(
                    "{} table key '{}' duplicates '{}'",
                    name, raw, key
                )));
            }
        }
        Ok(PairTable(table))
    }

    fn to_file(&self) -> BTreeMap<String, Vec<Threshold>> {
        self.0
            .iter()
            .map(|(k, row)| (k.to_string(), unresolve_row(row)))
            .collect()
    }
}

/// Insurance is only offered against an ace, so there is no upcard dimension. Either one threshold
/// for every hand or one per hand, a hand missing from the table never insures.
#[derive(Debug, Clone, PartialEq)]
pub enum InsuranceTable {
    Global(f64),
    ByHand(BTreeMap<HandKey, f64>),
}

impl Default for InsuranceTable {
    fn default() -> Self {
        InsuranceTable::ByHand(BTreeMap::new())
    }
}

impl InsuranceTable {
    pub fn global(threshold: f64) -> Self {
        InsuranceTable::Global(threshold)
    }

    pub fn by_hand(rows: BTreeMap<HandKey, f64>) -> Self {
        InsuranceTable::ByHand(rows)
    }

    pub fn lookup(&self, key: HandKey) -> f64 {
        match self {
            InsuranceTable::Global(threshold) => *threshold,
            InsuranceTable::ByHand(rows) => rows.get(&key).copied().unwrap_or(NEVER),
        }
    }

    fn from_file(entry: &InsuranceEntry) -> Result<Self, CounterError> {
        match entry {
            InsuranceEntry::Global(threshold) => {
                let value = threshold.resolve();
                if value.is_nan() {
                    return Err(CounterError::InvalidStrategy(
                        "insurance threshold is NaN".to_string(),
                    ));
                }
                Ok(InsuranceTable::global(value))
            }
            InsuranceEntry::ByHand(rows) => {
                let mut table = BTreeMap::new();
                for (raw, threshold) in rows {
                    let key: HandKey = raw.parse()?;
                    let value = threshold.resolve();
                    if value.is_nan() {
                        return Err(CounterError::InvalidStrategy(format!(
                            "insurance table entry '{}' is NaN",
                            raw
                        )));
                    }
                    if table.insert(key, value).is_some() {
                        return Err(CounterError::InvalidStrategy(format!(
                            "insurance table key '{}' duplicates '{}'",
                            raw, key
                        )));
                    }
                }
                Ok(InsuranceTable::by_hand(table))
            }
        }
    }

    fn to_file(&self) -> InsuranceEntry {
        match self {
            InsuranceTable::Global(threshold) => InsuranceEntry::Global(Threshold::from(*threshold)),
            InsuranceTable::ByHand(rows) => InsuranceEntry::ByHand(
                rows.iter()
                    .map(|(k, t)| (k.to_string(), Threshold::from(*t)))
                    .collect(),
            ),
        }
    }
}

/// The six decision tables a counter plays from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyTables {
    pub hard_stand: StandTable,
    pub soft_stand: StandTable,
    pub double: PairTable,
    pub split: PairTable,
    pub surrender: PairTable,
    pub insurance: InsuranceTable,
}

/// Insurance in a strategy file, a single threshold or one per hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsuranceEntry {
    Global(Threshold),
    ByHand(BTreeMap<String, Threshold>),
}

/// The on disk layout of a strategy, see `strategies/hilo.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyFile {
    pub unit: f64,
    pub true_adjust: f64,
    pub bankrole: f64,
    pub minimum_bet: f64,
    pub maximum_bet: f64,
    #[serde(default)]
    pub at_least_one_unit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<CountTags>,
    pub hard_stand: BTreeMap<u8, Vec<Threshold>>,
    pub soft_stand: BTreeMap<u8, Vec<Threshold>>,
    pub double: BTreeMap<String, Vec<Threshold>>,
    pub split: BTreeMap<String, Vec<Threshold>>,
    pub surrender: BTreeMap<String, Vec<Threshold>>,
    pub insurance: InsuranceEntry,
}

/// A validated strategy: tables, count tags, betting parameters and the starting bankrole.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub tables: Arc<StrategyTables>,
    pub counts: CountTags,
    pub bet: BetRamp,
    pub bankrole: f64,
}

impl StrategyConfig {
    pub fn from_json(json: &str) -> Result<Self, CounterError> {
        let file: StrategyFile = serde_json::from_str(json)?;
        StrategyConfig::try_from(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CounterError> {
        let file: StrategyFile = serde_json::from_reader(reader)?;
        StrategyConfig::try_from(file)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CounterError> {
        let file = std::fs::File::open(path.as_ref())?;
        log::debug!("loading strategy from {}", path.as_ref().display());
        StrategyConfig::from_reader(std::io::BufReader::new(file))
    }

    pub fn to_json_pretty(&self) -> Result<String, CounterError> {
        Ok(serde_json::to_string_pretty(&StrategyFile::from(self))?)
    }
}

impl Default for StrategyConfig {
    /// The built-in tables with a 100 unit ramp between a 100 minimum and a 1000 maximum.
    fn default() -> Self {
        StrategyConfig {
            tables: Arc::clone(&DEFAULT_TABLES),
            counts: CountTags::hi_lo(),
            bet: BetRamp::default(),
            bankrole: 10_000.0,
        }
    }
}

impl TryFrom<StrategyFile> for StrategyConfig {
    type Error = CounterError;

    fn try_from(file: StrategyFile) -> Result<Self, Self::Error> {
        let bet = BetRamp::new(file.unit, file.true_adjust, file.minimum_bet, file.maximum_bet)?
            .at_least_one_unit(file.at_least_one_unit);
        if !file.bankrole.is_finite() {
            return Err(CounterError::InvalidStrategy(
                "bankrole must be finite".to_string(),
            ));
        }
        let tables = StrategyTables {
            hard_stand: StandTable::from_file("hard stand", &file.hard_stand, 4..=21)?,
            soft_stand: StandTable::from_file("soft stand", &file.soft_stand, 12..=21)?,
            double: PairTable::from_file("double", &file.double, false)?,
            split: PairTable::from_file("split", &file.split, true)?,
            surrender: PairTable::from_file("surrender", &file.surrender, false)?,
            insurance: InsuranceTable::from_file(&file.insurance)?,
        };
        Ok(StrategyConfig {
            tables: Arc::new(tables),
            counts: file.counts.unwrap_or_default(),
            bet,
            bankrole: file.bankrole,
        })
    }
}

impl From<&StrategyConfig> for StrategyFile {
    fn from(config: &StrategyConfig) -> Self {
        let tables = &config.tables;
        StrategyFile {
            unit: config.bet.unit(),
            true_adjust: config.bet.true_adjust(),
            bankrole: config.bankrole,
            minimum_bet: config.bet.minimum(),
            maximum_bet: config.bet.maximum(),
            at_least_one_unit: config.bet.is_at_least_one_unit(),
            counts: Some(config.counts),
            hard_stand: tables.hard_stand.to_file(),
            soft_stand: tables.soft_stand.to_file(),
            double: tables.double.to_file(),
            split: tables.split.to_file(),
            surrender: tables.surrender.to_file(),
            insurance: tables.insurance.to_file(),
        }
    }
}
