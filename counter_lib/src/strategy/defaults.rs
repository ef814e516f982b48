//! Hi-Lo index tables for a six deck shoe. Hands without a row are never doubled, split or surrendered.

use super::{InsuranceTable, PairTable, StandTable, StrategyTables, UpcardThresholds, ALWAYS as A, NEVER as N};
use crate::hand::HandKey;
use std::collections::BTreeMap;

#[rustfmt::skip]
const HARD_STAND: [(u8, UpcardThresholds); 10] = [
    //        2     3     4     5     6     7     8     9     X     A
    (12, [  3.0,  1.5,  0.0, -1.5, -1.0,    N,    N,    N,    N,    N]),
    (13, [ -1.0, -2.5, -3.5, -5.0, -5.0,    N,    N,    N,    N,    N]),
    (14, [ -4.0, -5.0, -6.0,    A,    A,    N,    N,    N,    N,    N]),
    (15, [    A,    A,    A,    A,    A,  9.5,  9.0,  7.5,  4.5,  9.0]),
    (16, [    A,    A,    A,    A,    A,  7.5,  6.5,  4.5,  0.0,  8.5]),
    (17, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    (18, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    (19, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    (20, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    (21, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
];

#[rustfmt::skip]
const SOFT_STAND: [(u8, UpcardThresholds); 4] = [
    //        2     3     4     5     6     7     8     9     X     A
    (18, [    A,    A,    A,    A,    A,    A,    A,    N,    N,  1.5]),
    (19, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    (20, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    (21, [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
];

#[rustfmt::skip]
const DOUBLE: [(&str, UpcardThresholds); 24] = [
    //         2     3     4     5     6     7     8     9     X     A
    ("25", [    N,    N,    N,  9.0,  9.0,    N,    N,    N,    N,    N]),
    ("34", [    N,    N,    N,  9.0,  9.0,    N,    N,    N,    N,    N]),
    ("26", [    N,  9.5,  6.0,  3.5,  2.0,    N,    N,    N,    N,    N]),
    ("35", [    N,  9.5,  6.0,  3.5,  2.0,    N,    N,    N,    N,    N]),
    ("44", [    N,  9.5,  6.0,  3.5,  2.0,    N,    N,    N,    N,    N]),
    ("27", [  1.0, -1.5, -3.0, -4.5, -6.5,  3.5,  7.5,    N,    N,    N]),
    ("36", [  1.0, -1.5, -3.0, -4.5, -6.5,  3.5,  7.5,    N,    N,    N]),
    ("45", [  1.0, -1.5, -3.0, -4.5, -6.5,  3.5,  7.5,    N,    N,    N]),
    ("28", [    A,    A,    A,    A,    A,    A, -4.5, -1.5,  4.0,  4.0]),
    ("37", [    A,    A,    A,    A,    A,    A, -4.5, -1.5,  4.0,  4.0]),
    ("46", [    A,    A,    A,    A,    A,    A, -4.5, -1.5,  4.0,  4.0]),
    ("55", [    A,    A,    A,    A,    A,    A, -4.5, -1.5,  4.0,  4.0]),
    ("29", [    A,    A,    A,    A,    A,    A,    A, -5.0, -5.0,  1.5]),
    ("38", [    A,    A,    A,    A,    A,    A,    A, -5.0, -5.0,  1.5]),
    ("47", [    A,    A,    A,    A,    A,    A,    A, -5.0, -5.0,  1.5]),
    ("56", [    A,    A,    A,    A,    A,    A,    A, -5.0, -5.0,  1.5]),
    ("2A", [    N,  8.0,  4.0,  0.0, -1.5,    N,    N,    N,    N,    N]),
    ("3A", [    N,  8.0,  2.5, -1.0, -4.5,    N,    N,    N,    N,    N]),
    ("4A", [    N,  8.0,  0.0, -4.5,    A,    N,    N,    N,    N,    N]),
    ("5A", [    N,  4.0, -3.0,    A,    A,    N,    N,    N,    N,    N]),
    ("6A", [  1.0, -4.0,    A,    A,    A,    N,    N,    N,    N,    N]),
    ("7A", [  0.5, -3.0, -5.5,    A,    N,    N,    N,    N,    N,    N]),
    ("8A", [  8.0,  5.5,  3.5,  1.5,  1.0,    N,    N,    N,    N,    N]),
    ("9A", [ 11.0,  9.0,  6.5,  5.0,  4.5,    N,    N,    N,    N,    N]),
];

#[rustfmt::skip]
const SPLIT: [(&str, UpcardThresholds); 9] = [
    //         2     3     4     5     6     7     8     9     X     A
    ("22", [ -3.0,    A,    A,    A,    A,    A,  5.0,    N,    N,    N]),
    ("33", [ -0.5, -4.5, -6.0,    A,    A,    A,  4.0,    N,    N,    N]),
    ("44", [    N,  8.5,  3.0, -0.5, -2.0,    N,    N,    N,    N,    N]),
    ("66", [ -2.0, -4.5,    A,    A,    A,    N,    N,    N,    N,    N]),
    ("77", [    A,    A,    A,    A,    A,    A,    N,    N,    N,    N]),
    ("88", [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
    ("99", [ -3.5, -5.0, -6.0,    A,    A,  3.0,    A,    A,    N,  3.5]),
    ("XX", [    N,    N,  6.5,  5.0,  4.5, 15.0,    N,    N,    N,    N]),
    ("AA", [    A,    A,    A,    A,    A,    A,    A,    A,    A,    A]),
];

#[rustfmt::skip]
const SURRENDER: [(&str, UpcardThresholds); 13] = [
    //         2     3     4     5     6     7     8     9     X     A
    ("3A", [    N,    N,    N,    N,    N,    N,    N,    N,  3.0,    N]),
    ("4X", [    N,    N,    N,    N,    N,    N,    N,    N,  3.0,    N]),
    ("59", [    N,    N,    N,    N,    N,    N,    N,    N,  3.0,    N]),
    ("68", [    N,    N,    N,    N,    N,    N,    N,    N,  3.0,    N]),
    ("77", [    N,    N,    N,    N,    N,    N,    N,    N,  3.0,    N]),
    ("4A", [    N,    N,    N,    N,    N,    N,    N,  3.0, -1.0,  2.0]),
    ("5X", [    N,    N,    N,    N,    N,    N,    N,  3.0, -1.0,  2.0]),
    ("69", [    N,    N,    N,    N,    N,    N,    N,  3.0, -1.0,  2.0]),
    ("78", [    N,    N,    N,    N,    N,    N,    N,  3.0, -1.0,  2.0]),
    ("5A", [    N,    N,    N,    N,    N,    N,  4.0,  0.0, -3.0, -2.0]),
    ("6X", [    N,    N,    N,    N,    N,    N,  4.0,  0.0, -3.0, -2.0]),
    ("79", [    N,    N,    N,    N,    N,    N,    N,    N, -3.0, -2.0]),
    ("88", [    N,    N,    N,    N,    N,    N,    N,  7.0,  0.0,    N]),
];

const INSURANCE: f64 = 3.0;

fn pair_table(rows: &[(&str, UpcardThresholds)]) -> PairTable {
    PairTable::new(
        rows.iter()
            .filter_map(|(key, row)| key.parse::<HandKey>().ok().map(|k| (k, *row)))
            .collect(),
    )
}

pub(super) fn tables() -> StrategyTables {
    StrategyTables {
        hard_stand: StandTable::new(HARD_STAND.into_iter().collect::<BTreeMap<_, _>>()),
        soft_stand: StandTable::new(SOFT_STAND.into_iter().collect::<BTreeMap<_, _>>()),
        double: pair_table(&DOUBLE),
        split: pair_table(&SPLIT),
        surrender: pair_table(&SURRENDER),
        insurance: InsuranceTable::global(INSURANCE),
    }
}
