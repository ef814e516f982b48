use crate::{SimulationError, SimulationSummary, SummaryMessage};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};
use std::sync::mpsc::Receiver;

/// How `write_summaries` renders the collected summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A summary together with the rates derived from it, the shape written out as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub id: usize,
    #[serde(flatten)]
    pub summary: SimulationSummary,
    pub total_hands_played: u32,
    pub win_pct: f64,
    pub push_pct: f64,
    pub loss_pct: f64,
    pub surrender_pct: f64,
    pub avg_winnings_per_hand: f64,
    pub edge: f64,
}

impl SummaryReport {
    pub fn new(id: usize, summary: SimulationSummary) -> Self {
        SummaryReport {
            id,
            total_hands_played: summary.hands(),
            win_pct: summary.win_pct(),
            push_pct: summary.push_pct(),
            loss_pct: summary.loss_pct(),
            surrender_pct: summary.surrender_pct(),
            avg_winnings_per_hand: summary.average_winnings_per_hand(),
            edge: summary.edge(),
            summary,
        }
    }
}

/// Receives session summaries until every id in `ids` has reported it is done, or every sender is gone,
/// and adds them up per simulation id.
pub fn collect_summaries(
    receiver: Receiver<SummaryMessage>,
    mut ids: HashSet<usize>,
) -> Result<BTreeMap<usize, SimulationSummary>, SimulationError> {
    let mut summaries: BTreeMap<usize, SimulationSummary> = BTreeMap::new();
    while !ids.is_empty() {
        let (summary, id) = match receiver.recv() {
            Ok(message) => message,
            Err(_) => {
                log::warn!("channel closed with {} simulations unfinished", ids.len());
                break;
            }
        };
        match summary {
            Some(summary) => match summaries.get_mut(&id) {
                Some(total) => total.merge(&summary),
                None => {
                    summaries.insert(id, summary);
                }
            },
            None => {
                ids.remove(&id);
                log::debug!("simulation #{} finished", id);
            }
        }
    }
    Ok(summaries)
}

pub fn reports(summaries: BTreeMap<usize, SimulationSummary>) -> Vec<SummaryReport> {
    summaries
        .into_iter()
        .map(|(id, summary)| SummaryReport::new(id, summary))
        .collect()
}

/// Collects the summaries from `receiver` and writes them to `writer`, ordered by simulation id.
pub fn write_summaries(
    receiver: Receiver<SummaryMessage>,
    ids: HashSet<usize>,
    mut writer: impl Write,
    format: OutputFormat,
) -> Result<(), SimulationError> {
    let summaries = collect_summaries(receiver, ids)?;
    match format {
        OutputFormat::Text => write_text(&summaries, &mut writer)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &reports(summaries)).map_err(io::Error::from)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_text(summaries: &BTreeMap<usize, SimulationSummary>, writer: &mut impl Write) -> io::Result<()> {
    const WIDTH: usize = 80;
    for (id, summary) in summaries {
        let sim_num = format!("simulation #{}", id);
        writeln!(writer, "{:-^WIDTH$}", sim_num)?;
        write!(writer, "{}", summary)?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc;

    fn session(label: &str, wins: u32, winnings: f64) -> SimulationSummary {
        SimulationSummary {
            label: label.to_string(),
            sessions: 1,
            rounds: wins,
            wins,
            winnings,
            wagered: 100.0 * wins as f64,
            ..SimulationSummary::default()
        }
    }

    fn send_all(messages: Vec<SummaryMessage>) -> Receiver<SummaryMessage> {
        let (sender, receiver) = mpsc::channel();
        for message in messages {
            sender.send(message).unwrap();
        }
        receiver
    }

    #[test]
    fn test_collect_adds_up_sessions() {
        let receiver = send_all(vec![
            (Some(session("counter", 2, 200.0)), 1),
            (Some(session("basic strategy", 1, -100.0)), 2),
            (Some(session("counter", 3, 100.0)), 1),
            (None, 2),
            (None, 1),
        ]);
        let summaries = collect_summaries(receiver, [1, 2].into_iter().collect()).unwrap();
        assert_eq!(summaries[&1].sessions, 2);
        assert_eq!(summaries[&1].wins, 5);
        assert_eq!(summaries[&1].winnings, 300.0);
        assert_eq!(summaries[&2].label, "basic strategy");
    }

    #[test]
    fn test_collect_stops_when_senders_are_gone() {
        // simulation 2 never reports it is done
        let receiver = send_all(vec![(Some(session("counter", 1, 100.0)), 1), (None, 1)]);
        let summaries = collect_summaries(receiver, [1, 2].into_iter().collect()).unwrap();
        assert_eq!(summaries.len(), 1);
    }

    #[test]
    fn test_write_text_and_json() {
        let messages = || vec![(Some(session("counter", 4, 50.0)), 1), (None, 1)];

        let mut text = Vec::new();
        write_summaries(send_all(messages()), [1].into_iter().collect(), &mut text, OutputFormat::Text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("simulation #1"));
        assert!(text.contains("counter"));

        let mut json = Vec::new();
        write_summaries(send_all(messages()), [1].into_iter().collect(), &mut json, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["label"], "counter");
        assert_eq!(value[0]["wins"], 4);
        assert_eq!(value[0]["win_pct"], 1.0);
    }
}
