use counter::Counter;

use crate::preprocessing::separate::ServerFeatureTable;
use crate::shared_interface::{JoinedRecord, LatencyRecord};

/// What happened to a latency row during the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinOutcome {
    Retained,
    NoFeatures,
    NotMaster,
    Warmup,
}

pub fn classify(features: &ServerFeatureTable, latency: &LatencyRecord, warmup_time: f64) -> JoinOutcome {
    if !features.contains_key(&latency.id) {
        JoinOutcome::NoFeatures
    } else if !latency.is_master {
        JoinOutcome::NotMaster
    } else if !(latency.start_time > warmup_time) {
        // NaN start times never pass the warmup cut
        JoinOutcome::Warmup
    } else {
        JoinOutcome::Retained
    }
}

/// Inner join on transaction id, keeping master records that started after the warmup.
/// Output follows the order of `latencies`.
pub fn join_server(features: &ServerFeatureTable, latencies: Vec<LatencyRecord>, warmup_time: f64) -> (Vec<JoinedRecord>, Counter<JoinOutcome>) {
    let mut tally: Counter<JoinOutcome> = Counter::new();
    let mut joined = Vec::new();

    for latency in latencies {
        let outcome = classify(features, &latency, warmup_time);
        tally.update(std::iter::once(outcome));

        if outcome != JoinOutcome::Retained {
            trace!("dropped {} ({:?})", latency, outcome);
            continue;
        }

        if let Some(record) = features.get(&latency.id) {
            joined.push(JoinedRecord { features: record.clone(), latency });
        }
    }

    (joined, tally)
}
