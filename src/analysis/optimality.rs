//! Goal achievement time relative to the reference optimum
//!
//! This module turns flattened records into scored observations:
//! - failed runs are discarded
//! - records are reduced to typed [`Observation`]s
//! - every observation is joined with the reference (A*) run of its domain instance and
//!   action duration, yielding the `withinOpt` factor

use crate::common::data_structures::{ExperimentRecord, Observation, ScoredObservation};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Counts of what happened to the input records during preparation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PreparationSummary {
    /// Records loaded from all input files
    pub records: usize,
    /// Records discarded because the run reported an error
    pub failed: usize,
    /// Records discarded because they lack a domain, algorithm or action duration
    pub malformed: usize,
    /// Observations discarded because no reference run matches them
    pub without_reference: usize,
    /// Scored rows produced by the join
    pub scored: usize,
}

/// Scored observations ready for aggregation, with bookkeeping about discarded input
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PreparedData {
    pub scored: Vec<ScoredObservation>,
    pub summary: PreparationSummary,
}

/// Runs the complete preparation: discard failures, extract observations, join with the
/// reference optimum and compute `withinOpt`
pub fn prepare_observations(records: Vec<ExperimentRecord>) -> PreparedData {
    let mut summary = PreparationSummary {
        records: records.len(),
        ..Default::default()
    };

    let successful = discard_failed(records);
    summary.failed = summary.records - successful.len();

    let (observations, malformed) = extract_observations(&successful);
    summary.malformed = malformed;

    let (scored, without_reference) = score_observations(&observations);
    summary.scored = scored.len();
    summary.without_reference = without_reference;

    if summary.malformed > 0 {
        warn!(
            malformed = summary.malformed,
            "skipped records without domain, algorithm or action duration"
        );
    }
    if summary.without_reference > 0 {
        warn!(
            dropped = summary.without_reference,
            "dropped observations without a reference run for their domain and action duration"
        );
    }
    debug!(?summary, "prepared observations");

    PreparedData { scored, summary }
}

/// Drops every record whose run reported an error message
pub fn discard_failed(records: Vec<ExperimentRecord>) -> Vec<ExperimentRecord> {
    records
        .into_iter()
        .filter(|record| !record.is_failed())
        .collect()
}

/// Extracts typed observations, returning them with the number of records skipped
pub fn extract_observations(records: &[ExperimentRecord]) -> (Vec<Observation>, usize) {
    let mut observations = Vec::with_capacity(records.len());
    let mut malformed = 0;

    for (index, record) in records.iter().enumerate() {
        match Observation::try_from(record) {
            Ok(observation) => observations.push(observation),
            Err(error) => {
                debug!(index, %error, "skipping record");
                malformed += 1;
            }
        }
    }

    (observations, malformed)
}

/// Reference optima keyed by (domain path, action duration)
///
/// Each reference run contributes `actionDuration * pathLength`; a key may hold several
/// optima when the reference algorithm ran more than once on the same instance.
pub fn reference_optima(observations: &[Observation]) -> HashMap<(&str, u64), Vec<Option<f64>>> {
    let mut optima: HashMap<(&str, u64), Vec<Option<f64>>> = HashMap::new();

    for observation in observations
        .iter()
        .filter(|observation| observation.algorithm.is_reference())
    {
        let optimal = observation
            .path_length
            .map(|length| observation.action_duration as f64 * length);

        optima
            .entry((observation.domain_path.as_str(), observation.action_duration))
            .or_default()
            .push(optimal);
    }

    optima
}

/// Inner join of observations with the reference optima
///
/// Observations without a reference are dropped and counted; an observation matching several
/// references yields one row per reference.
pub fn score_observations(observations: &[Observation]) -> (Vec<ScoredObservation>, usize) {
    let optima = reference_optima(observations);
    let mut scored = Vec::with_capacity(observations.len());
    let mut without_reference = 0;

    for observation in observations {
        let Some(references) =
            optima.get(&(observation.domain_path.as_str(), observation.action_duration))
        else {
            without_reference += 1;
            continue;
        };

        for &optimal in references {
            scored.push(ScoredObservation {
                observation: observation.clone(),
                within_optimal: within_optimal(observation.goal_achievement_time, optimal),
            });
        }
    }

    (scored, without_reference)
}

/// Goal achievement time as a factor of the optimum, if both are known and the result is finite
pub fn within_optimal(goal_achievement_time: Option<f64>, optimal: Option<f64>) -> Option<f64> {
    let factor = goal_achievement_time? / optimal?;
    factor.is_finite().then_some(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::AlgorithmKey;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn record(value: Value) -> ExperimentRecord {
        match value {
            Value::Object(map) => ExperimentRecord::from(map),
            _ => panic!("test records must be objects"),
        }
    }

    fn run(algorithm: &str, domain: &str, duration: u64, gat: f64, path_length: f64) -> Value {
        json!({
            "algorithmName": algorithm,
            "domainPath": domain,
            "actionDuration": duration,
            "goalAchievementTime": gat,
            "pathLength": path_length,
            "errorMessage": null
        })
    }

    #[test]
    fn failed_runs_are_discarded() {
        let records = vec![
            record(run("CES", "a.vw", 10, 100.0, 5.0)),
            record(json!({ "algorithmName": "CES", "errorMessage": "out of memory" })),
        ];

        let kept = discard_failed(records);
        assert_eq!(kept.len(), 1);
        assert!(!kept[0].is_failed());
    }

    #[test]
    fn within_optimal_is_relative_to_reference() {
        let records = vec![
            record(run("A_STAR", "a.vw", 10, 120.0, 10.0)),
            record(run("CES", "a.vw", 10, 250.0, 14.0)),
        ];

        let prepared = prepare_observations(records);
        assert_eq!(prepared.scored.len(), 2);

        let ces = prepared
            .scored
            .iter()
            .find(|row| row.observation.algorithm == AlgorithmKey::new("CES", 1.0))
            .unwrap();
        assert_eq!(ces.within_optimal, Some(2.5));

        let reference = prepared
            .scored
            .iter()
            .find(|row| row.observation.algorithm.is_reference())
            .unwrap();
        assert_eq!(reference.within_optimal, Some(1.2));
    }

    #[test]
    fn join_requires_same_domain_and_duration() {
        let records = vec![
            record(run("A_STAR", "a.vw", 10, 100.0, 10.0)),
            record(run("CES", "a.vw", 20, 300.0, 10.0)),
            record(run("CES", "b.vw", 10, 300.0, 10.0)),
        ];

        let prepared = prepare_observations(records);
        assert_eq!(prepared.scored.len(), 1);
        assert_eq!(prepared.summary.without_reference, 2);
        assert!(prepared.scored[0].observation.algorithm.is_reference());
    }

    #[test]
    fn repeated_reference_runs_multiply_rows() {
        let records = vec![
            record(run("A_STAR", "a.vw", 10, 100.0, 10.0)),
            record(run("A_STAR", "a.vw", 10, 100.0, 20.0)),
            record(run("CES", "a.vw", 10, 400.0, 30.0)),
        ];

        let observations = extract_observations(&records).0;
        let (scored, without_reference) = score_observations(&observations);

        // Two reference rows each join with both references, plus the CES row twice
        assert_eq!(scored.len(), 6);
        assert_eq!(without_reference, 0);

        let ces: Vec<_> = scored
            .iter()
            .filter(|row| !row.observation.algorithm.is_reference())
            .map(|row| row.within_optimal)
            .collect();
        assert_eq!(ces, vec![Some(4.0), Some(2.0)]);
    }

    #[test]
    fn summary_counts_every_discard() {
        let records = vec![
            record(run("A_STAR", "a.vw", 10, 100.0, 10.0)),
            record(json!({ "algorithmName": "CES", "errorMessage": "timeout" })),
            record(json!({ "algorithmName": "CES", "domainPath": "a.vw" })),
            record(run("CES", "c.vw", 10, 100.0, 10.0)),
        ];

        let summary = prepare_observations(records).summary;
        assert_eq!(
            summary,
            PreparationSummary {
                records: 4,
                failed: 1,
                malformed: 1,
                without_reference: 1,
                scored: 1,
            }
        );
    }

    #[test]
    fn reference_without_path_length_yields_no_factor() {
        let records = vec![
            record(json!({
                "algorithmName": "A_STAR",
                "domainPath": "a.vw",
                "actionDuration": 10,
                "goalAchievementTime": 100.0
            })),
            record(run("CES", "a.vw", 10, 300.0, 10.0)),
        ];

        let prepared = prepare_observations(records);
        assert_eq!(prepared.scored.len(), 2);
        assert!(prepared.scored.iter().all(|row| row.within_optimal.is_none()));
    }

    #[rstest(goal_achievement_time, optimal, expected,
        case(Some(300.0), Some(100.0), Some(3.0)),
        case(None, Some(100.0), None),
        case(Some(300.0), None, None),
        case(Some(300.0), Some(0.0), None),
        case(Some(0.0), Some(0.0), None)
    )]
    fn within_optimal_factor(
        goal_achievement_time: Option<f64>,
        optimal: Option<f64>,
        expected: Option<f64>,
    ) {
        assert_eq!(within_optimal(goal_achievement_time, optimal), expected);
    }
}
