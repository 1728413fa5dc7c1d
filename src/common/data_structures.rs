use crate::analysis::constants::{BACKLOG_ALGORITHM, DEFAULT_BACKLOG_RATIO, REFERENCE_ALGORITHM};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// JSON keys of the fields consumed by the analysis
pub mod keys {
    pub const DOMAIN_PATH: &str = "domainPath";
    pub const ALGORITHM_NAME: &str = "algorithmName";
    pub const BACKLOG_RATIO: &str = "backlogRatio";
    pub const ACTION_DURATION: &str = "actionDuration";
    pub const PATH_LENGTH: &str = "pathLength";
    pub const GOAL_ACHIEVEMENT_TIME: &str = "goalAchievementTime";
    pub const PLANNING_TIME: &str = "planningTime";
    pub const ITERATION_COUNT: &str = "iterationCount";
    pub const ERROR_MESSAGE: &str = "errorMessage";
}

/// A single experiment as written by the benchmark harness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Parameters the experiment was run with (domain, algorithm, action duration, ...)
    pub configuration: Map<String, Value>,
    /// Measured values (goal achievement time, path length, planning time, ...)
    #[serde(flatten)]
    pub results: Map<String, Value>,
}

impl ExperimentResult {
    /// Merges the configuration into the top level fields.
    ///
    /// On a key collision the configuration value wins.
    pub fn flatten(self) -> ExperimentRecord {
        let mut fields = self.results;
        fields.extend(self.configuration);
        ExperimentRecord { fields }
    }
}

/// A flattened experiment: configuration and results side by side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentRecord {
    fields: Map<String, Value>,
}

impl From<Map<String, Value>> for ExperimentRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl ExperimentRecord {
    /// Returns the value stored under `key`, treating JSON `null` as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Reads a non-negative integer, accepting whole floating point numbers such as `250.0`
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        let value = self.get(key)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
                .map(|v| v as u64)
        })
    }

    /// Whether the run ended with an error and must not be analysed
    pub fn is_failed(&self) -> bool {
        self.get(keys::ERROR_MESSAGE).is_some()
    }
}

/// Identity of a plotted algorithm series.
///
/// The backlog ratio only discriminates variants of [`BACKLOG_ALGORITHM`]; for every other
/// algorithm it is discarded so one algorithm always maps to one series.
#[derive(Debug, Clone)]
pub struct AlgorithmKey {
    name: String,
    backlog_ratio: Option<f64>,
}

impl AlgorithmKey {
    pub fn new(name: impl Into<String>, backlog_ratio: f64) -> Self {
        let name = name.into();
        let backlog_ratio = (name == BACKLOG_ALGORITHM).then_some(backlog_ratio);
        Self {
            name,
            backlog_ratio,
        }
    }

    /// Whether this algorithm provides the reference optimum
    pub fn is_reference(&self) -> bool {
        self.name == REFERENCE_ALGORITHM
    }
}

impl Ord for AlgorithmKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| match (self.backlog_ratio, other.backlog_ratio) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            })
    }
}

impl PartialOrd for AlgorithmKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AlgorithmKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AlgorithmKey {}

impl fmt::Display for AlgorithmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backlog_ratio {
            Some(ratio) => write!(f, "{} Backup Ratio: {}", self.name, format_ratio(ratio)),
            None => f.write_str(&self.name),
        }
    }
}

/// Writes whole ratios with one decimal (`1.0`) and others in their shortest form (`0.25`)
fn format_ratio(ratio: f64) -> String {
    if ratio.is_finite() && ratio.fract() == 0.0 {
        format!("{ratio:.1}")
    } else {
        format!("{ratio}")
    }
}

/// Errors raised when a record lacks the fields that identify it
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("Missing or invalid field `{0}`")]
    MissingField(&'static str),
}

/// One successful experiment run, reduced to the values the analysis needs
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Domain instance the run was performed on
    pub domain_path: String,
    pub algorithm: AlgorithmKey,
    /// Expansion limit per iteration
    pub action_duration: u64,
    pub path_length: Option<f64>,
    pub goal_achievement_time: Option<f64>,
    /// Total planning time in nanoseconds
    pub planning_time: Option<f64>,
    pub iteration_count: Option<f64>,
}

impl TryFrom<&ExperimentRecord> for Observation {
    type Error = RecordError;

    fn try_from(record: &ExperimentRecord) -> Result<Self, Self::Error> {
        let domain_path = record
            .str_field(keys::DOMAIN_PATH)
            .ok_or(RecordError::MissingField(keys::DOMAIN_PATH))?;
        let algorithm_name = record
            .str_field(keys::ALGORITHM_NAME)
            .ok_or(RecordError::MissingField(keys::ALGORITHM_NAME))?;
        let action_duration = record
            .u64_field(keys::ACTION_DURATION)
            .ok_or(RecordError::MissingField(keys::ACTION_DURATION))?;

        let backlog_ratio = record
            .f64_field(keys::BACKLOG_RATIO)
            .filter(|ratio| !ratio.is_nan())
            .unwrap_or(DEFAULT_BACKLOG_RATIO);

        Ok(Self {
            domain_path: domain_path.to_string(),
            algorithm: AlgorithmKey::new(algorithm_name, backlog_ratio),
            action_duration,
            path_length: record.f64_field(keys::PATH_LENGTH),
            goal_achievement_time: record.f64_field(keys::GOAL_ACHIEVEMENT_TIME),
            planning_time: record.f64_field(keys::PLANNING_TIME),
            iteration_count: record.f64_field(keys::ITERATION_COUNT),
        })
    }
}

/// An observation joined with the reference optimum of its domain instance
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredObservation {
    pub observation: Observation,
    /// Goal achievement time as a factor of the reference optimum
    pub within_optimal: Option<f64>,
}
