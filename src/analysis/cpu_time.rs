//! CPU time statistics per algorithm
//!
//! Summarizes planning time and iteration counts of every algorithm series and writes them
//! as CSV for further processing.

use super::aggregate::mean;
use super::constants::NANOS_PER_MILLI;
use crate::common::data_structures::{AlgorithmKey, ScoredObservation};
use crate::common::tables::{format_optional, format_table};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tabled::Tabled;
use thiserror::Error;

/// Errors that can occur while writing CPU time statistics
#[derive(Error, Debug)]
pub enum CpuTimeError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(#[from] std::io::Error),
}

type Result<T> = core::result::Result<T, CpuTimeError>;

/// Mean CPU usage of one algorithm series; also the CSV row layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuTimeStatistics {
    pub algorithm: String,
    /// Mean of per-run planning time divided by iteration count, in milliseconds
    pub cpu_per_iteration_ms: Option<f64>,
    /// Mean total planning time in nanoseconds
    pub planning_time: Option<f64>,
    pub iteration_count: Option<f64>,
}

/// Display row for the text report
#[derive(Debug, Clone, Tabled)]
struct CpuTimeEntry {
    #[tabled(rename = "Algorithm")]
    algorithm: String,
    #[tabled(rename = "CPU per Iteration (ms)")]
    cpu_per_iteration_ms: String,
    #[tabled(rename = "Planning Time (ns)")]
    planning_time: String,
    #[tabled(rename = "Iterations")]
    iteration_count: String,
}

impl From<&CpuTimeStatistics> for CpuTimeEntry {
    fn from(stats: &CpuTimeStatistics) -> Self {
        Self {
            algorithm: stats.algorithm.clone(),
            cpu_per_iteration_ms: format_optional(stats.cpu_per_iteration_ms, 4),
            planning_time: format_optional(stats.planning_time, 0),
            iteration_count: format_optional(stats.iteration_count, 2),
        }
    }
}

/// Computes CPU time statistics for every algorithm series, ordered by algorithm
pub fn cpu_time_statistics(scored: &[ScoredObservation]) -> Vec<CpuTimeStatistics> {
    let mut groups: BTreeMap<&AlgorithmKey, Vec<&ScoredObservation>> = BTreeMap::new();
    for row in scored {
        groups
            .entry(&row.observation.algorithm)
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|(algorithm, rows)| {
            let per_iteration = mean(rows.iter().map(|row| {
                let observation = &row.observation;
                let ratio = observation.planning_time? / observation.iteration_count?;
                ratio.is_finite().then_some(ratio)
            }));

            CpuTimeStatistics {
                algorithm: algorithm.to_string(),
                cpu_per_iteration_ms: per_iteration.map(|nanos| nanos / NANOS_PER_MILLI),
                planning_time: mean(rows.iter().map(|row| row.observation.planning_time)),
                iteration_count: mean(rows.iter().map(|row| row.observation.iteration_count)),
            }
        })
        .collect()
}

/// Writes the statistics as CSV with a header row; missing means are left empty
pub fn write_cpu_time_csv(statistics: &[CpuTimeStatistics], output_file: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_file)?;
    if statistics.is_empty() {
        writer.write_record([
            "algorithm",
            "cpu_per_iteration_ms",
            "planning_time",
            "iteration_count",
        ])?;
    }
    for row in statistics {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Formats the statistics as an ASCII table for the text report
pub fn format_cpu_time_table(statistics: &[CpuTimeStatistics]) -> String {
    let entries: Vec<CpuTimeEntry> = statistics.iter().map(CpuTimeEntry::from).collect();
    format_table(&entries, "CPU Time per Algorithm")
}
