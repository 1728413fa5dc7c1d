//! Aggregated analysis across all domains
//!
//! Averages the `withinOpt` factor per algorithm and action duration, renders one comparison
//! plot and writes the accompanying text report and CPU time CSV.

use super::constants::{EXPANSION_LIMIT_LABEL, WITHIN_OPTIMAL_LABEL};
use super::cpu_time::{
    cpu_time_statistics, format_cpu_time_table, write_cpu_time_csv, CpuTimeError,
};
use crate::common::data_structures::{AlgorithmKey, ScoredObservation};
use crate::common::plots::{create_line_plot, AxisScale, LinePlot, PlotSettings, Series};
use crate::common::tables::{format_grid, format_optional};
use crate::common::PlotError;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during the aggregated analysis
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Failed to write file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to generate plot: {0}")]
    PlotGeneration(#[from] PlotError),

    #[error("Failed to write CPU time statistics: {0}")]
    CpuTime(#[from] CpuTimeError),
}

type Result<T> = core::result::Result<T, AggregateError>;

/// Mean `withinOpt` per algorithm series and action duration
pub type WithinOptimalTable = BTreeMap<AlgorithmKey, BTreeMap<u64, f64>>;

/// Files written by the aggregated analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutputs {
    pub report: PathBuf,
    pub cpu_csv: PathBuf,
}

/// Arithmetic mean of the present, non-NaN values; `None` if there are none
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|value| !value.is_nan())
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Groups scored rows by algorithm and action duration and averages `withinOpt`
///
/// Groups without a single `withinOpt` value produce no entry.
pub fn within_optimal_by_duration(scored: &[ScoredObservation]) -> WithinOptimalTable {
    let mut groups: BTreeMap<(&AlgorithmKey, u64), Vec<Option<f64>>> = BTreeMap::new();
    for row in scored {
        groups
            .entry((&row.observation.algorithm, row.observation.action_duration))
            .or_default()
            .push(row.within_optimal);
    }

    let mut table = WithinOptimalTable::new();
    for ((algorithm, action_duration), values) in groups {
        if let Some(average) = mean(values) {
            table
                .entry(algorithm.clone())
                .or_default()
                .insert(action_duration, average);
        }
    }

    table
}

/// Builds the comparison plot: one series per algorithm over a logarithmic expansion limit axis
pub fn aggregated_plot(table: &WithinOptimalTable, title: &str) -> LinePlot {
    let series = table
        .iter()
        .map(|(algorithm, by_duration)| Series {
            label: algorithm.to_string(),
            points: by_duration
                .iter()
                .map(|(&duration, &average)| (duration as f64, average))
                .collect(),
        })
        .collect();

    LinePlot {
        title: title.to_string(),
        x_label: EXPANSION_LIMIT_LABEL.to_string(),
        y_label: WITHIN_OPTIMAL_LABEL.to_string(),
        x_scale: AxisScale::Log,
        series,
    }
}

/// Formats the table with one row per action duration and one column per algorithm
pub fn format_within_optimal_table(table: &WithinOptimalTable) -> String {
    let durations: BTreeSet<u64> = table
        .values()
        .flat_map(|by_duration| by_duration.keys().copied())
        .collect();

    let header = std::iter::once("Action Duration".to_string())
        .chain(table.keys().map(AlgorithmKey::to_string))
        .collect::<Vec<String>>();

    let rows = durations
        .iter()
        .map(|duration| {
            std::iter::once(duration.to_string())
                .chain(
                    table
                        .values()
                        .map(|by_duration| format_optional(by_duration.get(duration).copied(), 3)),
                )
                .collect::<Vec<String>>()
        })
        .collect::<Vec<_>>();

    format_grid(header, rows, WITHIN_OPTIMAL_LABEL)
}

/// Generate the aggregated text report and CPU time CSV
///
/// Writes `<title>.txt` (mean `withinOpt` table and CPU time table) and `<title>_cpu.csv`
/// into `output_dir`.
///
/// # Arguments
/// * `scored` - Observations joined with their reference optimum
/// * `title` - Analysis title, used as the file name stem
/// * `output_dir` - Directory where the files should be saved
///
/// # Returns
/// * `Ok(AnalysisOutputs)` - Paths of the written files
/// * `Err(AggregateError)` - If file operations failed
pub fn generate_aggregated_analysis(
    scored: &[ScoredObservation],
    title: &str,
    output_dir: &Path,
) -> Result<AnalysisOutputs> {
    let table = within_optimal_by_duration(scored);
    let statistics = cpu_time_statistics(scored);

    let cpu_csv = output_dir.join(format!("{title}_cpu.csv"));
    write_cpu_time_csv(&statistics, &cpu_csv)?;

    let report = output_dir.join(format!("{title}.txt"));
    let output = format!(
        "{}\n{}\n\n{}\n\n{}\n\nSummary\n{}\nScored observations: {}\nAlgorithms: {}",
        title,
        "=".repeat(title.len()),
        format_within_optimal_table(&table),
        format_cpu_time_table(&statistics),
        "=".repeat(7),
        scored.len(),
        statistics.len()
    );
    fs::write(&report, output)?;

    Ok(AnalysisOutputs { report, cpu_csv })
}

/// Generate the aggregated comparison plot as `<title>.png` in `output_dir`
pub fn generate_aggregated_plot(
    scored: &[ScoredObservation],
    title: &str,
    output_dir: &Path,
    settings: &PlotSettings,
) -> Result<PathBuf> {
    let table = within_optimal_by_duration(scored);
    let output_path = output_dir.join(format!("{title}.png"));

    create_line_plot(&aggregated_plot(&table, title), &output_path, settings)?;

    Ok(output_path)
}
