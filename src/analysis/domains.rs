//! Per-domain plots
//!
//! Draws one chart per domain instance from the raw (not averaged) scored rows. Mostly useful
//! for spotting outliers before looking at the aggregated plot.

use super::constants::{DOMAIN_FILE_SUFFIX, EXPANSION_LIMIT_LABEL, WITHIN_OPTIMAL_LABEL};
use crate::common::data_structures::{AlgorithmKey, ScoredObservation};
use crate::common::plots::{create_line_plot, AxisScale, LinePlot, PlotSettings, Series};
use crate::common::progress::progress_bar;
use crate::common::PlotError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name used for a domain whose path yields no usable file name
const UNNAMED_DOMAIN: &str = "unnamed-domain";

type Result<T> = core::result::Result<T, PlotError>;

/// Derives a plot name from a domain path: the last path segment without the `.vw` suffix
pub fn domain_name(domain_path: &str) -> &str {
    let file_name = domain_path.rsplit('/').next().unwrap_or(domain_path);
    let name = file_name.strip_suffix(DOMAIN_FILE_SUFFIX).unwrap_or(file_name);

    if name.is_empty() {
        UNNAMED_DOMAIN
    } else {
        name
    }
}

/// Builds one plot per domain path, in domain path order
///
/// Each algorithm contributes a series of its raw `(actionDuration, withinOpt)` points sorted
/// by action duration; rows without `withinOpt` are left out.
pub fn domain_plots(scored: &[ScoredObservation]) -> Vec<LinePlot> {
    let mut domains: BTreeMap<&str, BTreeMap<&AlgorithmKey, Vec<(f64, f64)>>> = BTreeMap::new();

    for row in scored {
        let observation = &row.observation;
        let series = domains
            .entry(observation.domain_path.as_str())
            .or_default()
            .entry(&observation.algorithm)
            .or_default();

        if let Some(within_optimal) = row.within_optimal {
            series.push((observation.action_duration as f64, within_optimal));
        }
    }

    domains
        .into_iter()
        .map(|(domain_path, algorithms)| LinePlot {
            title: domain_name(domain_path).to_string(),
            x_label: EXPANSION_LIMIT_LABEL.to_string(),
            y_label: WITHIN_OPTIMAL_LABEL.to_string(),
            x_scale: AxisScale::Linear,
            series: algorithms
                .into_iter()
                .map(|(algorithm, mut points)| {
                    points.sort_by(|a, b| a.0.total_cmp(&b.0));
                    Series {
                        label: algorithm.to_string(),
                        points,
                    }
                })
                .collect(),
        })
        .collect()
}

/// Generate `<domain name>.png` for every domain in `output_dir`
///
/// Domains without a single drawable point are skipped with a warning.
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - The plots that were written
/// * `Err(PlotError)` - If rendering failed
pub fn generate_domain_plots(
    scored: &[ScoredObservation],
    output_dir: &Path,
    settings: &PlotSettings,
) -> Result<Vec<PathBuf>> {
    let plots = domain_plots(scored);
    let progress = progress_bar(plots.len() as u64, "Plotting domains");
    let mut written = Vec::with_capacity(plots.len());

    for plot in &plots {
        progress.set_message(plot.title.clone());
        let output_path = output_dir.join(format!("{}.png", plot.title));

        match create_line_plot(plot, &output_path, settings) {
            Ok(()) => written.push(output_path),
            Err(PlotError::InvalidData(reason)) => {
                warn!(domain = %plot.title, %reason, "skipping domain plot");
            }
            Err(error) => {
                progress.abandon();
                return Err(error);
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(written)
}
