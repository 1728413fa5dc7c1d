//! Progress reporting for the slower stages (loading inputs, rendering many plots)

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar over `len` steps, labelled with `prefix`
///
/// Falls back to the default bar style if the template cannot be parsed.
pub fn progress_bar(len: u64, prefix: &'static str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{prefix:.bold} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .map(|style| style.progress_chars("#>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let progress = ProgressBar::new(len);
    progress.set_style(style);
    progress.set_prefix(prefix);
    progress
}
