//! File parsing functionality for experiment results
//!
//! This module handles loading result files written by the benchmark harness.
//! Files may be plain JSON, gzip (`.gz`) or ZStandard (`.zst`) compressed.

use crate::common::data_structures::{ExperimentRecord, ExperimentResult};
use crate::common::progress::progress_bar;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zstd::Decoder;

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to read input file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decompress zstd file: {0}")]
    Decompression(String),

    #[error("Failed to parse JSON in {}: {source}", .path.display())]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Compression applied to a results file, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("zst") => Compression::Zstd,
            _ => Compression::None,
        }
    }
}

/// Parse a single results file into its list of experiments
///
/// # Arguments
/// * `file_path` - Path to a `.json`, `.json.gz` or `.json.zst` file holding a JSON array
///
/// # Returns
/// * `Ok(Vec<ExperimentResult>)` - The experiments in file order
/// * `Err(ParsingError)` - If the file is missing, cannot be decompressed or is not valid JSON
pub fn read_results(file_path: &Path) -> Result<Vec<ExperimentResult>> {
    if !file_path.exists() {
        return Err(ParsingError::MissingInput(file_path.to_path_buf()));
    }

    let file = File::open(file_path).map_err(|source| ParsingError::FileRead {
        path: file_path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn Read> = match Compression::from_path(file_path) {
        Compression::Gzip => Box::new(GzDecoder::new(file)),
        Compression::Zstd => Box::new(Decoder::new(file).map_err(|e| {
            ParsingError::Decompression(format!("Failed to create decoder: {}", e))
        })?),
        Compression::None => Box::new(file),
    };

    // Deserialize JSON directly from the (decompressing) reader
    serde_json::from_reader(BufReader::new(reader)).map_err(|source| ParsingError::JsonParse {
        path: file_path.to_path_buf(),
        source,
    })
}

/// Load every file in order and flatten all experiments into records
///
/// Experiment files are read before the base files so that the combined table keeps the
/// order in which the inputs were given.
pub fn load_records(paths: &[PathBuf], base_paths: &[PathBuf]) -> Result<Vec<ExperimentRecord>> {
    let progress = progress_bar((paths.len() + base_paths.len()) as u64, "Loading results");
    let mut records = Vec::new();

    for path in paths.iter().chain(base_paths) {
        progress.set_message(path.display().to_string());
        let experiments = read_results(path)?;
        debug!(path = %path.display(), experiments = experiments.len(), "loaded results file");

        records.extend(experiments.into_iter().map(ExperimentResult::flatten));
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::keys;
    use flate2::write::GzEncoder;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::TempDir;

    const RESULTS: &str = r#"[
        {
            "goalAchievementTime": 1500,
            "pathLength": 12,
            "errorMessage": null,
            "configuration": {
                "domainPath": "input/vacuum/dylan/uniform.vw",
                "algorithmName": "A_STAR",
                "actionDuration": 100
            }
        }
    ]"#;

    #[rstest(path, expected,
        case("results.json", Compression::None),
        case("results.json.gz", Compression::Gzip),
        case("results.json.zst", Compression::Zstd),
        case("results", Compression::None)
    )]
    fn compression_is_detected_from_extension(path: &str, expected: Compression) {
        assert_eq!(Compression::from_path(Path::new(path)), expected);
    }

    #[test]
    fn reads_plain_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.json");
        std::fs::write(&path, RESULTS).unwrap();

        let results = read_results(&path).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].configuration["algorithmName"],
            serde_json::json!("A_STAR")
        );
    }

    #[test]
    fn reads_gzip_json_from_given_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("experiments.json.gz");

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(RESULTS.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let results = read_results(&path).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn reads_zstd_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.json.zst");
        let compressed = zstd::encode_all(RESULTS.as_bytes(), 3).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let results = read_results(&path).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        let result = read_results(&path);
        assert!(matches!(result, Err(ParsingError::MissingInput(p)) if p == path));
    }

    #[test]
    fn invalid_json_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_results(&path),
            Err(ParsingError::JsonParse { .. })
        ));
    }

    #[test]
    fn load_records_concatenates_experiments_then_base() {
        let temp_dir = TempDir::new().unwrap();
        let experiments = temp_dir.path().join("results.json");
        let base = temp_dir.path().join("base_results.json");
        std::fs::write(
            &experiments,
            r#"[{ "configuration": { "algorithmName": "CES" } }]"#,
        )
        .unwrap();
        std::fs::write(&base, RESULTS).unwrap();

        let records = load_records(&[experiments], &[base]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].str_field(keys::ALGORITHM_NAME), Some("CES"));
        assert_eq!(records[1].str_field(keys::ALGORITHM_NAME), Some("A_STAR"));
        assert_eq!(records[1].f64_field(keys::PATH_LENGTH), Some(12.0));
    }
}
