//! Names, labels and unit constants shared by the analysis modules

/// Algorithm whose runs provide the reference optimum for every domain instance
pub const REFERENCE_ALGORITHM: &str = "A_STAR";

/// Algorithm family whose backlog ratio distinguishes separate variants
pub const BACKLOG_ALGORITHM: &str = "CES";

/// Backlog ratio assumed when a record does not carry one
pub const DEFAULT_BACKLOG_RATIO: f64 = 1.0;

/// Nanoseconds in a millisecond (planning times are recorded in nanoseconds)
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Label of the X axis on every goal achievement time plot
pub const EXPANSION_LIMIT_LABEL: &str = "Expansion Limit (Per Iteration)";

/// Label of the Y axis on every goal achievement time plot
pub const WITHIN_OPTIMAL_LABEL: &str = "Goal Achievement Time (Factor of Optimal)";

/// Suffix stripped from domain file names when naming per-domain plots
pub const DOMAIN_FILE_SUFFIX: &str = ".vw";
