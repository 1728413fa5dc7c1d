//! Analysis stages of the goal achievement time pipeline
//!
//! This module contains:
//! - Preparation of scored observations (failure filter, reference join, `withinOpt`)
//! - The aggregated analysis (comparison plot, text report)
//! - CPU time statistics
//! - Per-domain plots

pub mod aggregate;
pub mod constants;
pub mod cpu_time;
pub mod domains;
pub mod optimality;

// Re-export analysis functions for convenience
pub use aggregate::{generate_aggregated_analysis, generate_aggregated_plot};
pub use domains::generate_domain_plots;
pub use optimality::prepare_observations;
