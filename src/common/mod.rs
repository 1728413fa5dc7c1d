//! Common infrastructure modules shared across analysis phases
//!
//! This module provides reusable infrastructure for:
//! - Data structures for experiment records and observations
//! - ASCII table formatting for text reports
//! - Plotting line charts
//! - Progress reporting

pub mod data_structures;
pub mod plots;
pub mod progress;
pub mod tables;

// Re-export commonly used items
pub use plots::PlotError;
