//! featdiag: Feature Diagnostics Library
//!
//! Aggregates dataset features by month and target value: value counts with
//! an explicit missing bucket, equal-width binning of continuous features,
//! target proportions, monthly missing rates and medians, and a chart page
//! plan built from those tables.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
