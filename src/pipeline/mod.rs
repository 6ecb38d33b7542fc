//! Pipeline module - loading, aggregation and derived diagnostics tables

pub mod aggregate;
pub mod binning;
pub mod coerce;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod median;
pub mod missing;
pub mod outliers;
pub mod overview;
pub mod proportion;
pub mod records;
pub mod rollup;
pub mod table;

pub use aggregate::*;
pub use binning::{bin_values, plan_binning, BinningPlan, EqualWidthBins};
pub use coerce::*;
pub use diagnostics::*;
pub use error::DiagnosticsError;
pub use loader::*;
pub use median::*;
pub use missing::*;
pub use outliers::*;
pub use overview::*;
pub use proportion::*;
pub use records::{
    FeatureType, FeatureValue, FeatureValueCount, MedianRecord, MissingRateRecord,
    ProportionRecord, MISSING_SENTINEL,
};
pub use rollup::*;
pub use table::*;
