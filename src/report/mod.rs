//! Report module - page planning, export and terminal summary

pub mod diagnostics_report;
pub mod pages;
pub mod summary;

pub use diagnostics_report::*;
pub use pages::*;
pub use summary::*;
