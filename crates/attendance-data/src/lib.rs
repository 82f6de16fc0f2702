//! Data layer for the attendance dashboard.
//!
//! Reads the attendance and master spreadsheets, joins them into a
//! [`dataset::Dataset`], applies user filters and computes the grouped
//! aggregates that the report hands to the presentation layer.

pub mod aggregator;
pub mod analysis;
pub mod dataset;
pub mod filter;
pub mod reader;
pub mod sheet;

pub use attendance_core as core;
