//! Runtime layer for the attendance dashboard.
//!
//! Resolves which files to read, memoizes the load and keeps the current
//! filter selection for one dashboard session.

pub mod data_manager;
pub mod session;
pub mod sources;

pub use attendance_core as core;
pub use attendance_data as data;
