//! Terminal UI layer for the attendance dashboard.
//!
//! Provides themes, the header and hour-bar components, the report views
//! and the application event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod table_view;
pub mod themes;

pub use attendance_core as core;
