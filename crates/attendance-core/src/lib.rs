//! Shared types for the attendance dashboard.
//!
//! Typed attendance and master-list records, filter criteria, result table
//! shapes, the error taxonomy, date parsing, number formatting and the CLI
//! settings layer.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, ErrorKind, Result};
