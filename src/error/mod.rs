//! Error module orchestrator.
//!
//! Public error types live in the private `types` module and are
//! re-exported from here.

mod types;

pub use types::{DashboardError, Result};
