//! Dashboard tree model orchestrator.
//!
//! The model types live in the private `core` module; lookup helpers are
//! public under [`lookup`]. Hosts import everything from here.

mod core;
pub mod lookup;

pub use self::core::{
    Column, ColumnId, ConfigMap, DashboardModel, Row, WidgetId, WidgetInstance, ensure_ids,
};
