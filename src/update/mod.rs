//! Widget config update orchestrator.
//!
//! Deep merge, routing keys and reload notifications live in the private
//! `core` module.

mod core;

pub use self::core::{RoutingKey, WidgetReload, apply_config_update, merge_config, request_reload};
