//! Dashboard-layout engine core.
//!
//! Maintains a tree-shaped dashboard model (rows of columns, columns of
//! widgets or nested rows), swaps the model between named layout
//! structures while preserving widget placement, and routes config
//! updates and reload signals to individual widget instances. Rendering
//! and data fetching are external collaborators: they read the tree and
//! consume the notifications this crate hands out, nothing more.

pub mod engine;
pub mod error;
pub mod identity;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod update;

pub use engine::{DashboardEngine, EngineConfig};
pub use error::{DashboardError, Result};
pub use identity::{IdGenerator, SharedIds};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use model::lookup::{
    detach_widget, find_column, find_column_mut, find_widget, find_widget_mut,
    first_leaf_column_mut, locate_widget,
};
pub use model::{
    Column, ColumnId, ConfigMap, DashboardModel, Row, WidgetId, WidgetInstance, ensure_ids,
};
pub use reconcile::{ReconcileReport, change_structure};
pub use registry::{
    EditMode, Structure, StructureRegistry, TemplateSource, WidgetDefinition, WidgetRegistry,
};
pub use update::{RoutingKey, WidgetReload, apply_config_update, merge_config, request_reload};
