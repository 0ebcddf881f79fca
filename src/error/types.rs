use thiserror::Error;

/// Unified result type for the dashboard engine.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors surfaced by the dashboard engine.
///
/// Lookup misses are not represented here; the lookup helpers return
/// `Option` because absence is a normal routing outcome.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Requested structure name is absent from the structure registry.
    /// The operation aborts before any model mutation.
    #[error("structure `{0}` is not registered")]
    StructureNotFound(String),
    /// A widget instance references a type the widget registry does not
    /// know. Isolated to the one widget; tree-wide passes continue.
    #[error("widget type `{0}` is not registered")]
    WidgetTypeNotFound(String),
    /// The model has no column that can host widgets.
    #[error("model has no widget column")]
    NoWidgetColumn,
}
