//! Registry module orchestrator.
//!
//! Widget and structure catalogs are registered at startup and read-only
//! afterwards; the implementation lives in the private `core` module.

mod core;

pub use self::core::{
    EditMode, Structure, StructureRegistry, TemplateSource, WidgetDefinition, WidgetRegistry,
};
