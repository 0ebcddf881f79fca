use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::{DashboardError, Result};
use crate::identity::{IdGenerator, SharedIds};
use crate::logging::{LogEvent, LogLevel, Logger};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::model::{
    ConfigMap, DashboardModel, Row, WidgetId, WidgetInstance, ensure_ids, lookup,
};
use crate::reconcile::{self, ReconcileReport};
use crate::registry::{Structure, StructureRegistry, WidgetDefinition, WidgetRegistry};
use crate::update::{self, RoutingKey, WidgetReload};

const TARGET: &str = "dashframe::engine";

/// Configuration knobs for the engine.
#[derive(Clone)]
pub struct EngineConfig {
    /// Optional structured logger used by engine operations.
    pub logger: Option<Logger>,
    /// Metrics accumulator shared with the host.
    pub metrics: Option<Arc<Mutex<EngineMetrics>>>,
    /// Title applied to models that have none.
    pub default_title: String,
    /// Title template applied to models that have none. Opaque to the
    /// core; the rendering collaborator resolves it.
    pub title_template_url: Option<String>,
    /// Template the renderer substitutes a failure message into.
    pub message_template: String,
    /// Template shown while widget resources resolve.
    pub loading_template: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            default_title: "Dashboard".to_string(),
            title_template_url: None,
            message_template: r#"<div class="alert alert-danger">{}</div>"#.to_string(),
            loading_template: r#"<div class="progress"><span>loading ...</span></div>"#.to_string(),
        }
    }
}

impl EngineConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(EngineMetrics::new())));
        }
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<EngineMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Composition root: owns both registries, the id generator and the
/// engine config, and exposes the operations hosts and renderers call.
///
/// Models are not owned here. The engine mutates whichever model the
/// caller passes in, synchronously and to completion; hosts embedding it
/// in threads must serialize mutations per model.
pub struct DashboardEngine {
    widgets: WidgetRegistry,
    structures: StructureRegistry,
    ids: SharedIds,
    config: EngineConfig,
    started: Instant,
}

impl DashboardEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            widgets: WidgetRegistry::new(),
            structures: StructureRegistry::new(),
            ids: Arc::new(IdGenerator::new()),
            config,
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Startup registration surface. Overwrites by name.
    pub fn register_widget(
        &mut self,
        name: impl Into<String>,
        definition: WidgetDefinition,
    ) -> &mut Self {
        self.widgets.register(name, definition);
        self
    }

    /// Startup registration surface. Overwrites by name.
    pub fn register_structure(&mut self, name: impl Into<String>, structure: Structure) -> &mut Self {
        self.structures.register(name, structure);
        self
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.widgets
    }

    pub fn structures(&self) -> &StructureRegistry {
        &self.structures
    }

    /// Shared id generator handle. Every model created against this
    /// engine draws from the same counter.
    pub fn ids(&self) -> SharedIds {
        Arc::clone(&self.ids)
    }

    /// Bootstrap entry point. A model that already has rows is adopted
    /// as-is and the structure registry is not consulted; a model
    /// without rows (or no model at all) gets a fresh instance of the
    /// named structure. Title defaults are applied only if absent.
    pub fn create_or_adopt(
        &self,
        model: Option<DashboardModel>,
        structure: &str,
    ) -> Result<DashboardModel> {
        let (mut model, created) = match model {
            Some(model) if !model.rows.is_empty() => (model, false),
            Some(mut model) => {
                model.rows = self.instantiate_structure(structure)?;
                model.structure = Some(structure.to_string());
                (model, true)
            }
            None => {
                let mut model = DashboardModel::new(self.instantiate_structure(structure)?);
                model.structure = Some(structure.to_string());
                (model, true)
            }
        };

        self.apply_defaults(&mut model);
        ensure_ids(&mut model, &self.ids);

        self.log(
            LogEvent::new(
                LogLevel::Info,
                TARGET,
                if created { "model_created" } else { "model_adopted" },
            )
            .field("structure", model.structure.clone().unwrap_or_default())
            .field("widgets", model.widget_count() as u64),
        );

        Ok(model)
    }

    /// Swap the model onto a different structure, preserving widget
    /// placement. Fails without touching the model when the structure
    /// name is unknown.
    pub fn change_structure(
        &self,
        model: &mut DashboardModel,
        name: &str,
    ) -> Result<ReconcileReport> {
        match reconcile::change_structure(model, name, &self.structures, &self.ids) {
            Ok(report) => {
                self.apply_defaults(model);
                if let Some(metrics) = self.config.metrics.as_ref()
                    && let Ok(mut guard) = metrics.lock()
                {
                    guard.record_structure_change(report.widgets_moved, report.widgets_dropped);
                }
                self.log(
                    LogEvent::new(LogLevel::Info, TARGET, "structure_changed")
                        .field("structure", name)
                        .field("widgets_moved", report.widgets_moved as u64)
                        .field("widgets_dropped", report.widgets_dropped as u64),
                );
                Ok(report)
            }
            Err(err) => {
                self.log(
                    LogEvent::new(LogLevel::Error, TARGET, "could not find structure")
                        .field("structure", name),
                );
                Err(err)
            }
        }
    }

    /// Route a config update to the widget(s) the key addresses. Returns
    /// a reload notification per widget whose config changed, for the
    /// rendering collaborator to act on.
    pub fn apply_config_update(
        &self,
        model: &mut DashboardModel,
        key: &RoutingKey,
        patch: &ConfigMap,
    ) -> Vec<WidgetReload> {
        let reloads = update::apply_config_update(model, key, patch);
        if let Some(metrics) = self.config.metrics.as_ref()
            && let Ok(mut guard) = metrics.lock()
        {
            guard.record_config_update(reloads.len());
        }
        self.log(
            LogEvent::new(LogLevel::Debug, TARGET, "config_updated")
                .field("reloads", reloads.len() as u64),
        );
        reloads
    }

    /// Explicit reload signal for one widget.
    pub fn request_reload(
        &self,
        model: &DashboardModel,
        widget_id: WidgetId,
    ) -> Option<WidgetReload> {
        let reload = update::request_reload(model, widget_id);
        if reload.is_some()
            && let Some(metrics) = self.config.metrics.as_ref()
            && let Ok(mut guard) = metrics.lock()
        {
            guard.record_reload();
        }
        reload
    }

    /// Resolve a widget instance's definition. A miss is isolated to the
    /// one widget: it is logged and surfaced as a typed error for the
    /// renderer to translate into an inline message, never a tree-wide
    /// failure.
    pub fn definition_for(&self, widget: &WidgetInstance) -> Result<&WidgetDefinition> {
        self.widgets.definition(&widget.widget_type).ok_or_else(|| {
            self.log(
                LogEvent::new(LogLevel::Warn, TARGET, "could not find widget type")
                    .field("type", widget.widget_type.clone()),
            );
            DashboardError::WidgetTypeNotFound(widget.widget_type.clone())
        })
    }

    /// Add a widget of a registered type to the first leaf column,
    /// seeded with a copy of the type's default config.
    pub fn add_widget(&self, model: &mut DashboardModel, widget_type: &str) -> Result<WidgetId> {
        let config = self.widgets.default_config(widget_type).inspect_err(|_| {
            self.log(
                LogEvent::new(LogLevel::Warn, TARGET, "could not find widget type")
                    .field("type", widget_type),
            );
        })?;

        let Some(column) = lookup::first_leaf_column_mut(model) else {
            self.log(LogEvent::new(
                LogLevel::Error,
                TARGET,
                "model has no widget column",
            ));
            return Err(DashboardError::NoWidgetColumn);
        };

        let id = self.ids.next_id();
        column.widgets.push(WidgetInstance {
            id: Some(id),
            config,
            ..WidgetInstance::new(widget_type)
        });

        self.log(
            LogEvent::new(LogLevel::Debug, TARGET, "widget_added")
                .field("type", widget_type)
                .field("widget", id),
        );
        Ok(id)
    }

    /// Detach a widget instance from its owning column.
    pub fn remove_widget(
        &self,
        model: &mut DashboardModel,
        widget_id: WidgetId,
    ) -> Option<WidgetInstance> {
        let removed = lookup::detach_widget(model, widget_id);
        if removed.is_some() {
            self.log(
                LogEvent::new(LogLevel::Debug, TARGET, "widget_removed").field("widget", widget_id),
            );
        }
        removed
    }

    /// Snapshot of the engine counters, if metrics are enabled.
    pub fn metrics_snapshot(&self) -> Option<MetricsSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started.elapsed()))
    }

    fn instantiate_structure(&self, name: &str) -> Result<Vec<Row>> {
        self.structures.instantiate(name).inspect_err(|_| {
            self.log(
                LogEvent::new(LogLevel::Error, TARGET, "could not find structure")
                    .field("structure", name),
            );
        })
    }

    fn apply_defaults(&self, model: &mut DashboardModel) {
        if model.title.is_none() {
            model.title = Some(self.config.default_title.clone());
        }
        if model.title_template_url.is_none() {
            model.title_template_url = self.config.title_template_url.clone();
        }
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.emit(event);
        }
    }
}

impl Default for DashboardEngine {
    fn default() -> Self {
        Self::new()
    }
}
