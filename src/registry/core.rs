use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::model::{ConfigMap, Row};

/// Where a widget's content template comes from. The engine never loads
/// templates itself; the rendering collaborator does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Inline(String),
    Url(String),
}

/// Definition of a widget type. Immutable at runtime from the core's
/// perspective; instances get deep copies of the default config, never a
/// reference into the registry.
#[derive(Debug, Clone, Default)]
pub struct WidgetDefinition {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Default configuration copied onto newly added instances.
    pub config: ConfigMap,
    /// Opaque controller binding for the rendering layer.
    pub controller: Option<String>,
    pub template: Option<TemplateSource>,
    /// Reload the widget content after its view closes. Defaults to false.
    pub reload_on_close: bool,
    pub edit: Option<EditMode>,
}

impl WidgetDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn with_template(mut self, template: TemplateSource) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_edit(mut self, edit: EditMode) -> Self {
        self.edit = Some(edit);
        self
    }

    pub fn reload_on_close(mut self, reload: bool) -> Self {
        self.reload_on_close = reload;
        self
    }
}

/// Edit-mode variant of a widget definition.
#[derive(Debug, Clone)]
pub struct EditMode {
    pub controller: Option<String>,
    pub template: Option<TemplateSource>,
    pub config: ConfigMap,
    /// Defaults to true: closing the edit view reloads the widget.
    pub reload_on_close: bool,
}

impl Default for EditMode {
    fn default() -> Self {
        Self {
            controller: None,
            template: None,
            config: ConfigMap::new(),
            reload_on_close: true,
        }
    }
}

impl EditMode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Catalog of known widget types. Registration overwrites by name, so
/// re-registering at startup is idempotent.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    entries: HashMap<String, WidgetDefinition>,
    widgets_path: String,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, definition: WidgetDefinition) -> &mut Self {
        self.entries.insert(name.into(), definition);
        self
    }

    pub fn definition(&self, name: &str) -> Option<&WidgetDefinition> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Base path substituted for the `{widgetsPath}` placeholder in
    /// template urls.
    pub fn set_widgets_path(&mut self, path: impl Into<String>) {
        self.widgets_path = path.into();
    }

    pub fn widgets_path(&self) -> &str {
        &self.widgets_path
    }

    /// Expand the `{widgetsPath}` placeholder in a template url. The
    /// resulting url is cleaned of one doubled slash and any leading
    /// slash so relative template roots keep working.
    pub fn resolve_template_url(&self, url: &str) -> String {
        if !url.contains("{widgetsPath}") {
            return url.to_string();
        }
        let mut resolved = url
            .replace("{widgetsPath}", &self.widgets_path)
            .replacen("//", "/", 1);
        if resolved.starts_with('/') {
            resolved.remove(0);
        }
        resolved
    }

    /// Deep copy of the default config for a widget type. The copy is
    /// the instance's own; mutating it never touches the registry.
    pub fn default_config(&self, name: &str) -> Result<ConfigMap> {
        self.entries
            .get(name)
            .map(|def| def.config.clone())
            .ok_or_else(|| DashboardError::WidgetTypeNotFound(name.to_string()))
    }
}

/// A named layout skeleton: rows and columns with style annotations, no
/// widgets, no ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Structure {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

/// Catalog of layout structures. The stored prototypes are never handed
/// out by reference for mutation; models get deep copies.
#[derive(Debug, Default)]
pub struct StructureRegistry {
    entries: HashMap<String, Structure>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, structure: Structure) -> &mut Self {
        self.entries.insert(name.into(), structure);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Structure> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Fresh instance of a structure's row tree.
    pub fn instantiate(&self, name: &str) -> Result<Vec<Row>> {
        self.entries
            .get(name)
            .map(|structure| structure.rows.clone())
            .ok_or_else(|| DashboardError::StructureNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use serde_json::json;

    fn two_column() -> Structure {
        Structure::new(vec![Row::new(vec![
            Column::leaf("s4"),
            Column::leaf("s8"),
        ])])
    }

    #[test]
    fn register_overwrites_by_name() {
        let mut registry = WidgetRegistry::new();
        registry.register("clock", WidgetDefinition::new().with_title("Clock"));
        registry.register("clock", WidgetDefinition::new().with_title("Wall Clock"));

        let def = registry.definition("clock").unwrap();
        assert_eq!(def.title.as_deref(), Some("Wall Clock"));
        assert_eq!(registry.names().count(), 1);
    }

    #[test]
    fn reload_flags_default_false_and_edit_true() {
        let def = WidgetDefinition::new().with_edit(EditMode::new());
        assert!(!def.reload_on_close);
        assert!(def.edit.unwrap().reload_on_close);
    }

    #[test]
    fn default_config_is_a_copy() {
        let mut registry = WidgetRegistry::new();
        let mut config = ConfigMap::new();
        config.insert("interval".into(), json!(60));
        registry.register("clock", WidgetDefinition::new().with_config(config));

        let mut copy = registry.default_config("clock").unwrap();
        copy.insert("interval".into(), json!(5));

        let stored = registry.default_config("clock").unwrap();
        assert_eq!(stored.get("interval"), Some(&json!(60)));
    }

    #[test]
    fn default_config_unknown_type_errors() {
        let registry = WidgetRegistry::new();
        let err = registry.default_config("nope").unwrap_err();
        assert!(matches!(err, DashboardError::WidgetTypeNotFound(name) if name == "nope"));
    }

    #[test]
    fn resolve_template_url_substitutes_path() {
        let mut registry = WidgetRegistry::new();
        registry.set_widgets_path("widgets");
        assert_eq!(
            registry.resolve_template_url("{widgetsPath}/clock/view.html"),
            "widgets/clock/view.html"
        );
        // Empty path collapses the leftover slash.
        let bare = WidgetRegistry::new();
        assert_eq!(
            bare.resolve_template_url("{widgetsPath}/clock/view.html"),
            "clock/view.html"
        );
        // Urls without the placeholder pass through untouched.
        assert_eq!(
            registry.resolve_template_url("assets/view.html"),
            "assets/view.html"
        );
    }

    #[test]
    fn instantiate_returns_fresh_rows() {
        let mut registry = StructureRegistry::new();
        registry.register("two-column", two_column());

        let mut rows = registry.instantiate("two-column").unwrap();
        rows[0].columns[0].style_class = "mutated".into();

        let again = registry.instantiate("two-column").unwrap();
        assert_eq!(again[0].columns[0].style_class, "s4");
    }

    #[test]
    fn instantiate_unknown_structure_errors() {
        let registry = StructureRegistry::new();
        let err = registry.instantiate("nonexistent").unwrap_err();
        assert!(matches!(err, DashboardError::StructureNotFound(name) if name == "nonexistent"));
    }
}
