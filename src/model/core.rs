use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::IdGenerator;

pub type ColumnId = u64;
pub type WidgetId = u64;

/// Instance configuration map. Nested objects are allowed; the update
/// module merges them key by key.
pub type ConfigMap = Map<String, Value>;

/// Root of one dashboard. The model is the unit of persistence: hosts
/// serialize it as-is and hand it back via the engine's adopt entry
/// point. Field names follow the persisted camelCase shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_template_url: Option<String>,
    /// Name of the currently applied structure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
}

impl DashboardModel {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Total widget count across every leaf column, split columns included.
    pub fn widget_count(&self) -> usize {
        count_in_rows(&self.rows)
    }
}

fn count_in_rows(rows: &[Row]) -> usize {
    rows.iter()
        .flat_map(|row| row.columns.iter())
        .map(|column| {
            if column.is_split() {
                count_in_rows(&column.rows)
            } else {
                column.widgets.len()
            }
        })
        .sum()
}

/// A horizontal band of columns. Rows carry no id; they are not
/// individually targeted by events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style_class: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
}

impl Row {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            style_class: String::new(),
            columns,
        }
    }

    pub fn with_style(style_class: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            style_class: style_class.into(),
            columns,
        }
    }
}

/// A layout cell. A column either hosts widgets directly (leaf) or
/// nested rows (split); `rows` being non-empty makes it a split column
/// and nothing may push widgets into it. The id is assigned on first
/// visit and stays stable for the column's lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style_class: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub widgets: Vec<WidgetInstance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Row>,
}

impl Column {
    pub fn leaf(style_class: impl Into<String>) -> Self {
        Self {
            style_class: style_class.into(),
            ..Self::default()
        }
    }

    pub fn split(style_class: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            style_class: style_class.into(),
            rows,
            ..Self::default()
        }
    }

    pub fn with_widgets(mut self, widgets: Vec<WidgetInstance>) -> Self {
        self.widgets = widgets;
        self
    }

    pub fn is_split(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// A configured widget placed on the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WidgetId>,
    /// Key into the widget registry. Unregistered types render as inert.
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Broadcast-group tag matched by config-update routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub config: ConfigMap,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub card: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
}

impl WidgetInstance {
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    pub fn with_broadcast(mut self, tag: impl Into<String>) -> Self {
        self.broadcast = Some(tag.into());
        self
    }
}

/// Assign ids to every column and widget that does not have one yet.
/// Existing ids are left alone, so widget identity survives structure
/// changes while freshly instantiated columns pick up new ids.
pub fn ensure_ids(model: &mut DashboardModel, ids: &IdGenerator) {
    ensure_row_ids(&mut model.rows, ids);
}

fn ensure_row_ids(rows: &mut [Row], ids: &IdGenerator) {
    for row in rows {
        for column in &mut row.columns {
            if column.id.is_none() {
                column.id = Some(ids.next_id());
            }
            if column.is_split() {
                ensure_row_ids(&mut column.rows, ids);
            } else {
                for widget in &mut column.widgets {
                    if widget.id.is_none() {
                        widget.id = Some(ids.next_id());
                    }
                }
            }
        }
    }
}
