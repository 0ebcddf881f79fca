use serde_json::Value;

use crate::model::{ConfigMap, DashboardModel, WidgetId, lookup};

/// Addresses the widget instance(s) a config update applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingKey {
    /// One instance, by id.
    Widget(WidgetId),
    /// Every instance carrying this broadcast-group tag.
    Broadcast(String),
}

/// Reload signal for the rendering collaborator. The core never reloads
/// content itself; it hands these out and the renderer acts on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetReload {
    pub widget_id: WidgetId,
    pub widget_type: String,
}

/// Deep-merge `patch` into `base`: nested objects merge key by key,
/// scalars and arrays are replaced wholesale. Applying the same patch
/// twice yields the same map as applying it once.
pub fn merge_config(base: &mut ConfigMap, patch: &ConfigMap) {
    for (key, value) in patch {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = base.get_mut(key) {
                merge_config(existing, incoming);
                continue;
            }
        }
        base.insert(key.clone(), value.clone());
    }
}

/// Merge `patch` into every widget the key routes to. Returns a reload
/// notification per widget whose config actually changed; re-applying an
/// identical patch routes to the same widgets but changes nothing and
/// emits nothing.
pub fn apply_config_update(
    model: &mut DashboardModel,
    key: &RoutingKey,
    patch: &ConfigMap,
) -> Vec<WidgetReload> {
    let mut reloads = Vec::new();
    lookup::for_each_widget_mut(model, |widget| {
        let matched = match key {
            RoutingKey::Widget(id) => widget.id == Some(*id),
            RoutingKey::Broadcast(tag) => widget.broadcast.as_deref() == Some(tag.as_str()),
        };
        if !matched {
            return;
        }

        let before = config_digest(&widget.config);
        merge_config(&mut widget.config, patch);
        if config_digest(&widget.config) != before
            && let Some(id) = widget.id
        {
            reloads.push(WidgetReload {
                widget_id: id,
                widget_type: widget.widget_type.clone(),
            });
        }
    });
    reloads
}

/// Explicit reload request for one widget. `None` when the id routes
/// nowhere, which callers treat as a normal outcome.
pub fn request_reload(model: &DashboardModel, widget_id: WidgetId) -> Option<WidgetReload> {
    lookup::locate_widget(model, widget_id).map(|widget| WidgetReload {
        widget_id,
        widget_type: widget.widget_type.clone(),
    })
}

fn config_digest(config: &ConfigMap) -> blake3::Hash {
    let bytes = serde_json::to_vec(config).unwrap_or_default();
    blake3::hash(&bytes)
}
