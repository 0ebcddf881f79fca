use std::time::Duration;

use serde_json::json;

use crate::logging::{LogEvent, LogFields, LogLevel};

/// Counters accumulated across engine operations.
#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    structure_changes: u64,
    widgets_moved: u64,
    widgets_dropped: u64,
    config_updates: u64,
    reloads: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_structure_change(&mut self, moved: usize, dropped: usize) {
        self.structure_changes = self.structure_changes.saturating_add(1);
        self.widgets_moved = self.widgets_moved.saturating_add(moved as u64);
        self.widgets_dropped = self.widgets_dropped.saturating_add(dropped as u64);
    }

    pub fn record_config_update(&mut self, reloads: usize) {
        self.config_updates = self.config_updates.saturating_add(1);
        self.reloads = self.reloads.saturating_add(reloads as u64);
    }

    pub fn record_reload(&mut self) {
        self.reloads = self.reloads.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            structure_changes: self.structure_changes,
            widgets_moved: self.widgets_moved,
            widgets_dropped: self.widgets_dropped,
            config_updates: self.config_updates,
            reloads: self.reloads,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub uptime_ms: u64,
    pub structure_changes: u64,
    pub widgets_moved: u64,
    pub widgets_dropped: u64,
    pub config_updates: u64,
    pub reloads: u64,
}

impl MetricsSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        let mut fields = LogFields::new();
        fields.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        fields.insert(
            "structure_changes".to_string(),
            json!(self.structure_changes),
        );
        fields.insert("widgets_moved".to_string(), json!(self.widgets_moved));
        fields.insert("widgets_dropped".to_string(), json!(self.widgets_dropped));
        fields.insert("config_updates".to_string(), json!(self.config_updates));
        fields.insert("reloads".to_string(), json!(self.reloads));
        LogEvent {
            fields,
            ..LogEvent::new(LogLevel::Info, target, "engine_metrics")
        }
    }
}
