//! Scheduler configuration

use serde::{Deserialize, Serialize};

/// Order in which a tick visits registered channels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOrder {
    /// Most recently inserted channel first
    #[default]
    NewestFirst,
    /// Insertion order
    OldestFirst,
}

/// Configuration for a [`ChannelScheduler`](crate::ChannelScheduler)
///
/// Hosts typically embed this in their own settings file:
///
/// ```toml
/// label = "hud"
/// order = "oldest_first"
/// max_channels = 64
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Name included in tracing events
    pub label: String,
    /// Channel visiting order during a tick
    pub order: TickOrder,
    /// Soft limit on registered channels; exceeding it logs a warning
    pub max_channels: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            label: "cadence".to_string(),
            order: TickOrder::NewestFirst,
            max_channels: None,
        }
    }
}

impl SchedulerConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: TickOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_max_channels(mut self, max: usize) -> Self {
        self.max_channels = Some(max);
        self
    }
}
