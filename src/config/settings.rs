use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub hub: HubSettings,
    pub log: LogSettings,
}

/// Address the WebSocket listener binds to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Tuning knobs for the hub loop and its delivery channels.
///
/// `enqueue_timeout_ms` is unset by default: a subscriber whose servicer
/// stops draining then stalls the publish or sweep pass it is part of. Set it
/// to evict such subscribers after the given number of milliseconds instead.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HubSettings {
    pub sweep_interval_ms: u64,
    pub event_capacity: usize,
    pub delivery_capacity: usize,
    pub enqueue_timeout_ms: Option<u64>,
}

impl HubSettings {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn enqueue_timeout(&self) -> Option<Duration> {
        self.enqueue_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from [`Settings::default`].
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub hub: Option<PartialHubSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHubSettings {
    pub sweep_interval_ms: Option<u64>,
    pub event_capacity: Option<usize>,
    pub delivery_capacity: Option<usize>,
    pub enqueue_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 14902,
            },
            hub: HubSettings::default(),
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            sweep_interval_ms: 1000,
            event_capacity: 64,
            delivery_capacity: 16,
            enqueue_timeout_ms: None,
        }
    }
}
