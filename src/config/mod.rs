//! Configuration loading.
//!
//! Values come from an optional `config/default.*` file, then from
//! `BROLLY__<SECTION>__<FIELD>` environment variables, and finally fall back
//! to [`Settings::default`].

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{HubSettings, LogSettings, ServerSettings, Settings};

const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Loads the configuration from `config/default` and the environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Loads the configuration from the given file (extension optional, file
/// optional) and the environment, merged over the defaults.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("BROLLY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    let settings = Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        hub: HubSettings {
            sweep_interval_ms: partial
                .hub
                .as_ref()
                .and_then(|h| h.sweep_interval_ms)
                .unwrap_or(default.hub.sweep_interval_ms),
            event_capacity: partial
                .hub
                .as_ref()
                .and_then(|h| h.event_capacity)
                .unwrap_or(default.hub.event_capacity),
            delivery_capacity: partial
                .hub
                .as_ref()
                .and_then(|h| h.delivery_capacity)
                .unwrap_or(default.hub.delivery_capacity),
            enqueue_timeout_ms: partial
                .hub
                .as_ref()
                .and_then(|h| h.enqueue_timeout_ms)
                .or(default.hub.enqueue_timeout_ms),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    };

    validate(&settings)?;
    Ok(settings)
}

// tokio channels panic on a zero capacity, and a zero period would spin the sweeper
fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.hub.event_capacity == 0 {
        return Err(ConfigError::Message(
            "hub.event_capacity must be at least 1".to_string(),
        ));
    }
    if settings.hub.delivery_capacity == 0 {
        return Err(ConfigError::Message(
            "hub.delivery_capacity must be at least 1".to_string(),
        ));
    }
    if settings.hub.sweep_interval_ms == 0 {
        return Err(ConfigError::Message(
            "hub.sweep_interval_ms must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
