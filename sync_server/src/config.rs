use serde::Deserialize;
use std::time::Duration;

/// Service configuration, read from environment variables
/// (`BIND_ADDRESS`, `PAGE_TEMPLATE`, `MAX_SESSIONS`, `SESSION_IDLE_SECS`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_page_template")]
    pub page_template: String,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1:3030".to_string()
}

fn default_page_template() -> String {
    "showcase".to_string()
}

const fn default_max_sessions() -> usize {
    1000
}

const fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Config {
    pub const fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            page_template: default_page_template(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{Figment, providers::Serialized};

    #[test]
    fn test_defaults_apply_to_missing_fields() {
        let figment = Figment::from(Serialized::defaults(
            serde_json::json!({ "max_sessions": 5 }),
        ));
        let config: Config = figment.extract().unwrap();

        assert_eq!(config.max_sessions, 5);
        assert_eq!(config.bind_address, "127.0.0.1:3030");
        assert_eq!(config.page_template, "showcase");
        assert_eq!(config.session_idle(), Duration::from_secs(1800));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let figment = Figment::from(Serialized::defaults(
            serde_json::json!({ "max_sessions": "many" }),
        ));
        assert!(figment.extract::<Config>().is_err());
    }
}
