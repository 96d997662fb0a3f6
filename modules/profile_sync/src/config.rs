use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the profile_sync module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSyncConfig {
    /// Base URL of the REST profile store.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Session cache file. Relative paths resolve against the app home dir.
    #[serde(default = "default_session_file")]
    pub session_file: String,
    /// Per-request timeout, e.g. "10s". Absent waits indefinitely.
    #[serde(with = "humantime_serde", default)]
    pub request_timeout: Option<Duration>,
    /// Rating shown for users nobody has rated yet; null shows none.
    #[serde(default = "default_rating")]
    pub default_rating: Option<f64>,
}

impl Default for ProfileSyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: default_session_file(),
            request_timeout: None,
            default_rating: default_rating(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_session_file() -> String {
    "session.json".to_string()
}

fn default_rating() -> Option<f64> {
    Some(4.5)
}
