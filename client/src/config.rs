use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Per-session configuration.
///
/// Deserializable so consumers can embed it directly in their own config
/// files; every field except `url` has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// MJPEG stream endpoint, e.g. `http://camera.local/stream`.
    pub url: String,
    /// Extra request headers merged into the GET.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Continuous delivery (`true`) or stop after the first frame (`false`).
    #[serde(default = "default_live")]
    pub live: bool,
    /// Budget for the whole connect phase, including response headers.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Longest allowed gap without a completed frame before the connection
    /// is presumed stalled.
    #[serde(default = "default_frame_timeout_ms")]
    pub frame_timeout_ms: u64,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            live: default_live(),
            connect_timeout_ms: default_connect_timeout_ms(),
            frame_timeout_ms: default_frame_timeout_ms(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}

fn default_live() -> bool {
    true
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_frame_timeout_ms() -> u64 {
    3000
}
