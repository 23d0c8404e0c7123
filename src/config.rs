//! Engine configuration with environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::DEFAULT_COLOR;
use crate::input::{Tool, UnknownTool};

pub const DEFAULT_HTTP_URL: &str = "http://localhost:3001";
pub const DEFAULT_EXPORT_BACKGROUND: &str = "#ffffff";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SKETCHROOM_INITIAL_TOOL: {0}")]
    Tool(#[from] UnknownTool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Base URL of the room service that serves persisted shapes.
    pub http_url: String,
    /// Stroke color for new shapes until the user picks another.
    pub default_color: String,
    /// Tool active when the session starts.
    pub initial_tool: Tool,
    /// Opaque fill behind raster exports.
    pub export_background: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http_url: DEFAULT_HTTP_URL.to_owned(),
            default_color: DEFAULT_COLOR.to_owned(),
            initial_tool: Tool::Rect,
            export_background: DEFAULT_EXPORT_BACKGROUND.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `SKETCHROOM_HTTP_URL`: room service base URL (trailing `/` trimmed)
    /// - `SKETCHROOM_DEFAULT_COLOR`: initial stroke color
    /// - `SKETCHROOM_INITIAL_TOOL`: `select`, `rect`, `circle`, `diamond`, `text`, `pencil`, `pan`
    /// - `SKETCHROOM_EXPORT_BACKGROUND`: raster export background
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Tool`] for an unknown tool name.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let http_url = env_or("SKETCHROOM_HTTP_URL", defaults.http_url)
            .trim_end_matches('/')
            .to_owned();
        let default_color = env_or("SKETCHROOM_DEFAULT_COLOR", defaults.default_color);
        let initial_tool = match std::env::var("SKETCHROOM_INITIAL_TOOL") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.initial_tool,
        };
        let export_background = env_or("SKETCHROOM_EXPORT_BACKGROUND", defaults.export_background);

        Ok(Self { http_url, default_color, initial_tool, export_background })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .map(|v| v.trim().to_owned())
        .into_iter()
        .find(|v| !v.is_empty())
        .unwrap_or(default)
}
