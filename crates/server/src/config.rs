use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub catalog_path: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8787".into(),
            catalog_path: None,
            max_body_bytes: 16 * 1024,
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then `file` (if present), then environment overrides.
pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(&raw)
            .with_context(|| format!("failed to parse '{}'", file.display()))?;
        if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
            settings.server_bind = v.to_string();
        }
        if let Some(v) = file_cfg.get("catalog_path").and_then(toml::Value::as_str) {
            settings.catalog_path = Some(PathBuf::from(v));
        }
        if let Some(v) = file_cfg.get("max_body_bytes").and_then(toml::Value::as_integer) {
            settings.max_body_bytes = usize::try_from(v).context("max_body_bytes out of range")?;
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__CATALOG_PATH") {
        settings.catalog_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_body_bytes = parsed;
        }
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
