//! Delivery configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level assessforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Output directory for attempt reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report formats written by default: json, html, markdown, or all.
    #[serde(default = "default_format")]
    pub format: String,
    /// Fail the run when any recorded response is rejected as late.
    #[serde(default)]
    pub strict: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./assessforge-results")
}

fn default_format() -> String {
    "json".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: default_format(),
            strict: false,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the well-known paths.
///
/// Search order without an explicit path:
/// 1. `assessforge.toml` in the current directory
/// 2. `~/.config/assessforge/config.toml`
///
/// Environment variable override: `ASSESSFORGE_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<DeliveryConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("assessforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DeliveryConfig::default(),
    };

    if let Ok(dir) = std::env::var("ASSESSFORGE_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    Ok(config)
}

/// Parse a config string and expand `${VAR}` references in it.
pub fn parse_config_str(content: &str) -> Result<DeliveryConfig> {
    let mut config: DeliveryConfig = toml::from_str(content)?;
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));
    config.format = resolve_env_vars(&config.format);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("assessforge"))
}
