use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

use super::types::AppConfig;

pub const DEFAULT_CONFIG_FILE: &str = "linetrace.toml";

/// `linetrace.toml` from the working directory if present, defaults otherwise,
/// then env overrides.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    let cfg = if path.exists() {
        tracing::debug!(target: "linetrace.config", path = %path.display(), "loading config file");
        read_file(path)?
    } else {
        tracing::debug!(target: "linetrace.config", "no config file, using defaults");
        AppConfig::default()
    };
    finish(cfg)
}

/// An explicit config path must exist.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    finish(read_file(path)?)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(ConfigError::Parse)
}

fn finish(mut cfg: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Apply `LINETRACE_*` overrides. `lookup` is the environment.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LINETRACE_TIMEOUT_SECS") {
        if !v.trim().is_empty() {
            cfg.control.timeout_secs =
                v.trim().parse::<f64>().map_err(|_| ConfigError::EnvInvalid {
                    key: "LINETRACE_TIMEOUT_SECS".to_string(),
                    value: v.clone(),
                })?;
        }
    }

    if let Some(v) = lookup("LINETRACE_EVENTS_OUT") {
        if !v.trim().is_empty() {
            cfg.events_out.enabled = true;
            cfg.events_out.path = v.trim().to_string();
        }
    }

    if let Some(v) = lookup("LINETRACE_DEBUG") {
        cfg.diagnostics.enabled = match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" | "" => false,
            _ => {
                return Err(ConfigError::EnvInvalid {
                    key: "LINETRACE_DEBUG".to_string(),
                    value: v,
                })
            }
        };
    }

    Ok(())
}

pub fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if Duration::try_from_secs_f64(cfg.control.timeout_secs).is_err() {
        return Err(ConfigError::Validation(format!(
            "control.timeout_secs must be a non-negative number of seconds that fits a duration, got {}",
            cfg.control.timeout_secs
        )));
    }
    if cfg.codec.max_frame_bytes == 0 {
        return Err(ConfigError::Validation(
            "codec.max_frame_bytes must be greater than 0".to_string(),
        ));
    }
    if cfg.diagnostics.width < 20 {
        return Err(ConfigError::Validation(format!(
            "diagnostics.width must be at least 20, got {}",
            cfg.diagnostics.width
        )));
    }
    if cfg.events_out.enabled && cfg.events_out.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "events_out.path is empty while events_out is enabled".to_string(),
        ));
    }
    Ok(())
}
