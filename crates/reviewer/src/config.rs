// path: crates/reviewer/src/config.rs
use std::str::FromStr;
use std::time::Duration;

use megascan_view::window::{DEFAULT_RADIUS, DEFAULT_SKIP_STEP};
use megascan_view::{FilterState, PageLimit, PageType, Status};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewerConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub page_type: PageType,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub limit: PageLimit,
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,
    #[serde(default = "default_skip_step")]
    pub skip_step: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_base() -> String { "http://127.0.0.1:1234".into() }
fn default_window_radius() -> usize { DEFAULT_RADIUS }
fn default_skip_step() -> usize { DEFAULT_SKIP_STEP }
fn default_timeout_ms() -> u64 { 10_000 }

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            page_type: PageType::default(),
            status: Status::default(),
            limit: PageLimit::default(),
            window_radius: default_window_radius(),
            skip_step: default_skip_step(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ReviewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Собрать конфиг из произвольного источника переменных (env, карта в тестах).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(api) = get("MEGASCAN_API") {
            cfg.api_base = api;
        }
        parse_var(&get, "MEGASCAN_PAGETYPE", &mut cfg.page_type)?;
        parse_var(&get, "MEGASCAN_STATUS", &mut cfg.status)?;
        parse_var(&get, "MEGASCAN_LIMIT", &mut cfg.limit)?;
        parse_var(&get, "MEGASCAN_WINDOW_RADIUS", &mut cfg.window_radius)?;
        parse_var(&get, "MEGASCAN_SKIP_STEP", &mut cfg.skip_step)?;
        parse_var(&get, "MEGASCAN_TIMEOUT_MS", &mut cfg.timeout_ms)?;
        Ok(cfg)
    }

    pub fn filter(&self) -> FilterState {
        FilterState::new(self.status, self.limit)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_var<F, T>(get: &F, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = get(var) else {
        return Ok(());
    };
    *slot = value.parse().map_err(|e: T::Err| ConfigError {
        var,
        value: value.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}
