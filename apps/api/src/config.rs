use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};

/// Which selection strategy the service assembles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Greedy,
    Annealing,
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(StrategyKind::Greedy),
            "annealing" => Ok(StrategyKind::Annealing),
            other => Err(anyhow!("unknown selection strategy '{other}' (expected greedy|annealing)")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub selection_strategy: StrategyKind,
    pub annealing_iterations: u32,
    pub annealing_seed: u64,
    /// Upper bound on pool length accepted at the HTTP boundary.
    pub max_pool_size: usize,
    /// Wall-clock budget for one engine call.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            selection_strategy: StrategyKind::Greedy,
            annealing_iterations: 2000,
            annealing_seed: 42,
            max_pool_size: 5000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;
        if request_timeout_secs == 0 {
            return Err(anyhow!("Environment variable 'REQUEST_TIMEOUT_SECS' must be at least 1"));
        }

        Ok(Config {
            port: parse_var("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            selection_strategy: parse_var("SELECTION_STRATEGY", defaults.selection_strategy)?,
            annealing_iterations: parse_var("ANNEALING_ITERATIONS", defaults.annealing_iterations)?,
            annealing_seed: parse_var("ANNEALING_SEED", defaults.annealing_seed)?,
            max_pool_size: parse_var("MAX_POOL_SIZE", defaults.max_pool_size)?,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("Environment variable '{key}' is invalid: {e}")),
        Err(_) => Ok(default),
    }
}
