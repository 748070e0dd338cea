//! Harness settings taken from the environment.
//!
//! Values set on a `FuzzTestInput` win over the environment, which wins over
//! the defaults. Setting `CONVERSION_FUZZ_SEED` replays a reported failure.

use crate::error::ConfigError;

/// Iterations per phase when nothing else is configured.
pub const DEFAULT_ITERATIONS: usize = 10_000;

pub const ITERATIONS_ENV: &str = "CONVERSION_FUZZ_ITERATIONS";
pub const SEED_ENV: &str = "CONVERSION_FUZZ_SEED";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(HarnessConfig {
            iterations: parse(&lookup, ITERATIONS_ENV)?,
            seed: parse(&lookup, SEED_ENV)?,
        })
    }

    pub fn iterations_or_default(&self) -> usize {
        self.iterations.unwrap_or(DEFAULT_ITERATIONS)
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue { key, value: raw.clone(), reason: e.to_string() }),
        _ => Ok(None),
    }
}
