use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;

/// URL scheme used to reach the registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a run needs besides the target and credential lists.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub scheme: Scheme,
    /// Applied to every request; `None` means wait indefinitely.
    pub timeout: Option<Duration>,
    /// Fetch `/v2/_catalog` after a successful login.
    pub capture_details: bool,
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            timeout: None,
            capture_details: false,
            workers: default_workers(),
        }
    }
}

/// Upper bound on parallel workers.
pub const MAX_WORKERS: usize = 1024;

/// Host parallelism, between one and `MAX_WORKERS`.
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_WORKERS)
}

/// Validate a worker count given on the command line.
pub fn check_workers(workers: usize) -> Result<usize> {
    if workers == 0 || workers > MAX_WORKERS {
        bail!("workers must be between 1 and {MAX_WORKERS}, got {workers}");
    }
    Ok(workers)
}

/// Convert a timeout given in (fractional) seconds. Non-positive,
/// non-finite and out-of-range values are rejected.
pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("timeout must be a positive number of seconds, got {secs}");
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("timeout too large: {secs}"))
}
