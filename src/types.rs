use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A `host[:port]` address of one registry instance.
pub type Target = String;

/// A username/password pair. Both fields empty means an anonymous probe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The credential used to look for unauthenticated access.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.password)
    }
}

/// Repository catalog captured after a successful login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Details {
    pub repositories: serde_json::Value,
}

/// Classification of one login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Reachable, and authentication was accepted or not required.
    Authorized(Option<Details>),
    /// Reachable, authentication explicitly rejected.
    Denied,
    /// Anything that could not be classified as `Denied`.
    Error(String),
}

/// One classified attempt plus the wall-clock time it took.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub outcome: ProbeOutcome,
    pub elapsed: Duration,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SuccessRecord {
    pub target: Target,
    pub credential: Credential,
    pub details: Option<Details>,
}

/// Target -> last successful credential seen for it.
pub type AggregatedResult = BTreeMap<Target, SuccessRecord>;

/// Per-outcome counters, kept per worker and summed at join time.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub attempts: u64,
    pub authorized: u64,
    pub denied: u64,
    pub errors: u64,
}

impl RunStats {
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        self.attempts += 1;
        match outcome {
            ProbeOutcome::Authorized(_) => self.authorized += 1,
            ProbeOutcome::Denied => self.denied += 1,
            ProbeOutcome::Error(_) => self.errors += 1,
        }
    }

    pub fn absorb(&mut self, other: &RunStats) {
        self.attempts += other.attempts;
        self.authorized += other.authorized;
        self.denied += other.denied;
        self.errors += other.errors;
    }
}

/// What the engine hands back to the caller once every worker has finished.
#[derive(Debug, Clone, Default)]
pub struct RunResults {
    pub successes: AggregatedResult,
    pub stats: RunStats,
    pub elapsed: Duration,
}

impl RunResults {
    /// Attempts per second over the whole run.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.stats.attempts as f64 / secs
        } else {
            0.0
        }
    }
}
