use std::sync::Arc;

use tracing::debug;

use crate::probe::Probe;
use crate::report::StatusReporter;
use crate::types::{AggregatedResult, Credential, ProbeOutcome, RunStats, SuccessRecord, Target};

/// What one worker hands back when its shard is exhausted.
#[derive(Debug, Clone, Default)]
pub struct WorkerOutput {
    pub index: usize,
    pub successes: AggregatedResult,
    pub stats: RunStats,
}

/// Drives the probe over one shard of targets.
pub struct Worker {
    index: usize,
    probe: Arc<dyn Probe>,
    reporter: Arc<StatusReporter>,
}

impl Worker {
    pub fn new(index: usize, probe: Arc<dyn Probe>, reporter: Arc<StatusReporter>) -> Self {
        Self {
            index,
            probe,
            reporter,
        }
    }

    /// Try every credential (outer loop) against every target in the shard
    /// (inner loop). A later success for the same target replaces the earlier
    /// one; denials and errors are reported and skipped.
    pub async fn run(&self, shard: &[Target], credentials: &[Credential]) -> WorkerOutput {
        let mut out = WorkerOutput {
            index: self.index,
            ..WorkerOutput::default()
        };
        for credential in credentials {
            for target in shard {
                let report = self.probe.probe(target, credential).await;
                out.stats.record(&report.outcome);
                self.reporter.probe(self.index, target, credential, &report);
                if let ProbeOutcome::Authorized(details) = report.outcome {
                    out.successes.insert(
                        target.clone(),
                        SuccessRecord {
                            target: target.clone(),
                            credential: credential.clone(),
                            details,
                        },
                    );
                }
            }
        }
        debug!(
            worker = self.index,
            attempts = out.stats.attempts,
            successes = out.successes.len(),
            "shard finished"
        );
        out
    }
}
