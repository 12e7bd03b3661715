use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::{EngineConfig, MAX_WORKERS};
use crate::partition::partition;
use crate::probe::{HttpProbe, Probe};
use crate::report::StatusReporter;
use crate::types::{Credential, RunResults, Target};
use crate::worker::{Worker, WorkerOutput};

/// Runs every credential against every target across a fixed pool of workers.
///
/// - Targets are split once into `config.workers` contiguous shards.
/// - Each shard is handled by one tokio task; tasks share only the read-only
///   inputs and the status reporter.
/// - Results are merged after all tasks have been joined.
pub struct Engine {
    config: EngineConfig,
    probe: Arc<dyn Probe>,
    reporter: Arc<StatusReporter>,
}

impl Engine {
    pub fn new(config: EngineConfig, probe: Arc<dyn Probe>, reporter: Arc<StatusReporter>) -> Self {
        Self {
            config,
            probe,
            reporter,
        }
    }

    /// Engine backed by the real registry probe.
    pub fn http(config: EngineConfig, reporter: Arc<StatusReporter>) -> Result<Self> {
        let probe = Arc::new(HttpProbe::new(&config)?);
        Ok(Self::new(config, probe, reporter))
    }

    pub async fn run(
        &self,
        targets: Arc<[Target]>,
        credentials: Arc<[Credential]>,
    ) -> Result<RunResults> {
        let start = Instant::now();
        let workers = self.config.workers.clamp(1, MAX_WORKERS);
        let shards = partition(&targets[..], workers);
        info!(
            workers = shards.len(),
            targets = targets.len(),
            credentials = credentials.len(),
            "starting run"
        );

        let mut set = JoinSet::new();
        for (index, shard) in shards.into_iter().enumerate() {
            debug!(worker = index, size = shard.len(), "spawning worker");
            let shard: Vec<Target> = shard.to_vec();
            let credentials = credentials.clone();
            let worker = Worker::new(index, self.probe.clone(), self.reporter.clone());
            set.spawn(async move { worker.run(&shard, &credentials).await });
        }

        let mut outputs = Vec::with_capacity(workers);
        while let Some(res) = set.join_next().await {
            outputs.push(res.context("worker task failed")?);
        }

        let mut results = merge(outputs);
        results.elapsed = start.elapsed();
        info!(
            successes = results.successes.len(),
            attempts = results.stats.attempts,
            "run finished"
        );
        Ok(results)
    }
}

/// Union of all worker maps, applied in shard order. Shards hold disjoint
/// targets, so only a target listed twice in the input can collide; the
/// higher shard wins in that case.
pub fn merge(mut outputs: Vec<WorkerOutput>) -> RunResults {
    outputs.sort_by_key(|o| o.index);
    let mut results = RunResults::default();
    for output in outputs {
        results.stats.absorb(&output.stats);
        results.successes.extend(output.successes);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProbeOutcome, ProbeReport, RunStats, SuccessRecord};
    use async_trait::async_trait;
    use std::io;
    use std::time::Duration;

    fn record(target: &str, user: &str) -> SuccessRecord {
        SuccessRecord {
            target: target.into(),
            credential: Credential::new(user, "pw"),
            details: None,
        }
    }

    fn output(index: usize, records: &[(&str, &str)]) -> WorkerOutput {
        let mut out = WorkerOutput { index, ..WorkerOutput::default() };
        for (t, u) in records {
            out.successes.insert(t.to_string(), record(t, u));
            out.stats.record(&ProbeOutcome::Authorized(None));
        }
        out
    }

    #[test]
    fn merge_is_disjoint_union() {
        let results = merge(vec![
            output(1, &[("c", "u3")]),
            output(0, &[("a", "u1"), ("b", "u2")]),
            output(2, &[]),
        ]);
        assert_eq!(
            results.successes.keys().cloned().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(results.stats.authorized, 3);
    }

    #[test]
    fn duplicate_target_across_shards_keeps_later_shard() {
        let results = merge(vec![output(1, &[("dup", "late")]), output(0, &[("dup", "early")])]);
        assert_eq!(results.successes["dup"].credential.username, "late");
    }

    /// Authorizes targets whose name starts with "open".
    struct PrefixProbe;

    #[async_trait]
    impl Probe for PrefixProbe {
        async fn probe(&self, target: &str, _credential: &Credential) -> ProbeReport {
            let outcome = if target.starts_with("open") {
                ProbeOutcome::Authorized(None)
            } else {
                ProbeOutcome::Denied
            };
            ProbeReport { outcome, elapsed: Duration::ZERO }
        }
    }

    #[tokio::test]
    async fn every_pair_attempted_once() {
        let config = EngineConfig { workers: 3, ..EngineConfig::default() };
        let reporter = Arc::new(StatusReporter::new(Box::new(io::sink()), false));
        let engine = Engine::new(config, Arc::new(PrefixProbe), reporter);
        let targets: Arc<[Target]> = ["open-1", "closed", "open-2", "closed-2", "open-3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let credentials: Arc<[Credential]> =
            vec![Credential::new("a", "1"), Credential::new("b", "2")].into();
        let results = engine.run(targets, credentials).await.unwrap();
        assert_eq!(
            results.stats,
            RunStats { attempts: 10, authorized: 6, denied: 4, errors: 0 }
        );
        assert_eq!(results.successes.len(), 3);
        for record in results.successes.values() {
            assert_eq!(record.credential.username, "b");
        }
    }

    #[tokio::test]
    async fn oversized_worker_count_is_capped() {
        let config = EngineConfig { workers: usize::MAX / 4, ..EngineConfig::default() };
        let reporter = Arc::new(StatusReporter::new(Box::new(io::sink()), false));
        let engine = Engine::new(config, Arc::new(PrefixProbe), reporter);
        let targets: Arc<[Target]> = vec!["open-1".to_string(), "closed".to_string()].into();
        let results = engine
            .run(targets, vec![Credential::anonymous()].into())
            .await
            .unwrap();
        assert_eq!(results.stats.attempts, 2);
        assert_eq!(results.successes.len(), 1);
    }
}
