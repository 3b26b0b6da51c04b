//! Poll cycle — concurrent fetch across targets into the metric sink.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use syncwatch_core::{TargetDescriptor, normalize};
use syncwatch_metrics::MetricSink;

use crate::client::AppSource;

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Targets whose listing was fetched.
    pub targets_up: usize,
    /// Targets whose fetch failed.
    pub targets_down: usize,
    /// Application records written across all reachable targets.
    pub applications: usize,
    pub elapsed: Duration,
}

/// Runs poll cycles over a fixed target list.
pub struct Collector<S> {
    targets: Arc<[TargetDescriptor]>,
    source: Arc<S>,
    sink: Arc<MetricSink>,
}

impl<S: AppSource> Collector<S> {
    pub fn new(targets: Vec<TargetDescriptor>, source: Arc<S>, sink: Arc<MetricSink>) -> Self {
        Self {
            targets: targets.into(),
            source,
            sink,
        }
    }

    pub fn targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    pub fn sink(&self) -> &Arc<MetricSink> {
        &self.sink
    }

    /// Run one cycle: fetch every target concurrently into a fresh
    /// application generation, then publish it in one step.
    ///
    /// Scrapes during the cycle keep seeing the previous generation.
    /// Returns once every target has either been recorded or marked down.
    /// A panicking fetch only takes down its own target.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        self.sink.begin_cycle().await;

        let handles: Vec<_> = self
            .targets
            .iter()
            .map(|target| {
                let target = target.clone();
                let source = Arc::clone(&self.source);
                let sink = Arc::clone(&self.sink);
                tokio::spawn(async move { collect_target(source.as_ref(), &sink, &target).await })
            })
            .collect();

        let mut report = CycleReport::default();
        for (target, handle) in self.targets.iter().zip(handles) {
            match handle.await {
                Ok(Some(apps)) => {
                    report.targets_up += 1;
                    report.applications += apps;
                }
                Ok(None) => report.targets_down += 1,
                Err(e) => {
                    error!(server = %target.endpoint, error = %e, "collection task failed");
                    self.sink.discard_target(&target.endpoint).await;
                    self.sink.record_reachability(&target.endpoint, false).await;
                    report.targets_down += 1;
                }
            }
        }

        self.sink.commit_cycle().await;
        report.elapsed = started.elapsed();
        report
    }
}

/// Fetch and record one target. Returns the number of applications
/// written, or `None` if the target was unreachable.
async fn collect_target<S: AppSource>(
    source: &S,
    sink: &MetricSink,
    target: &TargetDescriptor,
) -> Option<usize> {
    match source.fetch(target).await {
        Ok(records) => {
            sink.record_reachability(&target.endpoint, true).await;
            for record in &records {
                sink.record_app(&normalize(&target.endpoint, record)).await;
            }
            debug!(server = %target.endpoint, apps = records.len(), "target collected");
            Some(records.len())
        }
        Err(e) => {
            error!(server = %target.endpoint, error = %e, "scrape failed");
            sink.record_reachability(&target.endpoint, false).await;
            None
        }
    }
}
