//! Scheduler — drives the collector on a fixed interval.
//!
//! The next cycle starts `interval` after the previous one finished, so
//! cycles never overlap and a slow cycle is never followed by a burst of
//! catch-up runs.

use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::client::AppSource;
use crate::collector::Collector;

pub struct Scheduler<S> {
    collector: Collector<S>,
    interval: Duration,
}

impl<S: AppSource> Scheduler<S> {
    pub fn new(collector: Collector<S>, interval: Duration) -> Self {
        Self {
            collector,
            interval,
        }
    }

    pub fn collector(&self) -> &Collector<S> {
        &self.collector
    }

    /// Run cycles until shutdown is signalled.
    ///
    /// The first cycle starts immediately. Shutdown is observed between
    /// cycles; an in-flight cycle is bounded by the client timeout.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            targets = self.collector.targets().len(),
            "scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.collector.run_cycle().await;
            info!(
                up = report.targets_up,
                down = report.targets_down,
                apps = report.applications,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "poll cycle complete"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("scheduler shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use syncwatch_core::{RawAppRecord, TargetDescriptor};
    use syncwatch_metrics::MetricSink;
    use tokio::time::Instant;

    use crate::error::FetchResult;

    /// Counts fetches; each one takes `delay` of (virtual) time.
    struct TimedSource {
        delay: Duration,
        starts: Mutex<Vec<Instant>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl TimedSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                starts: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }

        fn starts(&self) -> Vec<Instant> {
            self.starts.lock().unwrap().clone()
        }
    }

    impl AppSource for TimedSource {
        async fn fetch(&self, _target: &TargetDescriptor) -> FetchResult<Vec<RawAppRecord>> {
            self.starts.lock().unwrap().push(Instant::now());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn scheduler(source: Arc<TimedSource>, interval: Duration) -> Scheduler<TimedSource> {
        let collector = Collector::new(
            vec![TargetDescriptor::new("https://ctrl.example.com", "t")],
            source,
            Arc::new(MetricSink::new()),
        );
        Scheduler::new(collector, interval)
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_is_immediate_then_fixed_cadence() {
        let source = TimedSource::new(Duration::ZERO);
        let sched = scheduler(Arc::clone(&source), Duration::from_secs(30));
        let (tx, rx) = watch::channel(false);
        let origin = Instant::now();

        let handle = tokio::spawn(async move { sched.run(rx).await });

        tokio::time::sleep(Duration::from_secs(65)).await;
        let offsets: Vec<u64> = source
            .starts()
            .iter()
            .map(|t| (*t - origin).as_secs())
            .collect();
        assert_eq!(offsets, [0u64, 30, 60]);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycles_do_not_overlap_or_catch_up() {
        let source = TimedSource::new(Duration::from_secs(50));
        let sched = scheduler(Arc::clone(&source), Duration::from_secs(30));
        let (tx, rx) = watch::channel(false);
        let origin = Instant::now();

        let handle = tokio::spawn(async move { sched.run(rx).await });

        tokio::time::sleep(Duration::from_secs(170)).await;
        let offsets: Vec<u64> = source
            .starts()
            .iter()
            .map(|t| (*t - origin).as_secs())
            .collect();
        // 50s fetch + 30s pause between starts.
        assert_eq!(offsets, [0u64, 80, 160]);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_the_pause() {
        let source = TimedSource::new(Duration::ZERO);
        let sched = scheduler(Arc::clone(&source), Duration::from_secs(3600));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { sched.run(rx).await });

        tokio::time::sleep(Duration::from_secs(10)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(source.starts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn already_signalled_shutdown_runs_nothing() {
        let source = TimedSource::new(Duration::ZERO);
        let sched = scheduler(Arc::clone(&source), Duration::from_secs(30));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        sched.run(rx).await;
        assert!(source.starts().is_empty());
    }
}
