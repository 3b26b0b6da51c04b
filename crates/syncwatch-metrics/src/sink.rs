//! Metric sink — the live set of gauge series exposed to scrapers.
//!
//! Writers are the per-target collection tasks of a poll cycle; the reader
//! is the `/metrics` handler. Application series recorded during a cycle go
//! into a staged generation that replaces the live one on
//! [`MetricSink::commit_cycle`], so a scrape sees either the previous cycle
//! or the finished one, never a half-built one.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::debug;

use syncwatch_core::AppObservation;

/// Static description of one gauge family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    /// Unprefixed metric name.
    pub name: &'static str,
    pub help: &'static str,
    /// Label names, in exposition order.
    pub labels: &'static [&'static str],
}

pub const APP_INFO: MetricDesc = MetricDesc {
    name: "app_info",
    help: "App metadata",
    labels: &[
        "server",
        "app_name",
        "project",
        "health_status",
        "sync_status",
        "namespace",
        "cluster",
    ],
};

pub const APP_HEALTH_STATUS: MetricDesc = MetricDesc {
    name: "app_health_status",
    help: "1=Healthy",
    labels: &["server", "app_name", "project", "namespace", "cluster"],
};

pub const APP_SYNC_STATUS: MetricDesc = MetricDesc {
    name: "app_sync_status",
    help: "1=Synced",
    labels: &["server", "app_name", "project", "namespace", "cluster"],
};

pub const UP: MetricDesc = MetricDesc {
    name: "up",
    help: "Controller API reachability",
    labels: &["server"],
};

/// Families in exposition order. Indices below refer into this array.
const FAMILIES: [&MetricDesc; 4] = [&APP_INFO, &APP_HEALTH_STATUS, &APP_SYNC_STATUS, &UP];

const INFO: usize = 0;
const HEALTH: usize = 1;
const SYNC: usize = 2;
const REACHABILITY: usize = 3;

/// Label values (ordered as in the family's `labels`) → gauge value.
type Series = BTreeMap<Vec<String>, f64>;

/// Live families plus the application generation of the open cycle.
///
/// `staged` holds info, health and sync (indices `INFO..REACHABILITY`).
#[derive(Debug, Default)]
struct Families {
    live: [Series; 4],
    staged: Option<[Series; 3]>,
}

impl Families {
    /// Where application series are written: the staged generation while a
    /// cycle is open, the live families otherwise.
    fn apps_mut(&mut self) -> &mut [Series] {
        match &mut self.staged {
            Some(staged) => staged.as_mut_slice(),
            None => &mut self.live[..REACHABILITY],
        }
    }
}

/// One series as seen in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Sample {
    /// Value of label `name`, if the family has it.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Point-in-time copy of one family.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    /// Exposed (possibly prefixed) metric name.
    pub name: String,
    pub help: &'static str,
    /// Sorted by label values.
    pub samples: Vec<Sample>,
}

/// Shared gauge store written by the collector and read by the exporter.
#[derive(Debug, Default)]
pub struct MetricSink {
    prefix: Option<String>,
    families: RwLock<Families>,
}

impl MetricSink {
    /// Create an empty sink with unprefixed metric names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink whose names are exposed as `<prefix>_<name>`.
    pub fn with_prefix(prefix: Option<String>) -> Self {
        Self {
            prefix,
            families: RwLock::default(),
        }
    }

    /// Exposed name of a family.
    pub fn metric_name(&self, desc: &MetricDesc) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{}", desc.name),
            None => desc.name.to_string(),
        }
    }

    /// Open a new cycle with an empty application generation.
    ///
    /// The live series stay visible until [`commit_cycle`](Self::commit_cycle).
    /// Reachability is not part of the generation.
    pub async fn begin_cycle(&self) {
        let mut families = self.families.write().await;
        if families.staged.replace(Default::default()).is_some() {
            debug!("previous cycle was never committed, discarding it");
        }
    }

    /// Replace the live application series with the staged generation.
    ///
    /// No-op when no cycle is open.
    pub async fn commit_cycle(&self) {
        let mut families = self.families.write().await;
        let Some([info, health, sync]) = families.staged.take() else {
            return;
        };
        let replaced = families.live[INFO].len();
        let published = info.len();
        families.live[INFO] = info;
        families.live[HEALTH] = health;
        families.live[SYNC] = sync;
        debug!(replaced, published, "application series committed");
    }

    /// Drop the application series `target` wrote in the open cycle.
    pub async fn discard_target(&self, target: &str) {
        let mut families = self.families.write().await;
        for series in families.apps_mut() {
            series.retain(|key, _| key[0] != target);
        }
    }

    /// Upsert the info, health and sync series for one application.
    pub async fn record_app(&self, obs: &AppObservation) {
        let info_key = vec![
            obs.target.clone(),
            obs.name.clone(),
            obs.project.clone(),
            obs.health_status.clone(),
            obs.sync_status.clone(),
            obs.namespace.clone(),
            obs.cluster.clone(),
        ];
        let key = vec![
            obs.target.clone(),
            obs.name.clone(),
            obs.project.clone(),
            obs.namespace.clone(),
            obs.cluster.clone(),
        ];

        let mut families = self.families.write().await;
        let apps = families.apps_mut();
        apps[INFO].insert(info_key, 1.0);
        apps[HEALTH].insert(key.clone(), gauge(obs.is_healthy()));
        apps[SYNC].insert(key, gauge(obs.is_synced()));
    }

    /// Set `up{server=target}`.
    pub async fn record_reachability(&self, target: &str, up: bool) {
        let mut families = self.families.write().await;
        families.live[REACHABILITY].insert(vec![target.to_string()], gauge(up));
    }

    /// Copy every family under a single read lock.
    pub async fn snapshot(&self) -> Vec<FamilySnapshot> {
        let families = self.families.read().await;
        FAMILIES
            .iter()
            .zip(families.live.iter())
            .map(|(desc, series)| FamilySnapshot {
                name: self.metric_name(desc),
                help: desc.help,
                samples: series
                    .iter()
                    .map(|(values, value)| to_sample(desc, values, *value))
                    .collect(),
            })
            .collect()
    }

    /// Value of the series whose labels are exactly `labels`.
    ///
    /// Returns `None` if the family is unknown, a label is missing or
    /// extra, or no such series exists.
    pub async fn value(&self, desc: &MetricDesc, labels: &[(&str, &str)]) -> Option<f64> {
        let idx = family_index(desc)?;
        if labels.len() != desc.labels.len() {
            return None;
        }
        let key = desc
            .labels
            .iter()
            .map(|name| {
                labels
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.to_string())
            })
            .collect::<Option<Vec<String>>>()?;

        let families = self.families.read().await;
        families.live[idx].get(&key).copied()
    }

    /// All series of a family whose labels include every pair in `labels`.
    pub async fn series_matching(&self, desc: &MetricDesc, labels: &[(&str, &str)]) -> Vec<Sample> {
        let Some(idx) = family_index(desc) else {
            return Vec::new();
        };
        let Some(wanted) = labels
            .iter()
            .map(|(k, v)| desc.labels.iter().position(|l| l == k).map(|i| (i, *v)))
            .collect::<Option<Vec<(usize, &str)>>>()
        else {
            return Vec::new();
        };

        let families = self.families.read().await;
        families.live[idx]
            .iter()
            .filter(|(values, _)| wanted.iter().all(|(i, v)| values[*i] == *v))
            .map(|(values, value)| to_sample(desc, values, *value))
            .collect()
    }

    /// Number of series currently held for a family.
    pub async fn len(&self, desc: &MetricDesc) -> usize {
        match family_index(desc) {
            Some(idx) => self.families.read().await.live[idx].len(),
            None => 0,
        }
    }

    /// Render the current snapshot in the Prometheus text format.
    pub async fn render(&self) -> String {
        crate::prometheus::render_prometheus(&self.snapshot().await)
    }
}

fn family_index(desc: &MetricDesc) -> Option<usize> {
    FAMILIES.iter().position(|d| d.name == desc.name)
}

fn to_sample(desc: &MetricDesc, values: &[String], value: f64) -> Sample {
    Sample {
        labels: desc.labels.iter().copied().zip(values.iter().cloned()).collect(),
        value,
    }
}

fn gauge(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
