//! syncwatch-metrics — the metric sink and its text exposition.
//!
//! The sink holds four gauge families. Three describe applications and are
//! rebuilt by every poll cycle, then swapped in whole; the fourth, `up`,
//! tracks per-target reachability and is only ever overwritten.
//!
//! # Architecture
//!
//! ```text
//! MetricSink
//!   ├── begin_cycle()          → opens an empty app_info / app_health_status / app_sync_status generation
//!   ├── record_app()           ← one call per normalized application
//!   ├── record_reachability()  ← one call per target per cycle
//!   ├── commit_cycle()         → staged generation replaces the live one
//!   └── snapshot()             → Vec<FamilySnapshot>
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod prometheus;
pub mod sink;

pub use prometheus::{CONTENT_TYPE, render_prometheus};
pub use sink::{
    APP_HEALTH_STATUS, APP_INFO, APP_SYNC_STATUS, FamilySnapshot, MetricDesc, MetricSink, Sample,
    UP,
};
