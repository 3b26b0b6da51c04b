//! syncwatch-collector — polls controllers and feeds the metric sink.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   └── every interval: Collector::run_cycle()
//!         ├── MetricSink::begin_cycle()
//!         ├── one task per target
//!         │   ├── AppSource::fetch() → Vec<RawAppRecord> | FetchError
//!         │   ├── normalize() each record
//!         │   └── MetricSink::record_app() / record_reachability()
//!         ├── MetricSink::commit_cycle()
//!         └── CycleReport
//! ```
//!
//! A failing target only turns its own `up` series to 0. It contributes no
//! application series to the new generation, so once the cycle commits its
//! previous series are gone until it answers again.

pub mod client;
pub mod collector;
pub mod error;
pub mod scheduler;

pub use client::{AppSource, HttpAppSource};
pub use collector::{Collector, CycleReport};
pub use error::{FetchError, FetchResult};
pub use scheduler::Scheduler;
