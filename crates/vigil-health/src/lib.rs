//! vigil-health — periodic health checking with transition-only alerting.
//!
//! # Architecture
//!
//! ```text
//! Scheduler (one task, one cycle at a time)
//!   ├── ConfigProvider::current()          (cycle boundary only)
//!   ├── for each target, in order:
//!   │   ├── HealthProbe::fetch() → JSON | ProbeError
//!   │   └── evaluator → CycleReport fragment
//!   ├── tracker::process_cycle(fragments, prior) → CycleOutcome
//!   ├── Notifier::deliver()                (only if the action asks)
//!   └── commit outcome.new_state as the next prior
//! ```
//!
//! # Alerting
//!
//! Failures are diffed by [`FailureKey`](vigil_core::FailureKey). A cycle that
//! introduces any key not present in the previous cycle alerts with the full
//! list of current failures. A cycle that clears every failure alerts once
//! with a recovery message. Everything else stays quiet.

pub mod evaluator;
pub mod probe;
pub mod scheduler;
pub mod tracker;

pub use evaluator::{FormatError, evaluate, evaluate_probe_error, parse_checks};
pub use probe::{HealthProbe, HttpProbe, ProbeError};
pub use scheduler::Scheduler;
pub use tracker::{CycleOutcome, NotifyAction, TrackerStatus, process_cycle};
