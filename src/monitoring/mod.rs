pub mod charts;
pub mod cli;
pub mod cycle_reporter;
pub mod history;
pub mod sinks;

pub use cycle_reporter::{ClockSource, CycleReporter, FixedClock, SystemClock};
pub use sinks::SnapshotSink;
