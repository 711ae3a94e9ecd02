//! Data sources and result sinks.
//!
//! The pipeline only sees the [`DataSource`](crate::pipeline::DataSource) and
//! [`ResultSink`](crate::pipeline::ResultSink) traits; these are the
//! implementations shipped with the crate.

mod sink;
mod source;

pub use sink::{DirectorySink, MemorySink, SnapshotFiles, SNAPSHOT_TIMESTAMP_FORMAT};
pub use source::{CsvSource, JsonLinesSource, MemorySource};
