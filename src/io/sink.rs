use crate::error::Result;
use crate::pipeline::{ResultSink, RunOutput};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp format used in snapshot file names (microsecond resolution).
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Files written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFiles {
    /// Timestamp stem shared by the four files, including any collision suffix.
    pub stem: String,
    /// `skill_clusters_<stem>.csv`
    pub skills: PathBuf,
    /// `cluster_stats_<stem>.csv`
    pub clusters: PathBuf,
    /// `clustering_summary_<stem>.json`
    pub summary: PathBuf,
    /// `model_<stem>.json`
    pub model: PathBuf,
}

impl SnapshotFiles {
    fn in_dir(dir: &Path, stem: String) -> Self {
        Self {
            skills: dir.join(format!("skill_clusters_{stem}.csv")),
            clusters: dir.join(format!("cluster_stats_{stem}.csv")),
            summary: dir.join(format!("clustering_summary_{stem}.json")),
            model: dir.join(format!("model_{stem}.json")),
            stem,
        }
    }

    /// All four paths.
    pub fn paths(&self) -> [&Path; 4] {
        [&self.skills, &self.clusters, &self.summary, &self.model]
    }

    fn any_exists(&self) -> bool {
        self.paths().iter().any(|p| p.exists())
    }
}

/// Writes each run as a set of timestamped files in one directory.
///
/// Per run:
///
/// - `skill_clusters_<ts>.csv`: skills joined with their cluster id
/// - `cluster_stats_<ts>.csv`: one row per cluster
/// - `clustering_summary_<ts>.json`: the run summary
/// - `model_<ts>.json`: centroids and scaler
///
/// Snapshots are append-only: if a file for `<ts>` already exists the run gets
/// a `-1`, `-2`, ... suffix, and files are opened with `create_new` so an
/// existing snapshot is never truncated.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    last: Option<SnapshotFiles>,
}

impl DirectorySink {
    /// Sink writing into `dir`; the directory is created on first persist.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            last: None,
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files of the most recent successful persist.
    pub fn last_snapshot(&self) -> Option<&SnapshotFiles> {
        self.last.as_ref()
    }

    /// First unused set of snapshot paths for timestamp `ts`.
    fn reserve(&self, ts: &str) -> SnapshotFiles {
        let mut files = SnapshotFiles::in_dir(&self.dir, ts.to_string());
        let mut suffix = 1;
        while files.any_exists() {
            files = SnapshotFiles::in_dir(&self.dir, format!("{ts}-{suffix}"));
            suffix += 1;
        }
        files
    }

    fn create(path: &Path) -> Result<File> {
        Ok(OpenOptions::new().write(true).create_new(true).open(path)?)
    }

    fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(Self::create(path)?, value)?;
        Ok(())
    }

    fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Self::create(path)?);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ResultSink for DirectorySink {
    fn persist(&mut self, output: &RunOutput) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let ts = output
            .summary
            .run_timestamp
            .format(SNAPSHOT_TIMESTAMP_FORMAT)
            .to_string();
        let files = self.reserve(&ts);

        Self::write_csv(&files.skills, &output.skills)?;
        Self::write_csv(&files.clusters, &output.clusters)?;
        Self::write_json(&files.summary, &output.summary)?;
        Self::write_json(&files.model, &output.model_snapshot())?;

        info!(dir = %self.dir.display(), snapshot = %files.stem, "stored clustering results");
        self.last = Some(files);
        Ok(())
    }
}

/// Keeps every persisted run in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    runs: Vec<RunOutput>,
}

impl MemorySink {
    /// Runs persisted so far, oldest first.
    pub fn runs(&self) -> &[RunOutput] {
        &self.runs
    }
}

impl ResultSink for MemorySink {
    fn persist(&mut self, output: &RunOutput) -> Result<()> {
        self.runs.push(output.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_suffixes_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let first = sink.reserve("20260101_000000_000000");
        assert_eq!(first.stem, "20260101_000000_000000");

        fs::write(&first.summary, "{}").unwrap();
        let second = sink.reserve("20260101_000000_000000");
        assert_eq!(second.stem, "20260101_000000_000000-1");

        fs::write(&second.model, "{}").unwrap();
        assert_eq!(
            sink.reserve("20260101_000000_000000").stem,
            "20260101_000000_000000-2"
        );
    }

    #[test]
    fn test_create_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster_stats_x.csv");
        fs::write(&path, "kept").unwrap();
        assert!(DirectorySink::create(&path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
    }
}
