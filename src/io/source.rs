use crate::error::{Error, Result};
use crate::pipeline::DataSource;
use crate::record::{normalize, EmployeeSkillRecord, NormalizationStats, RawSkillRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

/// Records already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<EmployeeSkillRecord>,
}

impl MemorySource {
    /// Wrap clean records.
    pub fn new(records: Vec<EmployeeSkillRecord>) -> Self {
        Self { records }
    }

    /// Normalize raw rows and wrap the result.
    pub fn from_raw(rows: Vec<RawSkillRecord>) -> Self {
        Self::new(normalize(rows).0)
    }
}

impl DataSource for MemorySource {
    fn fetch(&mut self) -> Result<Vec<EmployeeSkillRecord>> {
        Ok(self.records.clone())
    }
}

/// Reads one JSON [`RawSkillRecord`] per line and normalizes them.
///
/// Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
    last_stats: Option<NormalizationStats>,
}

impl JsonLinesSource {
    /// Source over the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_stats: None,
        }
    }

    /// Normalization counts of the most recent fetch.
    pub fn last_stats(&self) -> Option<NormalizationStats> {
        self.last_stats
    }

    fn read_raw(&self) -> Result<Vec<RawSkillRecord>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut rows = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(&line).map_err(|e| Error::Parse {
                location: format!("{}:{}", self.path.display(), i + 1),
                message: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl DataSource for JsonLinesSource {
    fn fetch(&mut self) -> Result<Vec<EmployeeSkillRecord>> {
        let (records, stats) = load(&self.path, self.read_raw()?);
        self.last_stats = Some(stats);
        Ok(records)
    }
}

/// Reads a headed CSV file of [`RawSkillRecord`] rows and normalizes them.
///
/// Columns are matched by header name and may come in any order; unknown
/// columns are ignored and empty cells read as missing.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    last_stats: Option<NormalizationStats>,
}

impl CsvSource {
    /// Source over the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_stats: None,
        }
    }

    /// Normalization counts of the most recent fetch.
    pub fn last_stats(&self) -> Option<NormalizationStats> {
        self.last_stats
    }

    fn read_raw(&self) -> Result<Vec<RawSkillRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(File::open(&self.path)?);
        let mut rows = Vec::new();
        for row in reader.deserialize::<RawSkillRecord>() {
            let row = row.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                Error::Parse {
                    location: format!("{}:{}", self.path.display(), line),
                    message: e.to_string(),
                }
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl DataSource for CsvSource {
    fn fetch(&mut self) -> Result<Vec<EmployeeSkillRecord>> {
        let (records, stats) = load(&self.path, self.read_raw()?);
        self.last_stats = Some(stats);
        Ok(records)
    }
}

fn load(path: &Path, rows: Vec<RawSkillRecord>) -> (Vec<EmployeeSkillRecord>, NormalizationStats) {
    let (records, stats) = normalize(rows);
    info!(
        path = %path.display(),
        read = stats.read,
        kept = records.len(),
        duplicates = stats.duplicates,
        "loaded skill records"
    );
    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_json_lines_source_normalizes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"employee_id": "e1", "skill": " python", "proficiency": "Expert", "years_experience": 5}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"employee_id": "e1", "skill": "PYTHON", "proficiency": "Beginner", "years_experience": 1}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"skill": "SQL", "years_experience": 1}}"#).unwrap();

        let mut source = JsonLinesSource::new(file.path());
        let records = source.fetch().unwrap();

        assert_eq!(records, vec![EmployeeSkillRecord::new("e1", "PYTHON", 4, 5)]);
        let stats = source.last_stats().unwrap();
        assert_eq!(stats.read, 3);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_json_lines_source_reports_line_of_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"employee_id": "e1", "skill": "GO", "years_experience": 2}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let err = JsonLinesSource::new(file.path()).fetch().unwrap_err();
        match err {
            Error::Parse { location, .. } => assert!(location.ends_with(":2"), "{location}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = JsonLinesSource::new("/nonexistent/records.jsonl")
            .fetch()
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_csv_source_normalizes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "skill,employee_id,department,proficiency,years_experience").unwrap();
        writeln!(file, " python ,e1,Data,Expert,5").unwrap();
        writeln!(file, "PYTHON,e1,Data,Beginner,1").unwrap();
        writeln!(file, "sql,e2,,,3").unwrap();
        writeln!(file, "GO,e3,Infra,Advanced,").unwrap();

        let mut source = CsvSource::new(file.path());
        let records = source.fetch().unwrap();

        assert_eq!(
            records,
            vec![
                EmployeeSkillRecord::new("e1", "PYTHON", 4, 5),
                EmployeeSkillRecord::new("e2", "SQL", 2, 3),
            ]
        );
        let stats = source.last_stats().unwrap();
        assert_eq!(stats.read, 4);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_csv_source_reports_line_of_bad_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "employee_id,skill,proficiency,years_experience").unwrap();
        writeln!(file, "e1,GO,Expert,2").unwrap();
        writeln!(file, "e2,RUST,Expert,many").unwrap();

        let err = CsvSource::new(file.path()).fetch().unwrap_err();
        match err {
            Error::Parse { location, .. } => assert!(location.ends_with(":3"), "{location}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_memory_source_from_raw() {
        let rows = vec![RawSkillRecord {
            employee_id: Some("e1".into()),
            skill: Some("rust".into()),
            proficiency: Some("advanced".into()),
            department: None,
            years_experience: Some(3),
        }];
        let records = MemorySource::from_raw(rows).fetch().unwrap();
        assert_eq!(records[0].skill, "RUST");
        assert_eq!(records[0].proficiency_score, 3);
    }
}
