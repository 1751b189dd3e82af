// 📋 Run Report - per-record outcomes of one import run
// Returned by the importer instead of a shared error list.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::filing::RecordKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No earlier row set existed for the key
    Inserted { organisation_id: i64, people: usize },
    /// An earlier row set was deleted and replaced
    Replaced { organisation_id: i64, people: usize },
    /// Rolled back; nothing of the record is stored
    Failed { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub key: RecordKey,
    pub outcome: Outcome,
}

/// Outcomes in input order, plus run timestamps
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<RecordOutcome>,
}

impl ImportReport {
    pub fn new() -> Self {
        ImportReport {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, key: RecordKey, outcome: Outcome) {
        self.outcomes.push(RecordOutcome { key, outcome });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn inserted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Inserted { .. }))
            .count()
    }

    pub fn replaced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Replaced { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.is_success())
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// One line per failed record, as written to the error log
    pub fn error_lines(&self) -> Vec<String> {
        self.failures()
            .filter_map(|o| match &o.outcome {
                Outcome::Failed { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records: {} inserted, {} replaced, {} failed ({:.1}s)",
            self.total(),
            self.inserted(),
            self.replaced(),
            self.failed(),
            self.elapsed().num_milliseconds() as f64 / 1000.0
        )
    }
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one message per line. Nothing is written (and no file created)
/// when there are no messages. Returns the number of lines written.
pub fn write_error_log(path: &Path, lines: &[String]) -> Result<usize> {
    if lines.is_empty() {
        return Ok(0);
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create error log {}", path.display()))?;
    let mut out = BufWriter::new(file);

    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()
        .with_context(|| format!("Failed to write error log {}", path.display()))?;

    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(ein: &str, dln: &str) -> RecordKey {
        RecordKey {
            ein: ein.to_string(),
            dln: dln.to_string(),
        }
    }

    fn create_mixed_report() -> ImportReport {
        let mut report = ImportReport::new();
        report.record(key("1", "A"), Outcome::Inserted { organisation_id: 1, people: 2 });
        report.record(key("2", "B"), Outcome::Failed { message: "EIN 2 DLN B: boom".to_string() });
        report.record(key("3", "C"), Outcome::Replaced { organisation_id: 3, people: 0 });
        report.finish();
        report
    }

    #[test]
    fn test_counts() {
        let report = create_mixed_report();

        assert_eq!(report.total(), 3);
        assert_eq!(report.inserted(), 1);
        assert_eq!(report.replaced(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures().next().unwrap().key, key("2", "B"));
        assert!(report.summary().starts_with("3 records: 1 inserted, 1 replaced, 1 failed"));
    }

    #[test]
    fn test_error_lines() {
        let report = create_mixed_report();
        assert_eq!(report.error_lines(), vec!["EIN 2 DLN B: boom".to_string()]);
    }

    #[test]
    fn test_write_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.txt");

        let written = write_error_log(&path, &create_mixed_report().error_lines()).unwrap();
        assert_eq!(written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "EIN 2 DLN B: boom\n");
    }

    #[test]
    fn test_no_error_log_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.txt");

        assert_eq!(write_error_log(&path, &[]).unwrap(), 0);
        assert!(!path.exists());
    }
}
