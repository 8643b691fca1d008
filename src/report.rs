//! Run summaries and their JSON persistence.
//!
//! Paths ending in `.gz` are written and read gzip-compressed.

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::Result;
use crate::models::{FailureReason, QuestionCategory, ValidationOutcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub total: usize,
    pub passed: usize,
}

impl CategorySummary {
    pub fn accuracy(&self) -> f64 {
        ratio(self.passed, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Passed over total; 0.0 for an empty run.
    pub accuracy: f64,
    pub target_accuracy: f64,
    pub target_met: bool,
    pub failures_by_reason: BTreeMap<FailureReason, usize>,
    pub by_category: BTreeMap<QuestionCategory, CategorySummary>,
    pub outcomes: Vec<ValidationOutcome>,
}

impl ValidationReport {
    /// Summarize `outcomes` against `target_accuracy` (a share in `[0, 1]`).
    ///
    /// An empty run never meets its target.
    pub fn from_outcomes(outcomes: Vec<ValidationOutcome>, target_accuracy: f64) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.passed).count();

        let mut failures_by_reason = BTreeMap::new();
        let mut by_category: BTreeMap<QuestionCategory, CategorySummary> = BTreeMap::new();
        for outcome in &outcomes {
            let entry = by_category.entry(outcome.category).or_default();
            entry.total += 1;
            if outcome.passed {
                entry.passed += 1;
            } else if let Some(reason) = outcome.reason {
                *failures_by_reason.entry(reason).or_insert(0) += 1;
            }
        }

        let accuracy = ratio(passed, total);
        Self {
            generated_at: Utc::now(),
            total,
            passed,
            failed: total - passed,
            accuracy,
            target_accuracy,
            target_met: total > 0 && accuracy >= target_accuracy,
            failures_by_reason,
            by_category,
            outcomes,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Write the report as pretty JSON, atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        if is_gzip(path) {
            let mut encoder =
                GzEncoder::new(BufWriter::new(tmp.as_file_mut()), Compression::default());
            serde_json::to_writer_pretty(&mut encoder, self)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;

        info!(path = %path.display(), total = self.total, "saved validation report");
        Ok(())
    }

    /// Read a report written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(fs::File::open(path)?);
        let mut contents = String::new();
        if is_gzip(path) {
            GzDecoder::new(reader).read_to_string(&mut contents)?;
        } else {
            reader.read_to_string(&mut contents)?;
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}/{} passed ({:.1}%), target {:.1}%: {}",
            self.passed,
            self.total,
            self.accuracy * 100.0,
            self.target_accuracy * 100.0,
            if self.target_met { "MET" } else { "NOT MET" }
        )?;
        for (category, summary) in &self.by_category {
            writeln!(
                f,
                "  {:<18} {}/{} ({:.1}%)",
                category.label(),
                summary.passed,
                summary.total,
                summary.accuracy() * 100.0
            )?;
        }
        for (reason, count) in &self.failures_by_reason {
            writeln!(f, "  failed: {:<28} {}", reason.describe(), count)?;
        }
        Ok(())
    }
}

fn ratio(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}
