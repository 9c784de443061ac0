// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// One CSV row per dev evaluation, written next to the
// checkpoints so a run's learning curve can be plotted later.
//
// Output file: <save_dir>/metrics.csv
//
//   step,dev_f1,best_f1,improved
//   100,0.612300,0.612300,true
//   200,0.598100,0.612300,false
//   ...
//
// Each training run starts a fresh file.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "step,dev_f1,best_f1,improved";

/// One dev evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Training step the evaluation ran after
    pub step: usize,

    pub dev_f1: f64,

    /// Best dev F1 so far, this evaluation included
    pub best_f1: f64,

    pub improved: bool,
}

impl EvalRecord {
    pub fn new(step: usize, dev_f1: f64, best_f1: f64, improved: bool) -> Self {
        Self { step, dev_f1, best_f1, improved }
    }

    fn to_csv_row(&self) -> String {
        format!("{},{:.6},{:.6},{}", self.step, self.dev_f1, self.best_f1, self.improved)
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create `dir` if needed and start `metrics.csv` with its header.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one row.
    pub fn log(&self, record: &EvalRecord) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", record.to_csv_row())?;

        tracing::debug!(
            "Logged evaluation at step {}: dev_f1={:.4}, best_f1={:.4}",
            record.step, record.dev_f1, record.best_f1,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_header() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        logger.log(&EvalRecord::new(100, 0.6123, 0.6123, true)).unwrap();
        logger.log(&EvalRecord::new(200, 0.5981, 0.6123, false)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![
            HEADER,
            "100,0.612300,0.612300,true",
            "200,0.598100,0.612300,false",
        ]);
    }

    #[test]
    fn test_new_run_starts_a_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        MetricsLogger::new(dir.path()).unwrap()
            .log(&EvalRecord::new(1, 0.1, 0.1, true)).unwrap();

        let logger = MetricsLogger::new(dir.path()).unwrap();
        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
