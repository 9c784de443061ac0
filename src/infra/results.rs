// ============================================================
// Layer 6 — Result File Writer
// ============================================================
// Writes one `<id>\t<label>` line per prediction, no header.
//
// Ordering:
//   Iteration — the order the test loader produced them
//   ById      — sorted by id; numeric when every id parses as
//               an integer, lexicographic otherwise

use anyhow::{Context, Result};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use serde::{Deserialize, Serialize};

use crate::domain::question_pair::PairPrediction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    #[default]
    Iteration,
    ById,
}

/// Write predictions to `path`, creating parent directories as needed.
pub fn write_predictions(path: &Path, predictions: &[PairPrediction], order: ResultOrder) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create result directory '{}'", parent.display()))?;
    }

    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create result file '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    render_predictions(&mut out, predictions, order)?;
    out.flush()?;

    tracing::info!("Wrote {} predictions to '{}'", predictions.len(), path.display());
    Ok(())
}

pub fn render_predictions<W: Write>(out: &mut W, predictions: &[PairPrediction], order: ResultOrder) -> Result<()> {
    let mut rows: Vec<&PairPrediction> = predictions.iter().collect();
    if order == ResultOrder::ById {
        sort_by_id(&mut rows);
    }

    for p in rows {
        writeln!(out, "{}\t{}", p.id, p.label)?;
    }
    Ok(())
}

fn sort_by_id(rows: &mut [&PairPrediction]) {
    let numeric = rows.iter().all(|p| p.id.parse::<i64>().is_ok());
    if numeric {
        rows.sort_by_key(|p| p.id.parse::<i64>().unwrap_or_default());
    } else {
        rows.sort_by(|a, b| a.id.cmp(&b.id));
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn preds(rows: &[(&str, u8)]) -> Vec<PairPrediction> {
        rows.iter().map(|&(id, label)| PairPrediction::new(id, label)).collect()
    }

    fn render(predictions: &[PairPrediction], order: ResultOrder) -> String {
        let mut buf = Vec::new();
        render_predictions(&mut buf, predictions, order).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_iteration_order_is_kept() {
        let p = preds(&[("7", 1), ("3", 0), ("5", 1)]);
        assert_eq!(render(&p, ResultOrder::Iteration), "7\t1\n3\t0\n5\t1\n");
    }

    #[test]
    fn test_numeric_ids_sort_numerically() {
        let p = preds(&[("10", 1), ("9", 0), ("100", 1)]);
        assert_eq!(render(&p, ResultOrder::ById), "9\t0\n10\t1\n100\t1\n");
    }

    #[test]
    fn test_mixed_ids_sort_lexicographically() {
        let p = preds(&[("b2", 1), ("10", 0), ("a", 1)]);
        assert_eq!(render(&p, ResultOrder::ById), "10\t0\na\t1\nb2\t1\n");
    }

    #[test]
    fn test_empty_input_writes_empty_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.tsv");
        write_predictions(&path, &[], ResultOrder::Iteration).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
