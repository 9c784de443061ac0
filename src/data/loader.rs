// ============================================================
// Layer 4 — Pair Loader
// ============================================================
// Reads question pairs from tab-separated files.
//
// Labelled files (train / dev):
//   id <TAB> question1 <TAB> question2 <TAB> label
//
// Unlabelled files (test):
//   id <TAB> question1 <TAB> question2
//
// An optional header line whose first field is `id` is skipped.
// Blank lines are ignored. Labels must be the literal 0 or 1.
// Any malformed line aborts loading with its line number.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::data::preprocessor::Preprocessor;
use crate::domain::question_pair::QuestionPair;
use crate::domain::traits::PairSource;

/// Loads question pairs from one .tsv file.
/// Implements the PairSource trait from Layer 3.
pub struct TsvPairLoader {
    path:     PathBuf,
    labelled: bool,
}

impl TsvPairLoader {
    /// A loader that expects a label column
    pub fn labelled(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), labelled: true }
    }

    /// A loader for test files (no label column)
    pub fn unlabelled(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), labelled: false }
    }
}

impl PairSource for TsvPairLoader {
    fn load_all(&self) -> Result<Vec<QuestionPair>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read pair file '{}'", self.path.display()))?;

        let pairs = parse_pairs(&text, self.labelled)
            .with_context(|| format!("Malformed pair file '{}'", self.path.display()))?;

        tracing::info!("Loaded {} pairs from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

/// Parse the contents of a pair file.
pub fn parse_pairs(text: &str, labelled: bool) -> Result<Vec<QuestionPair>> {
    let prep     = Preprocessor::new();
    let expected = if labelled { 4 } else { 3 };
    let mut pairs = Vec::new();
    let mut first = true;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line    = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        // Only the first non-blank line may be a header
        let fields: Vec<&str> = line.split('\t').collect();
        if std::mem::take(&mut first) && fields[0].trim().eq_ignore_ascii_case("id") {
            continue;
        }
        if fields.len() < expected {
            bail!(
                "line {}: expected {} tab-separated fields, found {}",
                line_no, expected, fields.len()
            );
        }

        let id = fields[0].trim();
        if id.is_empty() {
            bail!("line {}: empty id", line_no);
        }

        let (question1, question2) = (prep.clean(fields[1]), prep.clean(fields[2]));
        let pair = if labelled {
            let label = match fields[3].trim() {
                "0" => 0,
                "1" => 1,
                other => bail!("line {}: label must be 0 or 1, found '{}'", line_no, other),
            };
            QuestionPair::labelled(id, question1, question2, label)
        } else {
            QuestionPair::unlabelled(id, question1, question2)
        };
        pairs.push(pair);
    }

    Ok(pairs)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labelled_with_header() {
        let text = "id\tquestion1\tquestion2\tlabel\n\
                    1\tHow do I  learn Rust?\tBest way to learn Rust?\t1\n\
                    \n\
                    2\tWhat is a crab?\tWhere is Paris?\t0\r\n";
        let pairs = parse_pairs(text, true).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], QuestionPair::labelled("1", "How do I learn Rust?", "Best way to learn Rust?", 1));
        assert_eq!(pairs[1].label, Some(0));
    }

    #[test]
    fn test_parse_unlabelled_ignores_extra_columns() {
        let text = "10\ta?\tb?\n11\tc?\td?\textra\n";
        let pairs = parse_pairs(text, false).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].id, "11");
        assert!(pairs.iter().all(|p| p.label.is_none()));
    }

    #[test]
    fn test_header_after_leading_blank_lines_is_skipped() {
        let text = "\n  \nid\tquestion1\tquestion2\tis_duplicate\n1\ta?\tb?\t1\n";
        let pairs = parse_pairs(text, true).unwrap();
        assert_eq!(pairs, vec![QuestionPair::labelled("1", "a?", "b?", 1)]);
    }

    #[test]
    fn test_header_later_in_the_file_is_data() {
        let err = parse_pairs("1\ta?\tb?\t1\nid\tq1\tq2\tlabel\n", true).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_missing_label_column_is_an_error() {
        let err = parse_pairs("1\ta?\tb?\n", true).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_bad_label_is_an_error() {
        let err = parse_pairs("1\ta?\tb?\t0\n2\ta?\tb?\tyes\n", true).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("yes"), "{msg}");
    }

    #[test]
    fn test_load_from_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.tsv");
        fs::write(&path, "1\ta?\tb?\t1\n").unwrap();

        let pairs = TsvPairLoader::labelled(&path).load_all().unwrap();
        assert_eq!(pairs.len(), 1);

        let missing = TsvPairLoader::labelled(dir.path().join("nope.tsv")).load_all();
        assert!(missing.is_err());
    }
}
