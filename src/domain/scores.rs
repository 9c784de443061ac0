// ============================================================
// Layer 3 — Binary Classification Scores
// ============================================================
// Accuracy and F1 for the "duplicate" (positive = 1) class.
//
// Predictions and labels are plain i64 class indices so the
// same code scores a single training batch and a whole dev set.
//
// F1 = 2·TP / (2·TP + FP + FN)
//
// Degenerate case: when there are no positives at all
// (TP + FP + FN = 0) every prediction matched its label, so
// F1 is reported as 1.0. An empty input scores 0.0.

/// Confusion-matrix counts for the positive class (1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_pos:  usize,
    pub false_pos: usize,
    pub true_neg:  usize,
    pub false_neg: usize,
}

impl ConfusionCounts {
    /// Count outcomes pairwise. Extra elements in the longer slice are ignored.
    pub fn from_predictions(predictions: &[i64], labels: &[i64]) -> Self {
        debug_assert_eq!(predictions.len(), labels.len());

        let mut counts = Self::default();
        for (&pred, &label) in predictions.iter().zip(labels) {
            match (pred == 1, label == 1) {
                (true,  true)  => counts.true_pos  += 1,
                (true,  false) => counts.false_pos += 1,
                (false, false) => counts.true_neg  += 1,
                (false, true)  => counts.false_neg += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.true_pos + self.false_pos + self.true_neg + self.false_neg
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_pos + self.true_neg) as f64 / total as f64
    }

    pub fn precision(&self) -> f64 {
        let predicted_pos = self.true_pos + self.false_pos;
        if predicted_pos == 0 {
            return 0.0;
        }
        self.true_pos as f64 / predicted_pos as f64
    }

    pub fn recall(&self) -> f64 {
        let actual_pos = self.true_pos + self.false_neg;
        if actual_pos == 0 {
            return 0.0;
        }
        self.true_pos as f64 / actual_pos as f64
    }

    pub fn f1(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        let denom = 2 * self.true_pos + self.false_pos + self.false_neg;
        if denom == 0 {
            return 1.0;
        }
        (2 * self.true_pos) as f64 / denom as f64
    }
}
