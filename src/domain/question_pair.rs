// ============================================================
// Layer 3 — QuestionPair Domain Type
// ============================================================
// The unit of work for the whole system: two questions and,
// when known, whether they ask the same thing.
//
// Example:
//   id:        "42"
//   question1: "How do I learn Rust quickly?"
//   question2: "What is the fastest way to learn Rust?"
//   label:     Some(1)   → duplicate
//
// Test files carry no label; the model fills it in and the
// result is a PairPrediction.

use serde::{Deserialize, Serialize};

/// A question pair as read from disk, before tokenisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPair {
    /// Opaque identifier, echoed back in the result file
    pub id: String,

    pub question1: String,
    pub question2: String,

    /// 1 = duplicate, 0 = not duplicate, None for unlabelled pairs
    pub label: Option<u8>,
}

impl QuestionPair {
    /// A pair with a known 0/1 label (training and dev files)
    pub fn labelled(
        id:        impl Into<String>,
        question1: impl Into<String>,
        question2: impl Into<String>,
        label:     u8,
    ) -> Self {
        Self {
            id:        id.into(),
            question1: question1.into(),
            question2: question2.into(),
            label:     Some(label),
        }
    }

    /// A pair to be classified (test files)
    pub fn unlabelled(
        id:        impl Into<String>,
        question1: impl Into<String>,
        question2: impl Into<String>,
    ) -> Self {
        Self {
            id:        id.into(),
            question1: question1.into(),
            question2: question2.into(),
            label:     None,
        }
    }

    pub fn is_duplicate(&self) -> Option<bool> {
        self.label.map(|l| l == 1)
    }
}

/// The model's binary decision for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairPrediction {
    pub id:    String,
    /// Always 0 or 1
    pub label: u8,
}

impl PairPrediction {
    pub fn new(id: impl Into<String>, label: u8) -> Self {
        Self { id: id.into(), label }
    }
}
