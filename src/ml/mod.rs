// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model math lives here.
//
//   encoder.rs     — TextEncoder: embedding → multi-width Conv2d
//                    → tanh → mean pool → tanh → concat
//   similarity.rs  — dot / distance / Jaccard / cosine features
//   model.rs       — PairClassifier: shared encoder on both
//                    questions, 4 features → 3 × (Linear, Dropout,
//                    ReLU) → Linear(2)
//   trainer.rs     — step loop, periodic dev evaluation,
//                    best-checkpoint tracking, early stopping
//   evaluator.rs   — dev F1 over a whole loader
//   inferencer.rs  — loads a checkpoint and labels test pairs
//   error.rs       — typed construction / forward errors
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

pub mod error;

/// Convolutional sentence encoder
pub mod encoder;

/// Pairwise similarity features
pub mod similarity;

/// Duplicate-question classifier
pub mod model;

/// Training loop with evaluation and early stopping
pub mod trainer;

/// Dev-set F1
pub mod evaluator;

/// Checkpoint loading and test-set prediction
pub mod inferencer;
