// ============================================================
// Layer 5 — Evaluation Routine
// ============================================================
// Scores a model on a held-out labelled loader.
//
// Called with `model.valid()`, the inner (non-autodiff)
// backend, so dropout is disabled for the whole pass. The
// training model itself is never switched, so training mode
// simply continues with the next training batch.
//
// Decision rule: arg-max over the two logits (class 0 or 1).
// Predictions are concatenated over every batch before F1 is
// computed; F1 is not a per-batch average.

use burn::{data::dataloader::DataLoader, prelude::*};

use crate::data::batcher::PairBatch;
use crate::domain::scores::ConfusionCounts;
use crate::ml::error::ModelError;
use crate::ml::model::PairClassifier;

/// Arg-max class per row of a [batch, 2] logit tensor.
pub fn predicted_classes<B: Backend>(logits: Tensor<B, 2>) -> Vec<i64> {
    logits.argmax(1).into_data().iter::<i64>().collect()
}

pub fn int_values<B: Backend>(tensor: Tensor<B, 1, Int>) -> Vec<i64> {
    tensor.into_data().iter::<i64>().collect()
}

/// F1 of the duplicate class over the whole loader.
pub fn evaluate<B: Backend>(
    model:  &PairClassifier<B>,
    loader: &dyn DataLoader<PairBatch<B>>,
) -> Result<f64, ModelError> {
    let mut predictions = Vec::new();
    let mut labels      = Vec::new();

    for batch in loader.iter() {
        let batch_labels = batch.labels.ok_or(ModelError::MissingLabels)?;
        let logits = model.forward(batch.question1, batch.question2)?;

        predictions.extend(predicted_classes(logits));
        labels.extend(int_values(batch_labels));
    }

    let counts = ConfusionCounts::from_predictions(&predictions, &labels);
    tracing::info!(
        "Evaluation - acc: {:.4}, precision: {:.4}, recall: {:.4}, f1: {:.4} ({} pairs)",
        counts.accuracy(), counts.precision(), counts.recall(), counts.f1(), counts.total(),
    );
    Ok(counts.f1())
}
