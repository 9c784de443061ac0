// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the model from a checkpoint directory and labels
// unlabelled pairs.
//
// Decision rule: arg-max over the two logits, the same rule the
// evaluation routine and the training loss use. A pair is a
// duplicate when logit[1] > logit[0].

use std::path::Path;

use anyhow::Result;
use burn::{data::dataloader::DataLoader, prelude::*};

use crate::data::batcher::PairBatch;
use crate::domain::question_pair::PairPrediction;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::error::ModelError;
use crate::ml::evaluator::predicted_classes;
use crate::ml::model::{PairClassifier, PairClassifierConfig};

/// One prediction per pair, in loader order.
pub fn predict<B: Backend>(
    model:  &PairClassifier<B>,
    loader: &dyn DataLoader<PairBatch<B>>,
) -> Result<Vec<PairPrediction>, ModelError> {
    let mut predictions = Vec::new();

    for batch in loader.iter() {
        let logits  = model.forward(batch.question1, batch.question2)?;
        let classes = predicted_classes(logits);

        predictions.extend(
            batch.ids
                .into_iter()
                .zip(classes)
                .map(|(id, class)| PairPrediction::new(id, u8::from(class == 1))),
        );
    }

    tracing::debug!("Predicted {} pairs", predictions.len());
    Ok(predictions)
}

pub struct Inferencer<B: Backend> {
    model:  PairClassifier<B>,
    config: PairClassifierConfig,
}

impl<B: Backend> Inferencer<B> {
    /// Load the model config saved at training time, then the weights from
    /// `checkpoint` (or the recorded best checkpoint when `None`).
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        checkpoint:   Option<&Path>,
        device:       &B::Device,
    ) -> Result<Self> {
        let config = ckpt_manager.load_model_config()?;

        let path = match checkpoint {
            Some(path) => path.to_path_buf(),
            None       => ckpt_manager.best()?.path,
        };
        let model = ckpt_manager.load_model::<B>(&config, &path, device)?;
        tracing::info!("Model loaded from checkpoint '{}'", path.display());

        Ok(Self { model, config })
    }

    /// Shortest sequence the loaded model accepts; batches are padded to it.
    pub fn min_seq_len(&self) -> usize {
        self.config.min_seq_len()
    }

    pub fn padding_idx(&self) -> usize {
        self.config.padding_idx
    }

    pub fn predict(&self, loader: &dyn DataLoader<PairBatch<B>>) -> Result<Vec<PairPrediction>, ModelError> {
        predict(&self.model, loader)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::data::dataloader::{batcher::Batcher, DataLoaderBuilder};

    use crate::data::batcher::PairBatcher;
    use crate::data::dataset::{PairDataset, PairSample};
    use crate::infra::results::{write_predictions, ResultOrder};

    type TestBackend = NdArray;

    fn config() -> PairClassifierConfig {
        PairClassifierConfig::new(10, 4)
            .with_kernel_sizes(vec![3])
            .with_kernel_num(2)
            .with_hidden_size(8)
    }

    fn unlabelled(ids: &[&str]) -> Vec<PairSample> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| PairSample {
                id:        id.to_string(),
                question1: vec![1, 2, 3 + i as u32],
                question2: vec![4, 5, 6, 7 - i as u32],
                label:     None,
            })
            .collect()
    }

    fn loader(samples: Vec<PairSample>) -> std::sync::Arc<dyn DataLoader<PairBatch<TestBackend>>> {
        DataLoaderBuilder::new(PairBatcher::<TestBackend>::new(Default::default(), 3))
            .batch_size(2)
            .build(PairDataset::new(samples))
    }

    #[test]
    fn test_three_predictions_written_in_input_order() {
        let model = config().init::<TestBackend>(&Default::default()).unwrap();
        let predictions = predict(&model, loader(unlabelled(&["7", "3", "5"])).as_ref()).unwrap();

        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.tsv");
        write_predictions(&path, &predictions, ResultOrder::Iteration).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for (line, id) in lines.iter().zip(["7", "3", "5"]) {
            let (got_id, label) = line.split_once('\t').unwrap();
            assert_eq!(got_id, id);
            assert!(label == "0" || label == "1", "bad label in '{line}'");
        }
    }

    #[test]
    fn test_predictions_match_evaluation_rule() {
        let model   = config().init::<TestBackend>(&Default::default()).unwrap();
        let samples = unlabelled(&["a", "b"]);

        let predictions = predict(&model, loader(samples.clone()).as_ref()).unwrap();

        let batch: PairBatch<TestBackend> =
            PairBatcher::<TestBackend>::new(Default::default(), 3).batch(samples);
        let classes = predicted_classes(model.forward(batch.question1, batch.question2).unwrap());

        let labels: Vec<i64> = predictions.iter().map(|p| p.label as i64).collect();
        assert_eq!(labels, classes);
    }

    #[test]
    fn test_round_trip_through_checkpoint_dir() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path());

        let cfg   = config();
        let model = cfg.init::<TestBackend>(&device).unwrap();
        ckpt.save_model_config(&cfg).unwrap();
        ckpt.save_best(&model, 10, 0.75).unwrap();

        let inferencer = Inferencer::<TestBackend>::from_checkpoint(&ckpt, None, &device).unwrap();
        assert_eq!(inferencer.min_seq_len(), 3);

        let expected = predict(&model, loader(unlabelled(&["1", "2", "3"])).as_ref()).unwrap();
        let got      = inferencer.predict(loader(unlabelled(&["1", "2", "3"])).as_ref()).unwrap();
        assert_eq!(got, expected);
    }
}
