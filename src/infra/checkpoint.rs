// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores classifier weights with Burn's
// BinFileRecorder at full precision, so a reload reproduces
// the forward pass exactly.
//
// File layout inside the save directory:
//   save_dir/
//     best_steps_120_0.8125.bin  ← weights of each new best
//     best_checkpoint.json       ← { path, step, f1 } of the latest best,
//                                  removed when a new run starts
//     model_config.json          ← PairClassifierConfig
//     tokenizer.json             ← written by TokenizerStore
//
// Every improvement writes a new file; older bests are kept.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{BinFileRecorder, FullPrecisionSettings, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::ml::model::{PairClassifier, PairClassifierConfig};

const BEST_POINTER: &str = "best_checkpoint.json";
const MODEL_CONFIG: &str = "model_config.json";

/// Where the best weights live and what they scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub path: PathBuf,
    pub step: usize,
    pub f1:   f64,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Nothing touches the disk until the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<prefix>_steps_<step>_<f1 to 4 decimals>.bin`
    pub fn checkpoint_path(&self, prefix: &str, step: usize, f1: f64) -> PathBuf {
        self.dir.join(format!("{prefix}_steps_{step}_{f1:.4}.bin"))
    }

    /// Record the model as the new best and update the pointer file.
    pub fn save_best<B: Backend>(
        &self,
        model: &PairClassifier<B>,
        step:  usize,
        f1:    f64,
    ) -> Result<CheckpointMeta> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create save directory '{}'", self.dir.display()))?;

        let path = self.checkpoint_path("best", step, f1);

        // The recorder resets the extension, so the path already carries ".bin"
        BinFileRecorder::<FullPrecisionSettings>::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let meta = CheckpointMeta { path, step, f1 };
        let pointer = self.dir.join(BEST_POINTER);
        fs::write(&pointer, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("Cannot write '{}'", pointer.display()))?;

        tracing::info!("Saved best checkpoint '{}'", meta.path.display());
        Ok(meta)
    }

    /// The most recent best checkpoint recorded in this directory.
    pub fn best(&self) -> Result<CheckpointMeta> {
        let pointer = self.dir.join(BEST_POINTER);
        let json = fs::read_to_string(&pointer).with_context(|| {
            format!(
                "Cannot read '{}'. Has a training run saved a best checkpoint here?",
                pointer.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Forget the recorded best so a new run never inherits it.
    /// Weight files stay on disk.
    pub fn reset_best(&self) -> Result<()> {
        let pointer = self.dir.join(BEST_POINTER);
        if pointer.exists() {
            fs::remove_file(&pointer)
                .with_context(|| format!("Cannot remove stale '{}'", pointer.display()))?;
            tracing::info!("Cleared previous best checkpoint pointer '{}'", pointer.display());
        }
        Ok(())
    }

    /// Build a model from `config` and load the weights at `path` into it.
    /// Fails when the saved weights were trained with another architecture.
    pub fn load_model<B: Backend>(
        &self,
        config: &PairClassifierConfig,
        path:   &Path,
        device: &B::Device,
    ) -> Result<PairClassifier<B>> {
        let record = BinFileRecorder::<FullPrecisionSettings>::new()
            .load(path.to_path_buf(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        let model = config.init::<B>(device)?.load_record(record);
        config.check_weights(&model).with_context(|| {
            format!(
                "Checkpoint '{}' does not match the model config in '{}'",
                path.display(),
                self.dir.join(MODEL_CONFIG).display()
            )
        })?;
        Ok(model)
    }

    /// Saved before training so prediction can rebuild the same model.
    pub fn save_model_config(&self, cfg: &PairClassifierConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create save directory '{}'", self.dir.display()))?;

        let path = self.dir.join(MODEL_CONFIG);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_model_config(&self) -> Result<PairClassifierConfig> {
        let path = self.dir.join(MODEL_CONFIG);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read model config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn config() -> PairClassifierConfig {
        PairClassifierConfig::new(12, 4)
            .with_kernel_sizes(vec![2, 3])
            .with_kernel_num(3)
            .with_hidden_size(6)
    }

    fn tokens(rows: [[i64; 4]; 2]) -> Tensor<TestBackend, 2, Int> {
        Tensor::from_ints(rows, &Default::default())
    }

    #[test]
    fn test_checkpoint_path_format() {
        let ckpt = CheckpointManager::new("/tmp/save");
        assert_eq!(
            ckpt.checkpoint_path("best", 120, 0.8125),
            PathBuf::from("/tmp/save/best_steps_120_0.8125.bin"),
        );
        assert_eq!(
            ckpt.checkpoint_path("best", 7, 1.0 / 3.0),
            PathBuf::from("/tmp/save/best_steps_7_0.3333.bin"),
        );
    }

    #[test]
    fn test_save_best_writes_weights_and_pointer() {
        let dir   = tempfile::tempdir().unwrap();
        let ckpt  = CheckpointManager::new(dir.path().join("nested"));
        let model = config().init::<TestBackend>(&Default::default()).unwrap();

        let meta = ckpt.save_best(&model, 40, 0.5).unwrap();
        assert!(meta.path.exists());
        assert!(meta.path.ends_with("best_steps_40_0.5000.bin"));
        assert_eq!(ckpt.best().unwrap(), meta);

        // A later best replaces the pointer but keeps the old file
        let newer = ckpt.save_best(&model, 80, 0.75).unwrap();
        assert_eq!(ckpt.best().unwrap(), newer);
        assert!(meta.path.exists());
    }

    #[test]
    fn test_round_trip_reproduces_forward_pass() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path());

        let trained = config().init::<TestBackend>(&device).unwrap();
        let meta    = ckpt.save_best(&trained, 1, 0.9).unwrap();

        let loaded = ckpt.load_model::<TestBackend>(&config(), &meta.path, &device).unwrap();

        let q1 = tokens([[1, 2, 3, 4], [5, 6, 7, 0]]);
        let q2 = tokens([[1, 2, 9, 0], [8, 8, 8, 8]]);

        let expected: Vec<f32> = trained.forward(q1.clone(), q2.clone()).unwrap()
            .into_data().to_vec().unwrap();
        let got: Vec<f32> = loaded.forward(q1, q2).unwrap()
            .into_data().to_vec().unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_weights_of_another_architecture_are_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path());

        let meta = ckpt.save_best(&config().init::<TestBackend>(&device).unwrap(), 1, 0.9).unwrap();

        let bigger_vocab = PairClassifierConfig { vocab_size: 200, ..config() };
        let err = ckpt.load_model::<TestBackend>(&bigger_vocab, &meta.path, &device).unwrap_err();
        assert!(format!("{err:#}").contains("encoder.embedding.weight"), "{err:#}");

        let wider = PairClassifierConfig { embed_dim: 8, ..config() };
        assert!(ckpt.load_model::<TestBackend>(&wider, &meta.path, &device).is_err());
    }

    #[test]
    fn test_reset_best_removes_only_the_pointer() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let meta = ckpt.save_best(&config().init::<TestBackend>(&Default::default()).unwrap(), 3, 0.4).unwrap();

        ckpt.reset_best().unwrap();
        assert!(ckpt.best().is_err());
        assert!(meta.path.exists());

        // Nothing to clear is fine
        ckpt.reset_best().unwrap();
    }

    #[test]
    fn test_model_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());

        ckpt.save_model_config(&config()).unwrap();
        let loaded = ckpt.load_model_config().unwrap();

        assert_eq!(loaded.vocab_size, 12);
        assert_eq!(loaded.kernel_sizes, vec![2, 3]);
        assert_eq!(loaded.kernel_num, 3);
        assert_eq!(loaded.hidden_size, 6);
    }

    #[test]
    fn test_missing_pointer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CheckpointManager::new(dir.path()).best().is_err());
        assert!(CheckpointManager::new(dir.path()).load_model_config().is_err());
    }
}
