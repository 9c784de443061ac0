// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Labels an unlabelled test file with a trained checkpoint:
//
//   Step 1: Load the saved tokenizer      (Layer 6 - infra)
//   Step 2: Rebuild model + load weights  (Layer 5 - ml)
//   Step 3: Load and tokenise test pairs  (Layer 4 - data)
//   Step 4: Predict                       (Layer 5 - ml)
//   Step 5: Write the result file         (Layer 6 - infra)

use anyhow::Result;
use burn::{data::dataloader::DataLoaderBuilder, prelude::Backend};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::backend::{self, DeviceKind};
use crate::data::{
    batcher::PairBatcher,
    dataset::{encode_pairs, PairDataset},
    loader::TsvPairLoader,
};
use crate::domain::traits::PairSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    results::{write_predictions, ResultOrder},
    tokenizer_store::TokenizerStore,
};
use crate::ml::inferencer::Inferencer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub test_path: String,
    /// The save directory of a training run
    pub checkpoint_dir: String,
    /// Weights file to use instead of the recorded best
    pub checkpoint: Option<String>,
    pub res_path:   String,
    pub batch_size: usize,
    pub device:     DeviceKind,
    /// Sort result lines by id instead of keeping input order
    pub sort_by_id: bool,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            test_path:      "data/test.tsv".to_string(),
            checkpoint_dir: "snapshot".to_string(),
            checkpoint:     None,
            res_path:       "result.tsv".to_string(),
            batch_size:     64,
            device:         DeviceKind::Cpu,
            sort_by_id:     false,
        }
    }
}

pub struct PredictUseCase {
    config: PredictConfig,
}

impl PredictUseCase {
    pub fn new(config: PredictConfig) -> Self {
        Self { config }
    }

    /// Returns the number of predictions written.
    pub fn execute(&self) -> Result<usize> {
        match self.config.device {
            DeviceKind::Cpu => self.run::<backend::CpuBackend>(backend::cpu_device()),
            #[cfg(feature = "wgpu")]
            DeviceKind::Gpu => self.run::<backend::GpuBackend>(backend::gpu_device()),
            #[cfg(not(feature = "wgpu"))]
            DeviceKind::Gpu => Err(backend::gpu_unavailable()),
        }
    }

    fn run<B: Backend>(&self, device: B::Device) -> Result<usize> {
        let cfg = &self.config;
        if cfg.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }

        let tokenizer  = TokenizerStore::new(&cfg.checkpoint_dir).load()?;
        let ckpt       = CheckpointManager::new(&cfg.checkpoint_dir);
        let inferencer = Inferencer::<B>::from_checkpoint(
            &ckpt, cfg.checkpoint.as_deref().map(Path::new), &device,
        )?;

        let pairs   = TsvPairLoader::unlabelled(&cfg.test_path).load_all()?;
        let samples = encode_pairs(&pairs, &tokenizer)?;

        let batcher = PairBatcher::<B>::new(device, inferencer.min_seq_len())
            .with_pad_id(inferencer.padding_idx() as u32);
        let loader = DataLoaderBuilder::new(batcher)
            .batch_size(cfg.batch_size)
            .build(PairDataset::new(samples));

        let predictions = inferencer.predict(loader.as_ref())?;

        let order = if cfg.sort_by_id { ResultOrder::ById } else { ResultOrder::Iteration };
        write_predictions(Path::new(&cfg.res_path), &predictions, order)?;

        let duplicates = predictions.iter().filter(|p| p.label == 1).count();
        tracing::info!("{} of {} pairs predicted duplicate", duplicates, predictions.len());
        Ok(predictions.len())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::application::backend::CpuBackend;
    use crate::ml::model::PairClassifierConfig;

    const TEST_TSV: &str = "id\tquestion1\tquestion2\n\
        10\tHow do I learn Rust?\tWhat is the best way to learn Rust?\n\
        2\tWhere is Paris?\tHow tall is Everest?\n\
        7\tIs Rust fast?\tHow fast is Rust?\n";

    /// A save directory as a training run would leave it.
    fn fake_run(dir: &Path) -> std::path::PathBuf {
        let save_dir = dir.join("snapshot");
        let texts: Vec<String> = TEST_TSV.lines().skip(1)
            .flat_map(|l| l.split('\t').skip(1).map(str::to_string).collect::<Vec<_>>())
            .collect();
        let tokenizer = TokenizerStore::new(&save_dir).build_and_save(&texts, 50).unwrap();

        let model_cfg = PairClassifierConfig::new(tokenizer.get_vocab_size(true), 4)
            .with_kernel_sizes(vec![2, 3])
            .with_kernel_num(2)
            .with_hidden_size(4);
        let ckpt  = CheckpointManager::new(&save_dir);
        let model = model_cfg.init::<CpuBackend>(&Default::default()).unwrap();
        ckpt.save_model_config(&model_cfg).unwrap();
        ckpt.save_best(&model, 5, 0.5).unwrap();
        save_dir
    }

    fn config(dir: &Path, sort_by_id: bool) -> PredictConfig {
        let test_path = dir.join("test.tsv");
        fs::write(&test_path, TEST_TSV).unwrap();
        PredictConfig {
            test_path:      test_path.display().to_string(),
            checkpoint_dir: fake_run(dir).display().to_string(),
            res_path:       dir.join("out").join("result.tsv").display().to_string(),
            batch_size:     2,
            sort_by_id,
            ..PredictConfig::default()
        }
    }

    fn result_ids(cfg: &PredictConfig) -> Vec<String> {
        fs::read_to_string(&cfg.res_path).unwrap()
            .lines()
            .map(|l| l.split('\t').next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_pair_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), false);

        assert_eq!(PredictUseCase::new(cfg.clone()).execute().unwrap(), 3);
        assert_eq!(result_ids(&cfg), vec!["10", "2", "7"]);
    }

    #[test]
    fn test_sort_by_id_is_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), true);

        PredictUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(result_ids(&cfg), vec!["2", "7", "10"]);
    }

    #[test]
    fn test_explicit_checkpoint_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), false);
        let best = CheckpointManager::new(&cfg.checkpoint_dir).best().unwrap();
        cfg.checkpoint = Some(best.path.display().to_string());

        assert_eq!(PredictUseCase::new(cfg).execute().unwrap(), 3);
    }

    #[test]
    fn test_missing_checkpoint_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PredictConfig {
            checkpoint_dir: dir.path().join("nothing").display().to_string(),
            ..PredictConfig::default()
        };
        assert!(PredictUseCase::new(cfg).execute().is_err());
    }
}
