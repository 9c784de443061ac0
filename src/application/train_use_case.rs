// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Load labelled training pairs   (Layer 4 - data)
//   Step 2: Load or carve out dev pairs    (Layer 4 - data)
//   Step 3: Build vocabulary               (Layer 6 - infra)
//   Step 4: Save model config              (Layer 6 - infra)
//   Step 5: Build model, maybe pretrained  (Layer 5 / 6)
//   Step 6: Tokenise and batch             (Layer 4 - data)
//   Step 7: Run training loop              (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::backend::{self, DeviceKind};
use crate::data::{
    batcher::PairBatcher,
    dataset::{encode_pairs, PairDataset},
    loader::TsvPairLoader,
    splitter::split_train_dev,
};
use crate::domain::question_pair::QuestionPair;
use crate::domain::traits::PairSource;
use crate::infra::{
    checkpoint::{CheckpointManager, CheckpointMeta},
    embeddings::load_pretrained,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::model::PairClassifierConfig;
use crate::ml::trainer::train;

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_path: String,
    /// Separate dev file; when absent `dev_fraction` of the
    /// training pairs is held out instead
    pub dev_path:     Option<String>,
    pub dev_fraction: f64,
    /// Checkpoints, tokenizer, model config and metrics.csv
    pub save_dir: String,
    /// GloVe-style text file for the embedding table
    pub pretrained_path: Option<String>,

    pub vocab_size:   usize,
    pub embed_dim:    usize,
    pub kernel_sizes: Vec<usize>,
    pub kernel_num:   usize,
    pub hidden_size:  usize,
    pub dropout:      f64,

    pub batch_size: usize,
    pub epochs:     usize,
    pub lr:         f64,

    /// Steps between batch-metric log lines
    pub log_interval: usize,
    /// Steps between dev evaluations
    pub test_interval: usize,
    /// Steps without dev improvement before early stop is signalled
    pub early_stop: usize,
    pub save_best:  bool,
    /// Stop training at the early-stop signal instead of only logging it
    pub enforce_early_stop: bool,

    pub device: DeviceKind,
    pub seed:   u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_path:         "data/train.tsv".to_string(),
            dev_path:           None,
            dev_fraction:       0.1,
            save_dir:           "snapshot".to_string(),
            pretrained_path:    None,
            vocab_size:         50_000,
            embed_dim:          300,
            kernel_sizes:       vec![3, 4, 5],
            kernel_num:         100,
            hidden_size:        100,
            dropout:            0.1,
            batch_size:         64,
            epochs:             20,
            lr:                 1e-3,
            log_interval:       10,
            test_interval:      100,
            early_stop:         1000,
            save_best:          true,
            enforce_early_stop: false,
            device:             DeviceKind::Cpu,
            seed:               42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_interval == 0 || self.test_interval == 0 {
            bail!("log_interval and test_interval must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.lr.is_nan() || self.lr <= 0.0 {
            bail!("lr must be positive, got {}", self.lr);
        }
        if self.dev_path.is_none() && !(self.dev_fraction > 0.0 && self.dev_fraction < 1.0) {
            bail!("dev_fraction must be in (0, 1) without a dev file, got {}", self.dev_fraction);
        }
        Ok(())
    }

    /// Model architecture for a vocabulary of `vocab_size` ids.
    pub fn model_config(&self, vocab_size: usize) -> PairClassifierConfig {
        PairClassifierConfig::new(vocab_size, self.embed_dim)
            .with_kernel_sizes(self.kernel_sizes.clone())
            .with_kernel_num(self.kernel_num)
            .with_hidden_size(self.hidden_size)
            .with_dropout(self.dropout)
    }
}

/// What a finished run achieved.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub train_pairs:     usize,
    pub dev_pairs:       usize,
    pub vocab_size:      usize,
    pub steps:           usize,
    pub best_f1:         f64,
    pub best_step:       usize,
    pub best_checkpoint: Option<CheckpointMeta>,
    pub early_stopped:   bool,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run on the configured device.
    pub fn execute(&self) -> Result<TrainReport> {
        match self.config.device {
            DeviceKind::Cpu => self.run::<backend::CpuTrainBackend>(backend::cpu_device()),
            #[cfg(feature = "wgpu")]
            DeviceKind::Gpu => self.run::<backend::GpuTrainBackend>(backend::gpu_device()),
            #[cfg(not(feature = "wgpu"))]
            DeviceKind::Gpu => Err(backend::gpu_unavailable()),
        }
    }

    fn run<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Steps 1-2: pairs ──────────────────────────────────────────────────
        let (train_pairs, dev_pairs) = self.load_pairs()?;
        let duplicates = train_pairs.iter().filter(|p| p.is_duplicate() == Some(true)).count();
        tracing::info!(
            "{} training pairs ({} duplicates), {} dev pairs",
            train_pairs.len(), duplicates, dev_pairs.len(),
        );

        // The tokenizer and model config below replace the previous run's,
        // so its best checkpoint no longer fits them
        let ckpt_manager = CheckpointManager::new(&cfg.save_dir);
        ckpt_manager.reset_best()?;

        // ── Step 3: vocabulary from the training questions only ───────────────
        let texts: Vec<String> = train_pairs
            .iter()
            .flat_map(|p| [p.question1.clone(), p.question2.clone()])
            .collect();
        let tokenizer  = TokenizerStore::new(&cfg.save_dir).build_and_save(&texts, cfg.vocab_size)?;
        let vocab_size = tokenizer.get_vocab_size(true);

        // ── Step 4: model config for prediction ───────────────────────────────
        let model_cfg = cfg.model_config(vocab_size);
        ckpt_manager.save_model_config(&model_cfg)?;

        // ── Step 5: model ─────────────────────────────────────────────────────
        let model = match &cfg.pretrained_path {
            Some(path) => {
                let vectors = load_pretrained(
                    Path::new(path), &tokenizer.get_vocab(true), vocab_size, cfg.embed_dim, cfg.seed,
                )?;
                model_cfg.init_with_embeddings::<B>(&device, vectors.to_tensor(&device))?
            }
            None => model_cfg.init::<B>(&device)?,
        };
        tracing::info!(
            "Model: vocab {}, embed {}, kernels {:?} x {}, question vector width {}",
            vocab_size, cfg.embed_dim, cfg.kernel_sizes, cfg.kernel_num, model.encoder.output_dim(),
        );

        // ── Step 6: batches padded to at least the widest kernel ──────────────
        let min_len       = model_cfg.min_seq_len();
        let train_samples = encode_pairs(&train_pairs, &tokenizer)?;
        let dev_samples   = encode_pairs(&dev_pairs, &tokenizer)?;

        let train_loader = DataLoaderBuilder::new(PairBatcher::<B>::new(device.clone(), min_len))
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .build(PairDataset::new(train_samples));

        let dev_loader = DataLoaderBuilder::new(PairBatcher::<B::InnerBackend>::new(device, min_len))
            .batch_size(cfg.batch_size)
            .build(PairDataset::new(dev_samples));

        // ── Step 7: train ─────────────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.save_dir)?;
        tracing::info!("Dev evaluations logged to '{}'", metrics.csv_path().display());
        let summary = train(
            cfg, model, train_loader.as_ref(), dev_loader.as_ref(), &ckpt_manager, &metrics,
        )?;

        Ok(TrainReport {
            train_pairs:     train_pairs.len(),
            dev_pairs:       dev_pairs.len(),
            vocab_size,
            steps:           summary.steps,
            best_f1:         summary.best_f1,
            best_step:       summary.best_step,
            best_checkpoint: summary.best_checkpoint,
            early_stopped:   summary.early_stopped,
        })
    }

    fn load_pairs(&self) -> Result<(Vec<QuestionPair>, Vec<QuestionPair>)> {
        let cfg   = &self.config;
        let pairs = TsvPairLoader::labelled(&cfg.train_path).load_all()?;

        let (train, dev) = match &cfg.dev_path {
            Some(path) => (pairs, TsvPairLoader::labelled(path).load_all()?),
            None       => split_train_dev(pairs, cfg.dev_fraction, cfg.seed),
        };

        if train.is_empty() {
            bail!("no training pairs in '{}'", cfg.train_path);
        }
        if dev.is_empty() {
            bail!("the dev set is empty; add pairs or raise dev_fraction");
        }
        Ok((train, dev))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TRAIN_TSV: &str = "id\tquestion1\tquestion2\tis_duplicate\n\
        1\tHow do I learn Rust?\tWhat is the best way to learn Rust?\t1\n\
        2\tHow do I cook rice?\tWhy is the sky blue?\t0\n\
        3\tWhat is a borrow checker?\tHow does the borrow checker work?\t1\n\
        4\tWhere is Paris?\tHow tall is Everest?\t0\n\
        5\tIs Rust fast?\tHow fast is Rust?\t1\n\
        6\tWhat is a lifetime?\tWho wrote Hamlet?\t0\n\
        7\tHow do traits work?\tWhat are Rust traits?\t1\n\
        8\tCan cats swim?\tWhat is the capital of Peru?\t0\n";

    fn tiny_config(dir: &Path) -> TrainConfig {
        let train_path = dir.join("train.tsv");
        fs::write(&train_path, TRAIN_TSV).unwrap();

        TrainConfig {
            train_path:    train_path.display().to_string(),
            dev_fraction:  0.25,
            save_dir:      dir.join("snapshot").display().to_string(),
            vocab_size:    100,
            embed_dim:     4,
            kernel_sizes:  vec![1, 2],
            kernel_num:    2,
            hidden_size:   4,
            batch_size:    3,
            epochs:        2,
            log_interval:  1,
            test_interval: 1,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_zero_intervals_are_rejected() {
        let cfg = TrainConfig { test_interval: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TrainConfig { log_interval: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_dev_fraction_only_matters_without_dev_file() {
        let cfg = TrainConfig { dev_fraction: 0.0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TrainConfig { dev_fraction: 0.0, dev_path: Some("dev.tsv".into()), ..TrainConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_model_config_carries_architecture() {
        let cfg   = TrainConfig { kernel_sizes: vec![2, 3], embed_dim: 8, ..TrainConfig::default() };
        let model = cfg.model_config(123);
        assert_eq!(model.vocab_size, 123);
        assert_eq!(model.embed_dim, 8);
        assert_eq!(model.kernel_sizes, vec![2, 3]);
        assert_eq!(model.min_seq_len(), 3);
    }

    #[test]
    fn test_cpu_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());

        let report = TrainUseCase::new(cfg.clone()).execute().unwrap();

        // 8 pairs, 2 held out → 6 train pairs → 2 batches per epoch
        assert_eq!(report.train_pairs, 6);
        assert_eq!(report.dev_pairs, 2);
        assert_eq!(report.steps, 4);
        assert!(!report.early_stopped);

        let save_dir = Path::new(&cfg.save_dir);
        assert!(save_dir.join("tokenizer.json").exists());
        assert!(save_dir.join("model_config.json").exists());

        let csv = fs::read_to_string(save_dir.join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 1 + 4);

        assert_eq!(report.best_checkpoint.is_some(), report.best_f1 > 0.0);
    }

    #[test]
    fn test_cpu_run_saves_best_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());

        // Dev = train: separable pairs, evaluated after every step, so a
        // duplicate is predicted (F1 > 0) long before the run ends
        cfg.dev_path    = Some(cfg.train_path.clone());
        cfg.epochs      = 10;
        cfg.batch_size  = 4;
        cfg.hidden_size = 8;
        cfg.lr          = 1e-2;

        let report = TrainUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(report.steps, 20);
        assert!(report.best_f1 > 0.0);

        let meta = report.best_checkpoint.expect("an improving evaluation saves a checkpoint");
        assert!(meta.path.exists());
        assert_eq!(meta.step, report.best_step);
        let expected_name = format!("best_steps_{}_{:.4}.bin", meta.step, meta.f1);
        assert!(meta.path.ends_with(&expected_name), "{}", meta.path.display());
        assert_eq!(CheckpointManager::new(&cfg.save_dir).best().unwrap(), meta);
    }

    #[test]
    fn test_retraining_in_same_dir_never_predicts_with_old_weights() {
        use crate::application::predict_use_case::{PredictConfig, PredictUseCase};

        let dir   = tempfile::tempdir().unwrap();
        let first = tiny_config(dir.path());
        TrainUseCase::new(first.clone()).execute().unwrap();

        // Make sure the first run leaves a best checkpoint of its own shape
        let ckpt      = CheckpointManager::new(&first.save_dir);
        let old_model = ckpt.load_model_config().unwrap()
            .init::<backend::CpuBackend>(&backend::cpu_device())
            .unwrap();
        let stale = ckpt.save_best(&old_model, 1, 0.5).unwrap();

        // Second run: different embedding width, nothing saved
        let second = TrainConfig { embed_dim: 8, save_best: false, ..first.clone() };
        let report = TrainUseCase::new(second).execute().unwrap();
        assert!(report.best_checkpoint.is_none());
        assert!(ckpt.best().is_err());

        let test_path = dir.path().join("test.tsv");
        fs::write(&test_path, "1\tIs Rust fast?\tHow fast is Rust?\n").unwrap();
        let predict = PredictConfig {
            test_path:      test_path.display().to_string(),
            checkpoint_dir: first.save_dir.clone(),
            res_path:       dir.path().join("result.tsv").display().to_string(),
            ..PredictConfig::default()
        };

        // No recorded best any more
        assert!(PredictUseCase::new(predict.clone()).execute().is_err());

        // Naming the old file explicitly fails on the shape check
        let explicit = PredictConfig { checkpoint: Some(stale.path.display().to_string()), ..predict };
        let err = PredictUseCase::new(explicit).execute().unwrap_err();
        assert!(format!("{err:#}").contains("does not match the model config"), "{err:#}");
        assert!(!dir.path().join("result.tsv").exists());
    }

    #[test]
    fn test_missing_train_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            train_path: dir.path().join("absent.tsv").display().to_string(),
            save_dir:   dir.path().display().to_string(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
