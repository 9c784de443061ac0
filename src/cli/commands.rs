// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::backend::DeviceKind;
use crate::application::predict_use_case::PredictConfig;
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the duplicate-question classifier
    Train(TrainArgs),

    /// Label a test file with a trained checkpoint
    Predict(PredictArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArg {
    Cpu,
    Gpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Cpu => DeviceKind::Cpu,
            DeviceArg::Gpu => DeviceKind::Gpu,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labelled pairs: id, question1, question2, label (tab-separated)
    #[arg(long, default_value = "data/train.tsv")]
    pub train_path: String,

    /// Labelled dev pairs; without it part of the training file is held out
    #[arg(long)]
    pub dev_path: Option<String>,

    /// Share of training pairs held out when no dev file is given
    #[arg(long, default_value_t = 0.1)]
    pub dev_fraction: f64,

    /// Directory for checkpoints, tokenizer, model config and metrics
    #[arg(long, default_value = "snapshot")]
    pub save_dir: String,

    /// GloVe-style word vectors to initialise the embedding table
    #[arg(long)]
    pub pretrained_path: Option<String>,

    /// Largest vocabulary, [PAD] and [UNK] included
    #[arg(long, default_value_t = 50_000)]
    pub vocab_size: usize,

    #[arg(long, default_value_t = 300)]
    pub embed_dim: usize,

    /// Convolution widths, comma-separated
    #[arg(long, value_delimiter = ',', default_value = "3,4,5")]
    pub kernel_sizes: Vec<usize>,

    /// Feature maps per convolution width
    #[arg(long, default_value_t = 100)]
    pub kernel_num: usize,

    #[arg(long, default_value_t = 100)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Steps between training log lines
    #[arg(long, default_value_t = 10)]
    pub log_interval: usize,

    /// Steps between dev evaluations
    #[arg(long, default_value_t = 100)]
    pub test_interval: usize,

    /// Steps without dev improvement before early stop is signalled
    #[arg(long, default_value_t = 1000)]
    pub early_stop: usize,

    /// Keep only the per-evaluation log, never write checkpoints
    #[arg(long)]
    pub no_save_best: bool,

    /// End training at the early-stop signal
    #[arg(long)]
    pub enforce_early_stop: bool,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,

    /// Seed for the train/dev split and the batch shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_path:         a.train_path,
            dev_path:           a.dev_path,
            dev_fraction:       a.dev_fraction,
            save_dir:           a.save_dir,
            pretrained_path:    a.pretrained_path,
            vocab_size:         a.vocab_size,
            embed_dim:          a.embed_dim,
            kernel_sizes:       a.kernel_sizes,
            kernel_num:         a.kernel_num,
            hidden_size:        a.hidden_size,
            dropout:            a.dropout,
            batch_size:         a.batch_size,
            epochs:             a.epochs,
            lr:                 a.lr,
            log_interval:       a.log_interval,
            test_interval:      a.test_interval,
            early_stop:         a.early_stop,
            save_best:          !a.no_save_best,
            enforce_early_stop: a.enforce_early_stop,
            device:             a.device.into(),
            seed:               a.seed,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Unlabelled pairs: id, question1, question2 (tab-separated)
    #[arg(long, default_value = "data/test.tsv")]
    pub test_path: String,

    /// Save directory of the training run
    #[arg(long, default_value = "snapshot")]
    pub checkpoint_dir: String,

    /// Weights file to load instead of the recorded best
    #[arg(long)]
    pub checkpoint: Option<String>,

    /// Output file of `<id>\t<label>` lines
    #[arg(long, default_value = "result.tsv")]
    pub res_path: String,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,

    /// Sort result lines by id (numerically when all ids are integers)
    #[arg(long)]
    pub sort_by_id: bool,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig {
            test_path:      a.test_path,
            checkpoint_dir: a.checkpoint_dir,
            checkpoint:     a.checkpoint,
            res_path:       a.res_path,
            batch_size:     a.batch_size,
            device:         a.device.into(),
            sort_by_id:     a.sort_by_id,
        }
    }
}
