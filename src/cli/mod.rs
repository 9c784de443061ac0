// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with `clap` and hands off to
// Layer 2 (application). Nothing here computes.
//
//   1. `train`   — trains the classifier on labelled pairs
//   2. `predict` — labels a test file with a trained checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

use crate::application::{
    predict_use_case::PredictUseCase,
    train_use_case::TrainUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "qpair-cnn",
    version,
    about = "Train a CNN duplicate-question classifier, then label question pairs with it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on '{}'", args.train_path);

    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Trained on {} pairs ({} dev) with a vocabulary of {} ids.",
        report.train_pairs, report.dev_pairs, report.vocab_size,
    );
    println!(
        "Training complete: {} steps, best dev F1 {:.4} at step {}.",
        report.steps, report.best_f1, report.best_step,
    );
    if report.early_stopped {
        println!("Stopped early after no dev improvement.");
    }
    match &report.best_checkpoint {
        Some(meta) => println!("Best checkpoint: {}", meta.path.display()),
        None       => println!("No checkpoint saved."),
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let res_path = args.res_path.clone();
    let written  = PredictUseCase::new(args.into()).execute()?;

    println!("Wrote {written} predictions to {res_path}.");
    Ok(())
}
