// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Step-driven train loop using Adam at a fixed learning rate.
//
//   for epoch in 1..=epochs
//     for batch in train_loader
//       forward → cross-entropy → backward → Adam step   (every step)
//       log batch accuracy / F1                          (every log_interval)
//       evaluate dev F1 on model.valid()                 (every test_interval)
//         improved      → remember step, maybe save "best" checkpoint
//         stalled ≥ early_stop steps → raise early stop once
//                                      (break only if enforce_early_stop)
//
// Key Burn points:
//   - Training uses B: AutodiffBackend for gradients
//   - model.valid() returns the model on B::InnerBackend (no dropout)
//   - The dev batcher must therefore produce InnerBackend tensors
//   - Gradients are rebuilt from each loss.backward(); nothing to zero
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoader,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::PairBatch;
use crate::domain::scores::ConfusionCounts;
use crate::infra::checkpoint::{CheckpointManager, CheckpointMeta};
use crate::infra::metrics::{EvalRecord, MetricsLogger};
use crate::ml::error::ModelError;
use crate::ml::evaluator::{evaluate, int_values, predicted_classes};
use crate::ml::model::PairClassifier;

// ─── Early stopping ───────────────────────────────────────────────────────────

/// What one dev evaluation meant for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalOutcome {
    /// Strictly better than every previous evaluation
    Improved,
    /// Not better, still within patience (or already signalled)
    NoImprovement,
    /// Patience just ran out; reported once per stall
    EarlyStop,
}

/// Tracks best dev F1 and how long it has stalled.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:  usize,
    best_f1:   f64,
    best_step: usize,
    raised:    bool,
}

impl EarlyStopping {
    /// `patience` is measured in training steps, not evaluations.
    pub fn new(patience: usize) -> Self {
        Self { patience, best_f1: 0.0, best_step: 0, raised: false }
    }

    pub fn best_f1(&self) -> f64 { self.best_f1 }

    pub fn best_step(&self) -> usize { self.best_step }

    pub fn observe(&mut self, step: usize, f1: f64) -> EvalOutcome {
        if f1 > self.best_f1 {
            self.best_f1   = f1;
            self.best_step = step;
            self.raised    = false;
            return EvalOutcome::Improved;
        }

        if !self.raised && step.saturating_sub(self.best_step) >= self.patience {
            self.raised = true;
            return EvalOutcome::EarlyStop;
        }
        EvalOutcome::NoImprovement
    }
}

// ─── Single step ──────────────────────────────────────────────────────────────

/// What one optimisation step saw, for batch-level logging.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub loss:        f64,
    pub predictions: Vec<i64>,
    pub labels:      Vec<i64>,
}

impl StepOutput {
    pub fn counts(&self) -> ConfusionCounts {
        ConfusionCounts::from_predictions(&self.predictions, &self.labels)
    }
}

/// Forward, loss, backward and one optimiser update.
pub fn train_step<B, O>(
    model: PairClassifier<B>,
    optim: &mut O,
    batch: PairBatch<B>,
    lr:    f64,
) -> Result<(PairClassifier<B>, StepOutput), ModelError>
where
    B: AutodiffBackend,
    O: Optimizer<PairClassifier<B>, B>,
{
    let labels = batch.labels.ok_or(ModelError::MissingLabels)?;
    let output = model.forward_classification(batch.question1, batch.question2, labels.clone())?;

    let step = StepOutput {
        loss:        output.loss.clone().into_scalar().elem::<f64>(),
        predictions: predicted_classes(output.logits),
        labels:      int_values(labels),
    };

    let grads = output.loss.backward();
    let grads = GradientsParams::from_grads(grads, &model);
    let model = optim.step(lr, model, grads);

    Ok((model, step))
}

// ─── Full run ─────────────────────────────────────────────────────────────────

pub struct TrainingSummary {
    pub steps:           usize,
    pub best_f1:         f64,
    pub best_step:       usize,
    pub best_checkpoint: Option<CheckpointMeta>,
    pub early_stopped:   bool,
}

pub fn train<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    model:        PairClassifier<B>,
    train_loader: &dyn DataLoader<PairBatch<B>>,
    dev_loader:   &dyn DataLoader<PairBatch<B::InnerBackend>>,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<TrainingSummary> {
    cfg.validate()?;

    // θ = θ - lr * m / (√v + ε), ε matching the usual 1e-8
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, PairClassifier<B>>();

    let mut model           = model;
    let mut stopper         = EarlyStopping::new(cfg.early_stop);
    let mut steps           = 0usize;
    let mut best_checkpoint = None;
    let mut early_stopped   = false;

    'epochs: for epoch in 1..=cfg.epochs {
        tracing::info!("Epoch {}/{}", epoch, cfg.epochs);

        for batch in train_loader.iter() {
            let (updated, output) = train_step(model, &mut optim, batch, cfg.lr)?;
            model = updated;
            steps += 1;

            // ── Batch metrics (this batch only) ───────────────────────────────
            if steps % cfg.log_interval == 0 {
                let counts = output.counts();
                tracing::info!(
                    "Batch[{}] - loss: {:.4}, acc: {:.4}, f1: {:.4}",
                    steps, output.loss, counts.accuracy(), counts.f1(),
                );
            }

            // ── Dev evaluation ────────────────────────────────────────────────
            if steps % cfg.test_interval == 0 {
                let dev_f1  = evaluate(&model.valid(), dev_loader)?;
                let outcome = stopper.observe(steps, dev_f1);

                metrics.log(&EvalRecord::new(
                    steps, dev_f1, stopper.best_f1(), outcome == EvalOutcome::Improved,
                ))?;

                match outcome {
                    EvalOutcome::Improved => {
                        tracing::info!("New best dev f1 {:.4} at step {}", dev_f1, steps);
                        if cfg.save_best {
                            best_checkpoint = Some(ckpt_manager.save_best(&model, steps, dev_f1)?);
                        }
                    }
                    EvalOutcome::EarlyStop => {
                        tracing::warn!(
                            "early stop by {} steps (best f1 {:.4} at step {})",
                            cfg.early_stop, stopper.best_f1(), stopper.best_step(),
                        );
                        if cfg.enforce_early_stop {
                            early_stopped = true;
                            break 'epochs;
                        }
                    }
                    EvalOutcome::NoImprovement => {
                        tracing::debug!("Dev f1 {:.4} did not improve on {:.4}", dev_f1, stopper.best_f1());
                    }
                }
            }
        }
    }

    tracing::info!(
        "Training finished after {} steps; best dev f1 {:.4} at step {}",
        steps, stopper.best_f1(), stopper.best_step(),
    );

    Ok(TrainingSummary {
        steps,
        best_f1: stopper.best_f1(),
        best_step: stopper.best_step(),
        best_checkpoint,
        early_stopped,
    })
}
