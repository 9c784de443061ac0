// ============================================================
// Layer 4 — Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<PairSample>
// into tensors on the model's device.
//
// How batching works here:
//   Input:  N samples, question lengths vary per sample
//   Output: PairBatch with question tensors [N, L1] and [N, L2]
//
//   L1 = max(longest question1 in the batch, min_len)
//   L2 = max(longest question2 in the batch, min_len)
//
//   Shorter rows are right-padded with the padding index.
//   min_len is the widest convolution kernel, so every batch
//   is long enough for the encoder.
//
// The device is fixed when the batcher is built: every tensor
// entering the model is created on that device here, at
// ingestion time, never inside the forward pass.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::PairSample;

// ─── PairBatch ────────────────────────────────────────────────────────────────
/// A batch of question pairs ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    /// Pair identifiers, in batch order
    pub ids: Vec<String>,

    /// Token ids of the first questions — shape: [batch_size, len1]
    pub question1: Tensor<B, 2, Int>,

    /// Token ids of the second questions — shape: [batch_size, len2]
    pub question2: Tensor<B, 2, Int>,

    /// 0/1 labels — shape: [batch_size].
    /// None unless every sample in the batch is labelled.
    pub labels: Option<Tensor<B, 1, Int>>,
}

// ─── PairBatcher ──────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct PairBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,

    /// Rows are padded to at least this many tokens
    pub min_len: usize,

    /// Token id used for padding
    pub pad_id: u32,
}

impl<B: Backend> PairBatcher<B> {
    /// A batcher padding with id 0 to at least `min_len` tokens
    pub fn new(device: B::Device, min_len: usize) -> Self {
        Self { device, min_len, pad_id: 0 }
    }

    pub fn with_pad_id(mut self, pad_id: u32) -> Self {
        self.pad_id = pad_id;
        self
    }

    /// Pad every row to a common width and stack into [rows, width].
    fn stack<'a>(&self, rows: impl Iterator<Item = &'a Vec<u32>> + Clone) -> Tensor<B, 2, Int> {
        let width = rows.clone().map(Vec::len).max().unwrap_or(0).max(self.min_len);

        let mut flat: Vec<i32> = Vec::new();
        let mut count = 0usize;
        for row in rows {
            flat.extend(row.iter().map(|&t| t as i32));
            flat.extend(std::iter::repeat(self.pad_id as i32).take(width - row.len()));
            count += 1;
        }

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([count, width])
    }
}

impl<B: Backend> Batcher<PairSample, PairBatch<B>> for PairBatcher<B> {
    fn batch(&self, items: Vec<PairSample>) -> PairBatch<B> {
        let question1 = self.stack(items.iter().map(|s| &s.question1));
        let question2 = self.stack(items.iter().map(|s| &s.question2));

        let labels = if items.iter().all(|s| s.label.is_some()) {
            let flat: Vec<i32> = items
                .iter()
                .map(|s| s.label.unwrap_or_default() as i32)
                .collect();
            Some(Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device))
        } else {
            None
        };

        PairBatch {
            ids: items.into_iter().map(|s| s.id).collect(),
            question1,
            question2,
            labels,
        }
    }
}
