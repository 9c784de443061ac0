// ============================================================
// Layer 5 — Text Encoder (convolutional feature extractor)
// ============================================================
// Maps a batch of token-id sequences to one fixed-size vector
// per sequence:
//
//   tokens [batch, len]
//     → embedding            [batch, len, embed_dim]
//     → unsqueeze channel    [batch, 1, len, embed_dim]
//     → for each kernel width k:
//         conv (k × embed_dim) [batch, kernel_num, len - k + 1, 1]
//         tanh
//         mean over positions  [batch, kernel_num]
//         tanh
//     → concat over widths   [batch, kernel_num · widths]
//
// Each kernel spans the full embedding dimension, so it only
// slides along the sequence. The mean runs over the valid
// positions only (no padding inside the convolution).
//
// Reference: Kim (2014) Convolutional Neural Networks for
//            Sentence Classification

use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        Embedding, EmbeddingConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::ml::error::ModelError;

#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub embedding:  Embedding<B>,
    pub convs:      Vec<Conv2d<B>>,
    pub kernel_num: usize,
    pub max_kernel: usize,
}

impl<B: Backend> TextEncoder<B> {
    /// Randomly initialised encoder. Callers validate the arguments
    /// (see `PairClassifierConfig::validate`).
    pub fn new(
        vocab_size:   usize,
        embed_dim:    usize,
        kernel_sizes: &[usize],
        kernel_num:   usize,
        device:       &B::Device,
    ) -> Self {
        let embedding = EmbeddingConfig::new(vocab_size, embed_dim).init(device);
        let convs = kernel_sizes
            .iter()
            .map(|&k| Conv2dConfig::new([1, kernel_num], [k, embed_dim]).init(device))
            .collect();

        Self {
            embedding,
            convs,
            kernel_num,
            max_kernel: kernel_sizes.iter().copied().max().unwrap_or(0),
        }
    }

    /// Replace the embedding table, e.g. with pretrained vectors.
    /// The shape must already have been checked.
    pub fn with_embedding_weights(mut self, weights: Tensor<B, 2>) -> Self {
        self.embedding.weight = Param::from_tensor(weights);
        self
    }

    /// Width of the output vector
    pub fn output_dim(&self) -> usize {
        self.kernel_num * self.convs.len()
    }

    /// Device holding the parameters
    pub fn device(&self) -> B::Device {
        self.embedding.weight.val().device()
    }

    /// tokens: [batch, len] → features: [batch, output_dim]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Result<Tensor<B, 2>, ModelError> {
        let [batch_size, seq_len] = tokens.dims();
        if seq_len < self.max_kernel {
            return Err(ModelError::SequenceTooShort { len: seq_len, kernel: self.max_kernel });
        }

        // One input channel for the 2-D convolution
        let x = self.embedding.forward(tokens).unsqueeze_dim::<4>(1);

        let pooled: Vec<Tensor<B, 2>> = self
            .convs
            .iter()
            .map(|conv| {
                let response = activation::tanh(conv.forward(x.clone()));
                let mean     = response.mean_dim(2).reshape([batch_size, self.kernel_num]);
                activation::tanh(mean)
            })
            .collect();

        Ok(Tensor::cat(pooled, 1))
    }
}
