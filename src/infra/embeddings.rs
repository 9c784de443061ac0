// ============================================================
// Layer 6 — Pretrained Embeddings
// ============================================================
// Reads a GloVe / word2vec text file:
//
//   [<count> <dim>]          ← optional header, skipped
//   word v1 v2 ... vD
//   ...
//
// into a [vocab_size, embed_dim] matrix for the encoder's
// embedding table. Rows for vocabulary words present in the
// file are copied; every other row keeps a seeded uniform
// init in [-0.25, 0.25]. A row with the wrong width is an
// error naming its line.

use anyhow::{bail, Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use burn::{prelude::*, tensor::TensorData};
use rand::{rngs::StdRng, Rng, SeedableRng};

const INIT_RANGE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct PretrainedEmbeddings {
    /// Row-major [vocab_size, embed_dim]
    pub weights:    Vec<f32>,
    pub vocab_size: usize,
    pub embed_dim:  usize,
    /// Vocabulary rows copied from the file
    pub found:      usize,
}

impl PretrainedEmbeddings {
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let data = TensorData::new(self.weights.clone(), [self.vocab_size, self.embed_dim]);
        Tensor::from_data(data, device)
    }
}

pub fn load_pretrained(
    path:       &Path,
    vocab:      &HashMap<String, u32>,
    vocab_size: usize,
    embed_dim:  usize,
    seed:       u64,
) -> Result<PretrainedEmbeddings> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open pretrained embeddings '{}'", path.display()))?;

    let embeddings = read_vectors(BufReader::new(file), vocab, vocab_size, embed_dim, seed)
        .with_context(|| format!("Cannot read pretrained embeddings '{}'", path.display()))?;

    tracing::info!(
        "Pretrained embeddings: {}/{} vocabulary rows found in '{}'",
        embeddings.found, vocab_size, path.display()
    );
    Ok(embeddings)
}

pub fn read_vectors<R: BufRead>(
    reader:     R,
    vocab:      &HashMap<String, u32>,
    vocab_size: usize,
    embed_dim:  usize,
    seed:       u64,
) -> Result<PretrainedEmbeddings> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut weights: Vec<f32> = (0..vocab_size * embed_dim)
        .map(|_| rng.gen_range(-INIT_RANGE..=INIT_RANGE))
        .collect();
    let mut found = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let mut fields = line.split_whitespace();

        let Some(word) = fields.next() else { continue };
        let values: Vec<&str> = fields.collect();

        if line_no == 1 && is_header(word, &values) {
            continue;
        }
        if values.len() != embed_dim {
            bail!("line {line_no}: expected {embed_dim} values, found {}", values.len());
        }

        let Some(&id) = vocab.get(word) else { continue };
        let id = id as usize;
        if id >= vocab_size {
            continue;
        }

        let row = &mut weights[id * embed_dim..(id + 1) * embed_dim];
        for (slot, value) in row.iter_mut().zip(&values) {
            *slot = value
                .parse()
                .with_context(|| format!("line {line_no}: '{value}' is not a number"))?;
        }
        found += 1;
    }

    Ok(PretrainedEmbeddings { weights, vocab_size, embed_dim, found })
}

fn is_header(first: &str, rest: &[&str]) -> bool {
    rest.len() == 1 && first.parse::<usize>().is_ok() && rest[0].parse::<usize>().is_ok()
}
