// ============================================================
// Layer 5 — Pairwise Similarity Features
// ============================================================
// The four features the classifier head sees for each pair:
//
//   dot       e1 · e2
//   distance  ‖e1 − e2 + ε‖₂          (ε = 1e-6)
//   jaccard   |S1 ∩ S2| / |S1 ∪ S2|    on raw token-id sets
//   cosine    e1 · e2 / max(‖e1‖‖e2‖, 1e-8)
//
// The distance epsilon keeps the square-root gradient finite
// when a question is paired with itself. The cosine floor maps
// zero-norm vectors to similarity 0 instead of NaN.
//
// Jaccard works on token ids, not embeddings, and carries no
// gradient. The padding id is left out of both sets; if both
// sets end up empty the pair counts as identical (1.0).

use std::collections::HashSet;

use burn::prelude::*;

pub const DISTANCE_EPS: f64 = 1e-6;
pub const COSINE_EPS: f64 = 1e-8;

/// Jaccard overlap of two token sequences treated as sets.
pub fn jaccard(a: &[i64], b: &[i64], padding_idx: Option<i64>) -> f32 {
    let keep  = |t: &&i64| Some(**t) != padding_idx;
    let set_a: HashSet<i64> = a.iter().filter(keep).copied().collect();
    let set_b: HashSet<i64> = b.iter().filter(keep).copied().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }
    set_a.intersection(&set_b).count() as f32 / union as f32
}

/// Row-wise Jaccard of two id batches → [batch, 1] on the batches' device.
pub fn jaccard_batch<B: Backend>(
    q1:          &Tensor<B, 2, Int>,
    q2:          &Tensor<B, 2, Int>,
    padding_idx: Option<i64>,
) -> Tensor<B, 2> {
    let [batch_size, len1] = q1.dims();
    let [_, len2]          = q2.dims();

    let ids1: Vec<i64> = q1.to_data().iter::<i64>().collect();
    let ids2: Vec<i64> = q2.to_data().iter::<i64>().collect();

    let values: Vec<f32> = (0..batch_size)
        .map(|row| {
            jaccard(
                &ids1[row * len1..(row + 1) * len1],
                &ids2[row * len2..(row + 1) * len2],
                padding_idx,
            )
        })
        .collect();

    Tensor::<B, 1>::from_floats(values.as_slice(), &q1.device()).reshape([batch_size, 1])
}

/// [batch, d] × [batch, d] → [batch, 1]
pub fn dot_product<B: Backend>(a: Tensor<B, 2>, b: Tensor<B, 2>) -> Tensor<B, 2> {
    (a * b).sum_dim(1)
}

pub fn euclidean_distance<B: Backend>(a: Tensor<B, 2>, b: Tensor<B, 2>) -> Tensor<B, 2> {
    let diff = (a - b).add_scalar(DISTANCE_EPS);
    (diff.clone() * diff).sum_dim(1).sqrt()
}

pub fn cosine_similarity<B: Backend>(a: Tensor<B, 2>, b: Tensor<B, 2>) -> Tensor<B, 2> {
    let norm_a = (a.clone() * a.clone()).sum_dim(1).sqrt();
    let norm_b = (b.clone() * b.clone()).sum_dim(1).sqrt();
    dot_product(a, b) / (norm_a * norm_b).clamp_min(COSINE_EPS)
}
