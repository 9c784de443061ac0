use anyhow::Result;
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::domain::question_pair::QuestionPair;
use crate::infra::tokenizer_store::encode_ids;

/// One tokenised question pair. Sequences are unpadded;
/// the batcher pads per batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSample {
    pub id:        String,
    pub question1: Vec<u32>,
    pub question2: Vec<u32>,
    pub label:     Option<u8>,
}

impl PairSample {
    pub fn encode(pair: &QuestionPair, tokenizer: &Tokenizer) -> Result<Self> {
        Ok(Self {
            id:        pair.id.clone(),
            question1: encode_ids(tokenizer, &pair.question1)?,
            question2: encode_ids(tokenizer, &pair.question2)?,
            label:     pair.label,
        })
    }
}

pub fn encode_pairs(pairs: &[QuestionPair], tokenizer: &Tokenizer) -> Result<Vec<PairSample>> {
    pairs.iter().map(|p| PairSample::encode(p, tokenizer)).collect()
}

pub struct PairDataset {
    samples: Vec<PairSample>,
}

impl PairDataset {
    pub fn new(samples: Vec<PairSample>) -> Self { Self { samples } }
}

impl Dataset<PairSample> for PairDataset {
    fn get(&self, index: usize) -> Option<PairSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
