// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Builds a word-level vocabulary from the training questions
// and persists it as a HuggingFace `tokenizer.json`, so
// prediction encodes text with exactly the ids the model was
// trained on.
//
// Ids:
//   0       [PAD]
//   1       [UNK]
//   2..     words, most frequent first (ties alphabetical)
//
// The tokenizer JSON is written directly instead of going
// through a tokenizers Trainer: in tokenizers 0.15,
// train_from_files requires Trainer::Model to equal
// ModelWrapper, which WordLevelTrainer does not satisfy.
//
// Words are counted with the same Lowercase normalizer and
// Whitespace pre-tokenizer that are serialised into the JSON,
// so every counted word is a word the tokenizer will produce.

use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
};
use tokenizers::{
    normalizers::Lowercase,
    pre_tokenizers::whitespace::Whitespace,
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer,
};

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_ID:    u32  = 0;
pub const UNK_ID:    u32  = 1;

const SPECIAL_TOKENS: usize = 2;
const FILE_NAME: &str = "tokenizer.json";

/// Token ids for `text`, without special tokens.
pub fn encode_ids(tokenizer: &Tokenizer, text: &str) -> Result<Vec<u32>> {
    let encoding = tokenizer
        .encode(text, false)
        .map_err(|e| anyhow!("Cannot tokenize '{text}': {e}"))?;
    Ok(encoding.get_ids().to_vec())
}

/// Words of `text` as the saved tokenizer sees them: lowercased, then
/// split into `\w+` runs and punctuation runs.
pub fn split_words(text: &str) -> Result<Vec<String>> {
    let mut pretokenized = PreTokenizedString::from(text);
    pretokenized
        .normalize(|s| Lowercase.normalize(s))
        .map_err(|e| anyhow!("Cannot normalize '{text}': {e}"))?;
    Whitespace::default()
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| anyhow!("Cannot pre-tokenize '{text}': {e}"))?;

    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(word, _, _)| word.to_string())
        .collect())
}

/// Up to `max_words` words, by descending count then alphabetically.
pub fn rank_words<'a>(texts: impl IntoIterator<Item = &'a str>, max_words: usize) -> Result<Vec<String>> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in split_words(text)? {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(max_words);
    Ok(words.into_iter().map(|(w, _)| w).collect())
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(FILE_NAME)
    }

    /// Load the tokenizer a training run saved in this directory.
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path).map_err(|e| {
            anyhow!(
                "Cannot load tokenizer from '{}': {}. Make sure you have run 'train' first.",
                path.display(), e
            )
        })
    }

    /// Build a vocabulary of at most `vocab_size` entries (specials
    /// included) from `texts`, save it, and load it back.
    pub fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        if vocab_size <= SPECIAL_TOKENS {
            anyhow::bail!("vocab_size must exceed {SPECIAL_TOKENS}, got {vocab_size}");
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create tokenizer directory '{}'", self.dir.display()))?;

        let words = rank_words(texts.iter().map(String::as_str), vocab_size - SPECIAL_TOKENS)?;

        let mut vocab = serde_json::json!({
            PAD_TOKEN: PAD_ID,
            UNK_TOKEN: UNK_ID,
        });
        for (i, word) in words.iter().enumerate() {
            vocab[word.as_str()] = serde_json::json!(SPECIAL_TOKENS + i);
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": PAD_ID, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": UNK_ID, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": serde_json::to_value(Lowercase)?,
            "pre_tokenizer": serde_json::to_value(Whitespace::default())?,
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer to '{}'", path.display()))?;

        tracing::info!(
            "Tokenizer built with {} words (+{} specials), saved to '{}'",
            words.len(), SPECIAL_TOKENS, path.display()
        );

        self.load()
    }
}
