// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs      — best-model weights (BinFileRecorder),
//                        best_checkpoint.json pointer and
//                        model_config.json
//
//   tokenizer_store.rs — word-level vocabulary built from the
//                        training questions, saved as
//                        tokenizer.json and reloaded for
//                        prediction
//
//   embeddings.rs      — optional GloVe-style pretrained
//                        vectors for the embedding table
//
//   metrics.rs         — one CSV row per dev evaluation
//
//   results.rs         — the `<id>\t<label>` result file
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary building, saving, and loading
pub mod tokenizer_store;

/// Pretrained word vectors
pub mod embeddings;

/// Dev evaluation CSV logger
pub mod metrics;

/// Prediction result file
pub mod results;
