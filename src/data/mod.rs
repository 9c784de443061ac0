// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From tab-separated pair files to device-resident tensor batches:
//
//   pairs.tsv
//       │
//       ▼
//   TsvPairLoader     → parses lines into QuestionPairs
//       │                (questions cleaned by Preprocessor)
//       ▼
//   split_train_dev   → optional seeded dev split
//       │
//       ▼
//   encode_pairs      → token ids via the vocabulary tokenizer
//       │
//       ▼
//   PairDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   PairBatcher       → pads and stacks samples on one device
//       │
//       ▼
//   DataLoader        → feeds batches to training / evaluation / prediction
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads question pairs from .tsv files
pub mod loader;

/// Normalises whitespace and control characters in questions
pub mod preprocessor;

/// Tokenised samples and Burn's Dataset implementation
pub mod dataset;

/// Implements Burn's Batcher trait to create padded tensor batches
pub mod batcher;

/// Seeded train/dev split
pub mod splitter;
