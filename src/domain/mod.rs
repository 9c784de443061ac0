// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing question pairs,
// predictions and classification scores.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, functions and traits
//
// Everything here is unit-testable without a tensor backend.

// A question pair and the prediction made for it
pub mod question_pair;

// Accuracy / precision / recall / F1 over binary predictions
pub mod scores;

// Core abstractions (traits) that other layers implement
pub mod traits;
