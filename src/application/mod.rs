// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal: training a
// classifier, or labelling a test file with one.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - File formats belong to Layers 4 and 6
//   - Only workflow coordination and backend choice
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// CPU / GPU backend selection
pub mod backend;

// The training workflow
pub mod train_use_case;

// The prediction workflow
pub mod predict_use_case;
