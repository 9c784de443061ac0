// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads question pairs through this
// trait and never sees file formats directly.
//
// Implementations:
//   - TsvPairLoader → tab-separated pair files on disk

use anyhow::Result;
use crate::domain::question_pair::QuestionPair;

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Any component that can produce question pairs.
pub trait PairSource {
    /// Load every available pair, in source order.
    fn load_all(&self) -> Result<Vec<QuestionPair>>;
}
