/// Ranking Module
///
/// Turns a selection into an ordered recommendation list.
///
/// # Workflow
/// 1. Resolve the selection to books (empty -> validation error)
/// 2. Retrieve similarity candidates (already-selected books excluded)
/// 3. Without intents, keep the similarity order
/// 4. With intents, score by intent policy (plus category weight when enabled)
///    and stable-sort descending so ties keep similarity order
pub mod engine;

pub use engine::{combined_score, RankingEngine};
