pub mod category_weight;
pub mod fallback;
pub mod intent_policy;
pub mod ranking;
pub mod recommendation;
pub mod retrieval;

pub use category_weight::CategoryWeightCalculator;
pub use fallback::FallbackSelector;
pub use intent_policy::IntentWeightPolicy;
pub use ranking::RankingEngine;
pub use recommendation::RecommendationService;
pub use retrieval::{CandidateRetriever, SimilaritySearch};
