pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{RankingError, Result};
pub use models::{Book, CategoryWeights, Intent, Recommendation, RecommendationSource, Selection};
pub use repository::{BookRepository, InMemoryBookRepository};
pub use services::{
    CandidateRetriever, CategoryWeightCalculator, FallbackSelector, IntentWeightPolicy,
    RankingEngine, RecommendationService, SimilaritySearch,
};

use config::{CategoryWeightConfig, IntentConfig};

/// Category weights of the selected books under the default bands.
pub fn compute_category_weights(books: &[Book]) -> CategoryWeights {
    CategoryWeightCalculator::new(CategoryWeightConfig::default()).calculate(books)
}

/// Intent policy with the default increment and new-release window.
pub fn build_intent_policy(intents: &[Intent]) -> IntentWeightPolicy {
    IntentWeightPolicy::new(intents, &IntentConfig::default())
}
