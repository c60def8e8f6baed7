use crate::config::Config;
use crate::error::Result;
use crate::models::{Book, Intent, Recommendation, RecommendationSource, Selection};
use crate::repository::BookRepository;
use crate::services::category_weight::CategoryWeightCalculator;
use crate::services::fallback::FallbackSelector;
use crate::services::ranking::RankingEngine;
use crate::services::retrieval::{CandidateRetriever, SimilaritySearch};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Shown when neither similarity nor fallback produced anything.
pub const UNAVAILABLE_ADVISORY: &str =
    "Recommendations are temporarily unavailable. Please try again shortly.";

/// Recommendation Service - ranking with fallback, safe to hand to end users
pub struct RecommendationService {
    engine: RankingEngine,
    fallback: FallbackSelector,
}

impl RecommendationService {
    pub fn new(engine: RankingEngine, fallback: FallbackSelector) -> Self {
        Self { engine, fallback }
    }

    /// Wire the full pipeline from configuration and the two collaborators.
    pub fn from_config(
        config: &Config,
        search: Arc<dyn SimilaritySearch>,
        repository: Arc<dyn BookRepository>,
    ) -> Self {
        let retriever =
            CandidateRetriever::new(search, repository.clone(), config.retrieval.clone());
        let engine = RankingEngine::new(
            repository.clone(),
            retriever,
            CategoryWeightCalculator::new(config.category.clone()),
            config.intent.clone(),
            config.ranking.clone(),
        );
        let fallback = FallbackSelector::new(repository, config.fallback.clone());

        Self::new(engine, fallback)
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    /// Recommendations for the selected ISBNs and intent names.
    ///
    /// Only validation problems (unknown intent, nothing resolvable in the
    /// selection) are returned as errors. Everything else degrades to the
    /// fallback list or to an empty list with [`UNAVAILABLE_ADVISORY`].
    pub async fn recommend<S: AsRef<str>>(
        &self,
        isbns: &[String],
        intent_names: &[S],
    ) -> Result<Recommendation> {
        let request_id = Uuid::new_v4();
        let span = info_span!("recommend", %request_id, selected = isbns.len());

        self.recommend_inner(request_id, isbns, intent_names)
            .instrument(span)
            .await
    }

    async fn recommend_inner<S: AsRef<str>>(
        &self,
        request_id: Uuid,
        isbns: &[String],
        intent_names: &[S],
    ) -> Result<Recommendation> {
        let intents = Intent::parse_all(intent_names)?;
        let selection = Selection::new(isbns.iter().cloned());

        match self.engine.rank(&selection, &intents).await {
            Ok(books) if !books.is_empty() => {
                info!(count = books.len(), "Serving similarity recommendations");
                return Ok(Self::outcome(request_id, books, RecommendationSource::Similarity));
            }
            Ok(_) => info!("Ranking produced no candidates, trying fallback"),
            Err(e) if e.is_validation() => return Err(e),
            Err(e) => warn!(error = %e, "Ranking failed, trying fallback"),
        }

        let books = match self.fallback_books(&selection).await {
            Ok(books) => books,
            Err(e) => {
                warn!(error = %e, "Fallback selection failed");
                Vec::new()
            }
        };

        if books.is_empty() {
            warn!("No recommendations available");
            return Ok(Self::outcome(request_id, books, RecommendationSource::Unavailable));
        }

        info!(count = books.len(), "Serving fallback recommendations");
        Ok(Self::outcome(request_id, books, RecommendationSource::Fallback))
    }

    async fn fallback_books(&self, selection: &Selection) -> Result<Vec<Book>> {
        let selected_books = self.engine.resolve_selection(selection).await?;
        self.fallback.select(&selected_books).await
    }

    fn outcome(request_id: Uuid, books: Vec<Book>, source: RecommendationSource) -> Recommendation {
        let advisory = match source {
            RecommendationSource::Unavailable => Some(UNAVAILABLE_ADVISORY.to_string()),
            _ => None,
        };

        Recommendation {
            request_id,
            books,
            source,
            advisory,
        }
    }
}
