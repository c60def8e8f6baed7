use crate::config::{IntentConfig, RankingOptions};
use crate::error::{RankingError, Result};
use crate::models::{Book, CategoryWeights, Intent, ScoredBook, Selection};
use crate::repository::BookRepository;
use crate::services::category_weight::CategoryWeightCalculator;
use crate::services::intent_policy::IntentWeightPolicy;
use crate::services::retrieval::{order_by_ids, CandidateRetriever};
use std::sync::Arc;
use tracing::{debug, info};

/// Ranking Engine - 召回候選後依推薦目的重排
pub struct RankingEngine {
    repository: Arc<dyn BookRepository>,
    retriever: CandidateRetriever,
    category_calculator: CategoryWeightCalculator,
    intent_config: IntentConfig,
    options: RankingOptions,
}

impl RankingEngine {
    pub fn new(
        repository: Arc<dyn BookRepository>,
        retriever: CandidateRetriever,
        category_calculator: CategoryWeightCalculator,
        intent_config: IntentConfig,
        options: RankingOptions,
    ) -> Self {
        Self {
            repository,
            retriever,
            category_calculator,
            intent_config,
            options,
        }
    }

    /// Ordered recommendations for `selection`. An empty list is a valid
    /// outcome; callers fall back on their own.
    pub async fn rank(&self, selection: &Selection, intents: &[Intent]) -> Result<Vec<Book>> {
        let scored = self.rank_scored(selection, intents).await?;
        Ok(scored.into_iter().map(|s| s.book).collect())
    }

    /// Same as [`RankingEngine::rank`] but keeps each book's score. Without
    /// intents every score is 0.0 and the similarity order is returned.
    pub async fn rank_scored(
        &self,
        selection: &Selection,
        intents: &[Intent],
    ) -> Result<Vec<ScoredBook>> {
        let selected_books = self.resolve_selection(selection).await?;

        let (candidates, _stats) = self.retriever.retrieve(selection, &selected_books).await;

        let scored = if intents.is_empty() || candidates.is_empty() {
            candidates
                .into_iter()
                .enumerate()
                .map(|(retrieval_rank, book)| ScoredBook {
                    book,
                    score: 0.0,
                    retrieval_rank,
                })
                .collect()
        } else {
            let policy = IntentWeightPolicy::new(intents, &self.intent_config);
            let category_weights = if self.options.apply_category_weight {
                Some(self.category_calculator.calculate(&selected_books))
            } else {
                None
            };
            score_and_sort(candidates, &policy, category_weights.as_ref())
        };

        info!(
            selected = selected_books.len(),
            intents = intents.len(),
            ranked = scored.len(),
            category_weighted = self.options.apply_category_weight,
            "Ranking completed"
        );

        Ok(scored)
    }

    /// Books behind the selection, in selection order; none at all is a
    /// validation error.
    pub async fn resolve_selection(&self, selection: &Selection) -> Result<Vec<Book>> {
        if selection.is_empty() {
            return Err(RankingError::Validation("no books selected".to_string()));
        }

        let books = self
            .repository
            .resolve_books(selection.ids())
            .await
            .map_err(RankingError::Repository)?;

        let (books, _missing) = order_by_ids(selection.ids(), books);
        if books.is_empty() {
            return Err(RankingError::Validation(
                "none of the selected books exist in the catalog".to_string(),
            ));
        }

        Ok(books)
    }
}

/// Intent score plus the candidate's category weight. Categories missing from
/// `weights` contribute nothing.
pub fn combined_score(intent_score: f64, weights: &CategoryWeights, book: &Book) -> f64 {
    intent_score + weights.get(book.category_key()).copied().unwrap_or(0.0)
}

fn score_and_sort(
    candidates: Vec<Book>,
    policy: &IntentWeightPolicy,
    category_weights: Option<&CategoryWeights>,
) -> Vec<ScoredBook> {
    let mut scored: Vec<ScoredBook> = candidates
        .into_iter()
        .enumerate()
        .map(|(retrieval_rank, book)| {
            let intent_score = policy.score(&book);
            let score = match category_weights {
                Some(weights) => combined_score(intent_score, weights, &book),
                None => intent_score,
            };
            debug!(isbn = %book.isbn, intent_score, score, "Candidate scored");
            ScoredBook {
                book,
                score,
                retrieval_rank,
            }
        })
        .collect();

    // Stable: equal scores keep similarity order.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}
