use crate::config::RetrievalConfig;
use crate::models::{Book, RetrievalStats, SearchHit, Selection};
use crate::repository::BookRepository;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// External embedding-similarity index.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Up to `top_k` items most similar to `query`, most similar first.
    async fn similarity_search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Why a similarity search produced nothing usable. Never escapes the retriever.
#[derive(Debug, Error)]
pub enum RetrievalFailure {
    #[error("similarity search timed out after {0:?}")]
    Elapsed(Duration),

    #[error("similarity search failed: {0}")]
    Search(#[source] anyhow::Error),
}

/// Candidate Retriever - 相似度召回候選書
pub struct CandidateRetriever {
    search: Arc<dyn SimilaritySearch>,
    repository: Arc<dyn BookRepository>,
    config: RetrievalConfig,
}

impl CandidateRetriever {
    pub fn new(
        search: Arc<dyn SimilaritySearch>,
        repository: Arc<dyn BookRepository>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            search,
            repository,
            config,
        }
    }

    pub fn build_query(&self, selected_books: &[Book]) -> String {
        build_query(
            selected_books,
            self.config.max_title_chars,
            self.config.max_query_chars,
        )
    }

    /// Candidates similar to the selection, in similarity order. Books the
    /// user already selected are never returned. Retrieval and resolution
    /// failures degrade to an empty list.
    pub async fn retrieve(
        &self,
        selection: &Selection,
        selected_books: &[Book],
    ) -> (Vec<Book>, RetrievalStats) {
        let mut stats = RetrievalStats::default();

        let query = self.build_query(selected_books);
        if query.is_empty() {
            debug!("Selected books carry no title or category, skipping similarity search");
            return (Vec::new(), stats);
        }

        let hits = match self.search_with_timeout(&query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Similarity search failed, returning no candidates");
                return (Vec::new(), stats);
            }
        };
        stats.hit_count = hits.len();

        let ids = self.filter_hits(selection, hits, &mut stats);
        if ids.is_empty() {
            return (Vec::new(), stats);
        }

        let resolved = match self.repository.resolve_books(&ids).await {
            Ok(books) => books,
            Err(e) => {
                warn!(error = %e, "Candidate resolution failed, returning no candidates");
                return (Vec::new(), stats);
            }
        };

        let (candidates, unresolved) = order_by_ids(&ids, resolved);
        stats.unresolved += unresolved;
        stats.candidate_count = candidates.len();

        info!(
            hits = stats.hit_count,
            excluded_selected = stats.excluded_selected,
            duplicates = stats.duplicate_hits,
            unresolved = stats.unresolved,
            candidates = stats.candidate_count,
            "Candidate retrieval completed"
        );

        (candidates, stats)
    }

    async fn search_with_timeout(&self, query: &str) -> Result<Vec<SearchHit>, RetrievalFailure> {
        let search = self.search.similarity_search(query, self.config.top_k);

        match tokio::time::timeout(self.config.timeout, search).await {
            Ok(Ok(hits)) => Ok(hits),
            Ok(Err(e)) => Err(RetrievalFailure::Search(e)),
            Err(_) => Err(RetrievalFailure::Elapsed(self.config.timeout)),
        }
    }

    /// Drop selected, duplicate and blank identifiers, keeping hit order.
    fn filter_hits(
        &self,
        selection: &Selection,
        hits: Vec<SearchHit>,
        stats: &mut RetrievalStats,
    ) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut ids = Vec::with_capacity(hits.len());

        for hit in hits {
            if hit.id.trim().is_empty() {
                stats.unresolved += 1;
                continue;
            }
            if selection.contains(&hit.id) {
                stats.excluded_selected += 1;
                continue;
            }
            if !seen.insert(hit.id.clone()) {
                stats.duplicate_hits += 1;
                continue;
            }
            ids.push(hit.id);
        }

        ids
    }
}

/// Arrange `books` in the order of `ids`. Returns the arranged books and the
/// number of ids that had no book.
pub(crate) fn order_by_ids(ids: &[String], books: Vec<Book>) -> (Vec<Book>, usize) {
    let mut by_isbn: HashMap<String, Book> = books
        .into_iter()
        .map(|book| (book.isbn.clone(), book))
        .collect();

    let mut ordered = Vec::with_capacity(ids.len());
    let mut missing = 0;
    for id in ids {
        match by_isbn.remove(id) {
            Some(book) => ordered.push(book),
            None => {
                debug!(isbn = %id, "No catalog entry for identifier");
                missing += 1;
            }
        }
    }
    (ordered, missing)
}

/// Text sent to the embedding model: per selected book its category and
/// (shortened) title, in selection order, cut to `max_query_chars` overall.
pub fn build_query(books: &[Book], max_title_chars: usize, max_query_chars: usize) -> String {
    let query = books
        .iter()
        .map(|book| query_fragment(book, max_title_chars))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&query, max_query_chars).to_string()
}

fn query_fragment(book: &Book, max_title_chars: usize) -> String {
    let mut fragment = String::new();
    if let Some(category) = book.defined_category() {
        fragment.push_str(category);
        fragment.push(' ');
    }
    fragment.push_str(truncate_chars(&book.title, max_title_chars));
    fragment.trim().to_string()
}

/// Longest prefix of `s` with at most `max_chars` characters.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
