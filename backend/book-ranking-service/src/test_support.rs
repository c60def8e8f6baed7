//! Doubles and fixtures shared by the unit tests.

use crate::models::{Book, SearchHit};
use crate::repository::BookRepository;
use crate::services::retrieval::SimilaritySearch;
use async_trait::async_trait;
use mockall::mock;
use std::collections::HashSet;
use std::time::Duration;

mock! {
    pub Search {}

    #[async_trait]
    impl SimilaritySearch for Search {
        async fn similarity_search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SearchHit>>;
    }
}

mock! {
    pub Repository {}

    #[async_trait]
    impl BookRepository for Repository {
        async fn resolve_books(&self, isbns: &[String]) -> anyhow::Result<Vec<Book>>;
        async fn find_excluding_categories(&self, excluded: &HashSet<String>) -> anyhow::Result<Vec<Book>>;
    }
}

/// Search that answers only after `delay`.
pub struct SlowSearch {
    pub delay: Duration,
    pub hits: Vec<SearchHit>,
}

#[async_trait]
impl SimilaritySearch for SlowSearch {
    async fn similarity_search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<SearchHit>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.hits.clone())
    }
}

pub fn book(isbn: &str, category: Option<&str>) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: format!("Title {isbn}"),
        author: "Author".to_string(),
        image_url: None,
        category: category.map(str::to_string),
        published_year: 2010,
        rating: 3.0,
        review_count: 0,
        best_seller: false,
        award_winner: false,
    }
}

pub fn hits(ids: &[&str]) -> Vec<SearchHit> {
    ids.iter().map(|id| SearchHit::new(*id)).collect()
}

pub fn isbns(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.isbn.as_str()).collect()
}
