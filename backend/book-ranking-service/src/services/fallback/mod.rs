use crate::config::FallbackConfig;
use crate::error::{RankingError, Result};
use crate::models::Book;
use crate::repository::BookRepository;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Fallback Selector - 召回為空時改推薦用戶尚未涉獵的類別
pub struct FallbackSelector {
    repository: Arc<dyn BookRepository>,
    config: FallbackConfig,
}

impl FallbackSelector {
    pub fn new(repository: Arc<dyn BookRepository>, config: FallbackConfig) -> Self {
        Self { repository, config }
    }

    /// Up to `limit` books outside the categories already represented in the
    /// selection, in repository order.
    pub async fn select(&self, selected_books: &[Book]) -> Result<Vec<Book>> {
        let avoided = represented_categories(selected_books);

        let mut books = self
            .repository
            .find_excluding_categories(&avoided)
            .await
            .map_err(RankingError::Repository)?;
        books.truncate(self.config.limit);

        info!(
            avoided_categories = avoided.len(),
            selected = books.len(),
            "Fallback selection completed"
        );

        Ok(books)
    }
}

/// Distinct non-empty categories of the selected books.
pub fn represented_categories(selected_books: &[Book]) -> HashSet<String> {
    selected_books
        .iter()
        .filter_map(|b| b.defined_category())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{book, MockRepository};

    #[tokio::test]
    async fn test_excludes_selected_categories_and_limits() {
        let mut repository = MockRepository::new();
        repository
            .expect_find_excluding_categories()
            .withf(|excluded| {
                excluded.len() == 2 && excluded.contains("Fiction") && excluded.contains("Poetry")
            })
            .times(1)
            .returning(|_| {
                Ok((0..15)
                    .map(|i| book(&format!("other-{i}"), Some("History")))
                    .collect())
            });

        let selector = FallbackSelector::new(Arc::new(repository), FallbackConfig::default());
        let selected = vec![
            book("1", Some("Fiction")),
            book("2", Some("Poetry")),
            book("3", Some("Fiction")),
            book("4", None),
            book("5", Some("")),
        ];

        let books = selector.select(&selected).await.unwrap();

        assert_eq!(books.len(), 10);
        assert_eq!(books[0].isbn, "other-0");
        assert_eq!(books[9].isbn, "other-9");
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let mut repository = MockRepository::new();
        repository
            .expect_find_excluding_categories()
            .returning(|_| Ok(Vec::new()));

        let selector = FallbackSelector::new(Arc::new(repository), FallbackConfig::default());
        let books = selector.select(&[book("1", Some("Fiction"))]).await.unwrap();

        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut repository = MockRepository::new();
        repository
            .expect_find_excluding_categories()
            .returning(|_| Err(anyhow::anyhow!("timeout")));

        let selector = FallbackSelector::new(Arc::new(repository), FallbackConfig { limit: 3 });
        let err = selector.select(&[book("1", None)]).await.unwrap_err();

        assert!(matches!(err, RankingError::Repository(_)));
    }

    #[test]
    fn test_represented_categories_skips_undefined() {
        let categories = represented_categories(&[
            book("1", Some("Travel")),
            book("2", None),
            book("3", Some("")),
            book("4", Some("Travel")),
        ]);

        assert_eq!(categories.len(), 1);
        assert!(categories.contains("Travel"));
    }
}
