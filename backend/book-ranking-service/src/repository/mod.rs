use crate::models::Book;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Persistence lookups the ranking engine depends on.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Books for the given identifiers. Unknown identifiers are skipped and the
    /// result order is not guaranteed to follow `isbns`.
    async fn resolve_books(&self, isbns: &[String]) -> Result<Vec<Book>>;

    /// Books whose category is not in `excluded`. Books without a category
    /// always qualify.
    async fn find_excluding_categories(&self, excluded: &HashSet<String>) -> Result<Vec<Book>>;
}

/// In-memory catalog, kept in insertion order.
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookRepository {
    pub fn new(books: Vec<Book>) -> Self {
        let mut catalog = Vec::with_capacity(books.len());
        for book in books {
            upsert(&mut catalog, book);
        }
        Self {
            books: RwLock::new(catalog),
        }
    }

    /// Insert or replace by ISBN.
    pub async fn upsert(&self, book: Book) {
        let mut books = self.books.write().await;
        upsert(&mut books, book);
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

fn upsert(books: &mut Vec<Book>, book: Book) {
    match books.iter_mut().find(|b| b.isbn == book.isbn) {
        Some(existing) => *existing = book,
        None => books.push(book),
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn resolve_books(&self, isbns: &[String]) -> Result<Vec<Book>> {
        let wanted: HashSet<&str> = isbns.iter().map(String::as_str).collect();
        let books = self.books.read().await;

        Ok(books
            .iter()
            .filter(|b| wanted.contains(b.isbn.as_str()))
            .cloned()
            .collect())
    }

    async fn find_excluding_categories(&self, excluded: &HashSet<String>) -> Result<Vec<Book>> {
        let books = self.books.read().await;

        Ok(books
            .iter()
            .filter(|b| match b.defined_category() {
                Some(category) => !excluded.contains(category),
                None => true,
            })
            .cloned()
            .collect())
    }
}
