use crate::config::IntentConfig;
use crate::models::{Book, Intent};
use chrono::Datelike;

/// Intent Weight Policy - 依用戶選擇的推薦目的為候選書打分
///
/// Built once per request and immutable afterwards. Each occurrence of an
/// intent adds `IntentConfig::increment` to its weight, so repeated intents
/// accumulate.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentWeightPolicy {
    best_seller_weight: f64,
    new_release_weight: f64,
    review_weight: f64,
    rating_weight: f64,
    award_weight: f64,
    new_release_window_years: i32,
    reference_year: i32,
}

impl IntentWeightPolicy {
    /// Policy for `intents`, judging new releases against the current UTC year.
    pub fn new(intents: &[Intent], config: &IntentConfig) -> Self {
        Self::with_reference_year(intents, config, chrono::Utc::now().year())
    }

    pub fn with_reference_year(
        intents: &[Intent],
        config: &IntentConfig,
        reference_year: i32,
    ) -> Self {
        let mut weights = [0.0_f64; 5];
        for intent in intents {
            let slot = match intent {
                Intent::BestSeller => 0,
                Intent::NewRelease => 1,
                Intent::ManyReviews => 2,
                Intent::HighRating => 3,
                Intent::AwardWinner => 4,
            };
            weights[slot] += config.increment;
        }

        Self {
            best_seller_weight: weights[0],
            new_release_weight: weights[1],
            review_weight: weights[2],
            rating_weight: weights[3],
            award_weight: weights[4],
            new_release_window_years: config.new_release_window_years,
            reference_year,
        }
    }

    pub fn best_seller_weight(&self) -> f64 {
        self.best_seller_weight
    }

    pub fn new_release_weight(&self) -> f64 {
        self.new_release_weight
    }

    pub fn review_weight(&self) -> f64 {
        self.review_weight
    }

    pub fn rating_weight(&self) -> f64 {
        self.rating_weight
    }

    pub fn award_weight(&self) -> f64 {
        self.award_weight
    }

    /// True when no intent contributes, so every book scores 0.0.
    pub fn is_neutral(&self) -> bool {
        [
            self.best_seller_weight,
            self.new_release_weight,
            self.review_weight,
            self.rating_weight,
            self.award_weight,
        ]
        .iter()
        .all(|w| *w == 0.0)
    }

    /// Intent score of a book. Only comparable within one ranking pass.
    pub fn score(&self, book: &Book) -> f64 {
        let mut score = 0.0;

        if self.best_seller_weight != 0.0 && book.best_seller {
            score += self.best_seller_weight;
        }

        if self.new_release_weight != 0.0 && self.is_new_release(book) {
            score += self.new_release_weight;
        }

        // Log scale keeps heavily reviewed outliers from dominating.
        if self.review_weight != 0.0 {
            score += self.review_weight * (f64::from(book.review_count) + 1.0).ln();
        }

        // 0.0 ~ 5.0 -> 0.0 ~ 1.0
        if self.rating_weight != 0.0 {
            score += self.rating_weight * (book.rating / 5.0);
        }

        if self.award_weight != 0.0 && book.award_winner {
            score += self.award_weight;
        }

        score
    }

    fn is_new_release(&self, book: &Book) -> bool {
        book.published_year >= self.reference_year - self.new_release_window_years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2026;

    fn plain_book() -> Book {
        Book {
            isbn: "9780000000001".to_string(),
            title: "Plain".to_string(),
            author: "Author".to_string(),
            image_url: None,
            category: Some("Fiction".to_string()),
            published_year: 2000,
            rating: 0.0,
            review_count: 0,
            best_seller: false,
            award_winner: false,
        }
    }

    fn policy(intents: &[Intent]) -> IntentWeightPolicy {
        IntentWeightPolicy::with_reference_year(intents, &IntentConfig::default(), YEAR)
    }

    #[test]
    fn test_empty_intents_score_zero() {
        let policy = policy(&[]);
        assert!(policy.is_neutral());

        let mut book = plain_book();
        book.best_seller = true;
        book.award_winner = true;
        book.rating = 5.0;
        book.review_count = 10_000;
        book.published_year = YEAR;

        assert_eq!(policy.score(&book), 0.0);
    }

    #[test]
    fn test_repeated_intent_accumulates() {
        let policy = policy(&[Intent::BestSeller, Intent::BestSeller]);

        assert!((policy.best_seller_weight() - 0.6).abs() < 1e-12);
        assert_eq!(policy.new_release_weight(), 0.0);

        let mut book = plain_book();
        book.best_seller = true;
        assert!((policy.score(&book) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_each_term() {
        let all = policy(&Intent::ALL);

        let mut book = plain_book();
        assert_eq!(all.score(&book), 0.0);

        book.best_seller = true;
        assert!((all.score(&book) - 0.3).abs() < 1e-12);

        book.best_seller = false;
        book.award_winner = true;
        assert!((all.score(&book) - 0.3).abs() < 1e-12);

        book.award_winner = false;
        book.rating = 2.5;
        assert!((all.score(&book) - 0.15).abs() < 1e-12);

        book.rating = 0.0;
        book.review_count = 99;
        assert!((all.score(&book) - 0.3 * 100f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_new_release_window() {
        let policy = policy(&[Intent::NewRelease]);
        let mut book = plain_book();

        book.published_year = YEAR - 2;
        assert!((policy.score(&book) - 0.3).abs() < 1e-12);

        book.published_year = YEAR;
        assert!((policy.score(&book) - 0.3).abs() < 1e-12);

        book.published_year = YEAR - 3;
        assert_eq!(policy.score(&book), 0.0);
    }

    #[test]
    fn test_higher_rating_never_scores_lower() {
        let policy = policy(&[Intent::HighRating, Intent::ManyReviews]);
        let mut previous = f64::MIN;

        for tenth in 0..=50 {
            let mut book = plain_book();
            book.review_count = 42;
            book.rating = f64::from(tenth) / 10.0;
            let score = policy.score(&book);
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_custom_increment() {
        let config = IntentConfig {
            increment: 1.0,
            new_release_window_years: 0,
        };
        let policy = IntentWeightPolicy::with_reference_year(&[Intent::NewRelease], &config, YEAR);
        let mut book = plain_book();

        book.published_year = YEAR;
        assert_eq!(policy.score(&book), 1.0);
        book.published_year = YEAR - 1;
        assert_eq!(policy.score(&book), 0.0);
    }
}
