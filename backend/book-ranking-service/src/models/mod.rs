use crate::error::RankingError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Catalog record as stored by the persistence layer. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub published_year: i32,
    pub rating: f64,
    pub review_count: u32,
    pub best_seller: bool,
    pub award_winner: bool,
}

impl Book {
    /// Grouping key for category weighting. Missing and empty categories
    /// collapse into the same "undefined" bucket keyed by `""`.
    pub fn category_key(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    /// Category label if it is set and non-empty.
    pub fn defined_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Books the user picked for this request, in pick order, without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
    lookup: HashSet<String>,
}

impl Selection {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for id in ids {
            let id = id.into();
            if selection.lookup.insert(id.clone()) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Ranking preference a user can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    BestSeller,
    NewRelease,  // published within the new-release window
    ManyReviews,
    HighRating,
    AwardWinner, // literary or professional prize winners
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::BestSeller,
        Intent::NewRelease,
        Intent::ManyReviews,
        Intent::HighRating,
        Intent::AwardWinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::BestSeller => "BEST_SELLER",
            Intent::NewRelease => "NEW_RELEASE",
            Intent::ManyReviews => "MANY_REVIEWS",
            Intent::HighRating => "HIGH_RATING",
            Intent::AwardWinner => "AWARD_WINNER",
        }
    }

    /// Parse a list of intent names, failing on the first unknown one.
    pub fn parse_all<I, S>(names: I) -> Result<Vec<Intent>, RankingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s.trim())
            .ok_or_else(|| RankingError::Validation(format!("unknown recommendation intent: {s}")))
    }
}

/// Category name -> preference weight in [0.0, 1.0].
pub type CategoryWeights = HashMap<String, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBook {
    pub book: Book,
    pub score: f64,
    /// Position in the similarity-ordered candidate list.
    pub retrieval_rank: usize,
}

/// One hit from the external similarity index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SearchHit {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Similarity retrieval, optionally re-ranked by intents.
    Similarity,
    /// Books outside the user's categories.
    Fallback,
    Unavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub request_id: Uuid,
    pub books: Vec<Book>,
    pub source: RecommendationSource,
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RetrievalStats {
    pub hit_count: usize,
    pub excluded_selected: usize,
    pub duplicate_hits: usize,
    pub unresolved: usize,
    pub candidate_count: usize,
}
