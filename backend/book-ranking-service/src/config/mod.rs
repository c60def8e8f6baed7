use crate::error::{RankingError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const ENV_PREFIX: &str = "BOOK_RANKING_";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub retrieval: RetrievalConfig,
    pub category: CategoryWeightConfig,
    pub intent: IntentConfig,
    pub ranking: RankingOptions,
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Neighbours requested from the similarity index.
    pub top_k: usize,
    /// Embedding input limit for the composed query, in characters.
    pub max_query_chars: usize,
    pub max_title_chars: usize,
    pub timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            max_query_chars: 4000,
            max_title_chars: 50,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Shares up to `max_share` (inclusive) map to `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightBand {
    pub max_share: f64,
    pub weight: f64,
}

impl WeightBand {
    pub const fn new(max_share: f64, weight: f64) -> Self {
        Self { max_share, weight }
    }
}

pub const DEFAULT_WEIGHT_BANDS: [WeightBand; 5] = [
    WeightBand::new(0.10, 0.0),
    WeightBand::new(0.19, 0.1),
    WeightBand::new(0.29, 0.2),
    WeightBand::new(0.39, 0.3),
    WeightBand::new(0.49, 0.4),
];

#[derive(Debug, Clone)]
pub struct CategoryWeightConfig {
    /// Ascending by `max_share`.
    pub bands: Vec<WeightBand>,
    /// Weight granted to a share above the last band, before the extra term.
    pub dominant_base_weight: f64,
    /// Size of the known category catalog; 1/N is the uniform baseline share.
    pub total_category_count: usize,
    pub extra_alpha: f64,
    /// Cap on the extra term so one category cannot monopolise.
    pub max_extra_weight: f64,
}

impl Default for CategoryWeightConfig {
    fn default() -> Self {
        Self {
            bands: DEFAULT_WEIGHT_BANDS.to_vec(),
            dominant_base_weight: 0.4,
            total_category_count: 26,
            extra_alpha: 0.5,
            max_extra_weight: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentConfig {
    /// Added to an intent's weight each time it is requested.
    pub increment: f64,
    pub new_release_window_years: i32,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            increment: 0.3,
            new_release_window_years: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankingOptions {
    /// Add the candidate's category weight to its intent score.
    pub apply_category_weight: bool,
}

#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub limit: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Flat view of the `BOOK_RANKING_*` environment, deserialized by envy.
#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default = "default_max_query_chars")]
    max_query_chars: usize,
    #[serde(default = "default_max_title_chars")]
    max_title_chars: usize,
    #[serde(default = "default_retrieval_timeout_ms")]
    retrieval_timeout_ms: u64,
    #[serde(default = "default_total_category_count")]
    total_category_count: usize,
    #[serde(default = "default_extra_alpha")]
    extra_alpha: f64,
    #[serde(default = "default_max_extra_weight")]
    max_extra_weight: f64,
    #[serde(default = "default_intent_increment")]
    intent_increment: f64,
    #[serde(default = "default_new_release_window_years")]
    new_release_window_years: i32,
    #[serde(default)]
    apply_category_weight: bool,
    #[serde(default = "default_fallback_limit")]
    fallback_limit: usize,
}

fn default_top_k() -> usize {
    RetrievalConfig::default().top_k
}

fn default_max_query_chars() -> usize {
    RetrievalConfig::default().max_query_chars
}

fn default_max_title_chars() -> usize {
    RetrievalConfig::default().max_title_chars
}

fn default_retrieval_timeout_ms() -> u64 {
    RetrievalConfig::default().timeout.as_millis() as u64
}

fn default_total_category_count() -> usize {
    CategoryWeightConfig::default().total_category_count
}

fn default_extra_alpha() -> f64 {
    CategoryWeightConfig::default().extra_alpha
}

fn default_max_extra_weight() -> f64 {
    CategoryWeightConfig::default().max_extra_weight
}

fn default_intent_increment() -> f64 {
    IntentConfig::default().increment
}

fn default_new_release_window_years() -> i32 {
    IntentConfig::default().new_release_window_years
}

fn default_fallback_limit() -> usize {
    FallbackConfig::default().limit
}

impl From<EnvConfig> for Config {
    fn from(env: EnvConfig) -> Self {
        Config {
            retrieval: RetrievalConfig {
                top_k: env.top_k,
                max_query_chars: env.max_query_chars,
                max_title_chars: env.max_title_chars,
                timeout: Duration::from_millis(env.retrieval_timeout_ms),
            },
            category: CategoryWeightConfig {
                total_category_count: env.total_category_count,
                extra_alpha: env.extra_alpha,
                max_extra_weight: env.max_extra_weight,
                ..CategoryWeightConfig::default()
            },
            intent: IntentConfig {
                increment: env.intent_increment,
                new_release_window_years: env.new_release_window_years,
            },
            ranking: RankingOptions {
                apply_category_weight: env.apply_category_weight,
            },
            fallback: FallbackConfig {
                limit: env.fallback_limit,
            },
        }
    }
}

impl Config {
    /// Load from `BOOK_RANKING_*` variables (a `.env` file is honoured).
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let env: EnvConfig = envy::prefixed(ENV_PREFIX).from_env()?;
        let config = Config::from(env);
        config.validate()?;
        Ok(config)
    }

    /// Same as [`Config::from_env`] over an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: EnvConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        let config = Config::from(env);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 {
            return Err(invalid("top_k must be positive"));
        }
        if retrieval.max_query_chars == 0 || retrieval.max_title_chars == 0 {
            return Err(invalid("query and title limits must be positive"));
        }
        if retrieval.timeout.is_zero() {
            return Err(invalid("retrieval timeout must be positive"));
        }

        let category = &self.category;
        if category.total_category_count == 0 {
            return Err(invalid("total_category_count must be positive"));
        }
        if !is_unit_weight(category.dominant_base_weight)
            || !non_negative(category.extra_alpha)
            || !non_negative(category.max_extra_weight)
        {
            return Err(invalid("category weight coefficients must be non-negative"));
        }
        let ascending = category
            .bands
            .windows(2)
            .all(|pair| pair[0].max_share < pair[1].max_share);
        if !ascending || category.bands.iter().any(|b| !is_unit_weight(b.weight)) {
            return Err(invalid(
                "category bands must ascend by share with weights in [0, 1]",
            ));
        }

        if !non_negative(self.intent.increment) {
            return Err(invalid("intent increment must be non-negative"));
        }
        if self.intent.new_release_window_years < 0 {
            return Err(invalid("new release window must be non-negative"));
        }

        if self.fallback.limit == 0 {
            return Err(invalid("fallback limit must be positive"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> RankingError {
    RankingError::Config(msg.to_string())
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn is_unit_weight(value: f64) -> bool {
    non_negative(value) && value <= 1.0
}
