use crate::config::CategoryWeightConfig;
use crate::models::{Book, CategoryWeights};
use std::collections::HashMap;
use tracing::debug;

/// Category Weight Calculator - preference weight from category shares of the selection
pub struct CategoryWeightCalculator {
    config: CategoryWeightConfig,
}

impl Default for CategoryWeightCalculator {
    fn default() -> Self {
        Self::new(CategoryWeightConfig::default())
    }
}

impl CategoryWeightCalculator {
    pub fn new(config: CategoryWeightConfig) -> Self {
        Self { config }
    }

    /// Weight per category of the selected books. An empty selection means
    /// "no category preference" and yields an empty map.
    pub fn calculate(&self, selected_books: &[Book]) -> CategoryWeights {
        if selected_books.is_empty() {
            return CategoryWeights::new();
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for book in selected_books {
            *counts.entry(book.category_key()).or_default() += 1;
        }

        let total = selected_books.len() as f64;
        let weights: CategoryWeights = counts
            .into_iter()
            .map(|(category, count)| {
                let share = count as f64 / total;
                (category.to_string(), self.weight_for_share(share))
            })
            .collect();

        debug!(
            selected = selected_books.len(),
            categories = weights.len(),
            "Category weights computed"
        );

        weights
    }

    /// Banded mapping from a category's share of the selection to a weight.
    /// Above the last band the weight grows with the excess over the uniform
    /// baseline, capped by `max_extra_weight`.
    pub fn weight_for_share(&self, share: f64) -> f64 {
        if let Some(band) = self.config.bands.iter().find(|b| share <= b.max_share) {
            return band.weight;
        }

        let baseline = 1.0 / self.config.total_category_count as f64;
        let extra = ((share - baseline) * self.config.extra_alpha)
            .min(self.config.max_extra_weight)
            .max(0.0);

        (self.config.dominant_base_weight + extra).clamp(0.0, 1.0)
    }
}
