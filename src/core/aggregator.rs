use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{MatchResult, MatchStatus};

/// Deduplicates, filters and orders match results for rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    include_unmatched: bool,
}

impl Aggregator {
    pub fn new(include_unmatched: bool) -> Self {
        Self { include_unmatched }
    }

    pub fn include_unmatched(&self) -> bool {
        self.include_unmatched
    }

    /// Package results: one entry per hotel id, `none` dropped unless
    /// requested, sorted by confidence descending then hotel name ascending
    pub fn aggregate(&self, results: Vec<MatchResult>) -> Vec<MatchResult> {
        let mut packaged: Vec<MatchResult> = deduplicate(results)
            .into_iter()
            .filter(|r| self.include_unmatched || r.status != MatchStatus::None)
            .collect();

        packaged.sort_by(compare_results);
        packaged
    }
}

/// Keep the highest-confidence entry per hotel id; first seen wins on ties
fn deduplicate(results: Vec<MatchResult>) -> Vec<MatchResult> {
    let mut position: HashMap<String, usize> = HashMap::with_capacity(results.len());
    let mut unique: Vec<MatchResult> = Vec::with_capacity(results.len());

    for result in results {
        match position.get(&result.hotel.id) {
            Some(&at) => {
                tracing::warn!(
                    "Duplicate result for hotel {}; keeping the higher-confidence entry",
                    result.hotel.id
                );
                if result.confidence > unique[at].confidence {
                    unique[at] = result;
                }
            }
            None => {
                position.insert(result.hotel.id.clone(), unique.len());
                unique.push(result);
            }
        }
    }

    unique
}

fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.hotel.normalized_name.cmp(&b.hotel.normalized_name))
        .then_with(|| a.hotel.id.cmp(&b.hotel.id))
}
