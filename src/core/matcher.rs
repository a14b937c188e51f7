use std::cmp::Ordering;

use rayon::prelude::*;

use crate::core::{
    distance::distance_between,
    error::EngineError,
    indexer::CandidateIndex,
    scoring::{score_cached, ScoreCache},
};
use crate::models::{HotelRecord, MatchCandidate, MatchResult, MatchStatus, MatchThresholds};

/// Absorbs f64 rounding in score gaps, e.g. 0.95 - 0.90 = 0.04999999999999993
const SCORE_EPSILON: f64 = 1e-9;

/// Decides, per hotel, whether a voucher restaurant match exists
///
/// # Decision
/// 1. Score the hotel against its own location bucket plus the unknown bucket
/// 2. Rank candidates by score, bucket match, normalized name, index order
/// 3. Below the confident threshold -> `none`
/// 4. Within the ambiguity margin of the runner-up -> `ambiguous`
/// 5. Otherwise -> `confident`
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    thresholds: MatchThresholds,
}

impl Matcher {
    /// Create a matcher, rejecting thresholds outside their valid ranges
    pub fn new(thresholds: MatchThresholds) -> Result<Self, EngineError> {
        validate_thresholds(&thresholds)?;
        Ok(Self { thresholds })
    }

    pub fn with_default_thresholds() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
        }
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Collect scored candidates for a hotel
    ///
    /// Hotels with an empty normalized name get no candidates, and restaurants
    /// with an empty normalized name are skipped; neither is ever scored.
    pub fn candidates<'a>(
        &self,
        hotel: &'a HotelRecord,
        index: &'a CandidateIndex,
        cache: &mut ScoreCache,
    ) -> Vec<MatchCandidate<'a>> {
        if hotel.normalized_name.is_empty() {
            return Vec::new();
        }

        index
            .candidates_for(&hotel.location_key)
            .filter(|(restaurant, _)| !restaurant.normalized_name.is_empty())
            .map(|(restaurant, bucket_matched)| {
                let similarity = score_cached(hotel, restaurant, cache);
                MatchCandidate {
                    hotel,
                    restaurant,
                    score: similarity.score,
                    edit_distance: similarity.edit_distance,
                    bucket_matched,
                }
            })
            .collect()
    }

    /// Resolve a hotel's candidates into exactly one result
    pub fn resolve(&self, hotel: &HotelRecord, mut candidates: Vec<MatchCandidate<'_>>) -> MatchResult {
        let considered = candidates.len();

        // stable sort: exact ties fall back to index insertion order
        candidates.sort_by(rank_candidates);

        let mut ranked = candidates.iter();
        let Some(best) = ranked.next() else {
            return MatchResult::unmatched(hotel, 0.0, 0);
        };
        let runner_up = ranked.next().map(|c| c.score);

        if best.score < self.thresholds.confident_threshold {
            return MatchResult::unmatched(hotel, best.score, considered);
        }

        let status = match runner_up {
            Some(second) if best.score - second + SCORE_EPSILON < self.thresholds.ambiguity_margin => {
                MatchStatus::Ambiguous
            }
            _ => MatchStatus::Confident,
        };

        MatchResult {
            hotel: hotel.clone(),
            restaurant: Some(best.restaurant.clone()),
            confidence: best.score,
            status,
            edit_distance: Some(best.edit_distance),
            bucket_matched: best.bucket_matched,
            runner_up_score: runner_up,
            candidates_considered: considered,
            distance_km: distance_between(
                hotel.location.coordinates.as_ref(),
                best.restaurant.location.coordinates.as_ref(),
            ),
        }
    }

    /// Match a single hotel against the index
    pub fn match_hotel(
        &self,
        hotel: &HotelRecord,
        index: &CandidateIndex,
        cache: &mut ScoreCache,
    ) -> MatchResult {
        let candidates = self.candidates(hotel, index, cache);
        let result = self.resolve(hotel, candidates);

        tracing::debug!(
            "Hotel {} ({}) -> {} [confidence {:.3}, {} candidates]",
            hotel.id,
            hotel.location_key,
            result.status,
            result.confidence,
            result.candidates_considered
        );

        result
    }

    /// Match every hotel sequentially, sharing one per-run cache
    pub fn match_all(
        &self,
        hotels: &[HotelRecord],
        index: &CandidateIndex,
        cache: &mut ScoreCache,
    ) -> Vec<MatchResult> {
        hotels
            .iter()
            .map(|hotel| self.match_hotel(hotel, index, cache))
            .collect()
    }

    /// Match every hotel in parallel; each worker owns a cache of `cache_size`
    ///
    /// Output order and content are identical to [`Matcher::match_all`].
    pub fn par_match_all(
        &self,
        hotels: &[HotelRecord],
        index: &CandidateIndex,
        cache_size: usize,
    ) -> Vec<MatchResult> {
        hotels
            .par_iter()
            .map_init(
                || ScoreCache::new(cache_size),
                |cache, hotel| self.match_hotel(hotel, index, cache),
            )
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_thresholds()
    }
}

/// Check CONFIDENT_THRESHOLD is in (0, 1] and AMBIGUITY_MARGIN in [0, 1]
pub fn validate_thresholds(thresholds: &MatchThresholds) -> Result<(), EngineError> {
    let threshold = thresholds.confident_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(EngineError::Configuration(format!(
            "confident_threshold must be in (0, 1], got {}",
            threshold
        )));
    }

    let margin = thresholds.ambiguity_margin;
    if !(0.0..=1.0).contains(&margin) {
        return Err(EngineError::Configuration(format!(
            "ambiguity_margin must be in [0, 1], got {}",
            margin
        )));
    }

    Ok(())
}

/// Best candidate first: higher score, then own-bucket over unknown bucket,
/// then lexicographically smaller normalized name
fn rank_candidates(a: &MatchCandidate<'_>, b: &MatchCandidate<'_>) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.bucket_matched.cmp(&a.bucket_matched))
        .then_with(|| a.restaurant.normalized_name.cmp(&b.restaurant.normalized_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HotelMetadata, Location, LocationKey, RestaurantRecord};

    fn location() -> Location {
        Location {
            city: "Bern".to_string(),
            postal_code: None,
            country: None,
            coordinates: None,
        }
    }

    fn create_hotel(normalized: &str) -> HotelRecord {
        HotelRecord {
            id: "h1".to_string(),
            name: normalized.to_string(),
            normalized_name: normalized.to_string(),
            location: location(),
            location_key: LocationKey::City("bern".to_string()),
            metadata: HotelMetadata::default(),
        }
    }

    fn create_restaurant(id: &str, normalized: &str) -> RestaurantRecord {
        RestaurantRecord {
            id: id.to_string(),
            name: normalized.to_string(),
            normalized_name: normalized.to_string(),
            location: location(),
            location_key: LocationKey::City("bern".to_string()),
            address: None,
            canton: None,
            phone: None,
            accepts_voucher: true,
        }
    }

    fn candidate<'a>(
        hotel: &'a HotelRecord,
        restaurant: &'a RestaurantRecord,
        score: f64,
        bucket_matched: bool,
    ) -> MatchCandidate<'a> {
        MatchCandidate {
            hotel,
            restaurant,
            score,
            edit_distance: 0,
            bucket_matched,
        }
    }

    #[test]
    fn test_no_candidates_is_none() {
        let matcher = Matcher::default();
        let hotel = create_hotel("alpenblick");

        let result = matcher.resolve(&hotel, vec![]);
        assert_eq!(result.status, MatchStatus::None);
        assert!(result.restaurant.is_none());
        assert_eq!(result.candidates_considered, 0);
    }

    #[test]
    fn test_ambiguity_margin() {
        let matcher = Matcher::default();
        let hotel = create_hotel("alpenblick");
        let first = create_restaurant("r1", "alpenblick");
        let second = create_restaurant("r2", "alpenblik");

        let ambiguous = matcher.resolve(
            &hotel,
            vec![candidate(&hotel, &first, 0.90, true), candidate(&hotel, &second, 0.86, true)],
        );
        assert_eq!(ambiguous.status, MatchStatus::Ambiguous);
        assert_eq!(ambiguous.restaurant.map(|r| r.id), Some("r1".to_string()));

        let confident = matcher.resolve(
            &hotel,
            vec![candidate(&hotel, &first, 0.90, true), candidate(&hotel, &second, 0.80, true)],
        );
        assert_eq!(confident.status, MatchStatus::Confident);
        assert_eq!(confident.runner_up_score, Some(0.80));
    }

    #[test]
    fn test_gap_equal_to_margin_is_confident() {
        let matcher = Matcher::default();
        let hotel = create_hotel("abcdefghijklmnopqrst");
        let index = CandidateIndex::build(vec![
            create_restaurant("r1", "abcdefghijklmnopqrsx"),
            create_restaurant("r2", "abcdefghijklmnopqrxy"),
        ]);
        let mut cache = ScoreCache::new(16);

        let result = matcher.match_hotel(&hotel, &index, &mut cache);
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.runner_up_score, Some(0.9));
        assert_eq!(result.status, MatchStatus::Confident);
        assert_eq!(result.restaurant.map(|r| r.id), Some("r1".to_string()));
    }

    #[test]
    fn test_below_threshold_is_none() {
        let matcher = Matcher::default();
        let hotel = create_hotel("alpenblick");
        let restaurant = create_restaurant("r1", "jardin");

        let result = matcher.resolve(&hotel, vec![candidate(&hotel, &restaurant, 0.5, true)]);
        assert_eq!(result.status, MatchStatus::None);
        assert!(result.restaurant.is_none());
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_bucket_match_wins_exact_tie() {
        let matcher = Matcher::default();
        let hotel = create_hotel("alpenblick");
        let unknown = create_restaurant("unknown", "aaa");
        let local = create_restaurant("local", "zzz");

        let result = matcher.resolve(
            &hotel,
            vec![candidate(&hotel, &unknown, 0.95, false), candidate(&hotel, &local, 0.95, true)],
        );
        assert_eq!(result.restaurant.map(|r| r.id), Some("local".to_string()));
        assert!(result.bucket_matched);
    }

    #[test]
    fn test_name_order_breaks_remaining_tie() {
        let matcher = Matcher::default();
        let hotel = create_hotel("alpenblick");
        let later = create_restaurant("later", "zum baren");
        let earlier = create_restaurant("earlier", "alter baren");

        let result = matcher.resolve(
            &hotel,
            vec![candidate(&hotel, &later, 0.9, true), candidate(&hotel, &earlier, 0.9, true)],
        );
        assert_eq!(result.restaurant.map(|r| r.id), Some("earlier".to_string()));
        assert_eq!(result.status, MatchStatus::Ambiguous);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let negative_margin = MatchThresholds {
            confident_threshold: 0.85,
            ambiguity_margin: -0.01,
        };
        assert!(matches!(Matcher::new(negative_margin), Err(EngineError::Configuration(_))));

        let zero_threshold = MatchThresholds {
            confident_threshold: 0.0,
            ambiguity_margin: 0.05,
        };
        assert!(Matcher::new(zero_threshold).is_err());

        let nan_threshold = MatchThresholds {
            confident_threshold: f64::NAN,
            ambiguity_margin: 0.05,
        };
        assert!(Matcher::new(nan_threshold).is_err());

        let full = MatchThresholds {
            confident_threshold: 1.0,
            ambiguity_margin: 1.0,
        };
        assert!(Matcher::new(full).is_ok());
    }

    #[test]
    fn test_blank_hotel_gets_no_candidates() {
        let matcher = Matcher::default();
        let hotel = create_hotel("");
        let index = CandidateIndex::build(vec![create_restaurant("r1", "")]);
        let mut cache = ScoreCache::new(16);

        let result = matcher.match_hotel(&hotel, &index, &mut cache);
        assert_eq!(result.status, MatchStatus::None);
        assert_eq!(result.candidates_considered, 0);
        assert_eq!(cache.misses(), 0);
    }
}
