use std::collections::HashSet;

use validator::Validate;

use crate::core::{
    aggregator::Aggregator,
    error::{EngineError, RecordKind},
    indexer::CandidateIndex,
    matcher::{validate_thresholds, Matcher},
    normalizer::{Normalizer, DEFAULT_STOP_TERMS},
    scoring::{ScoreCache, DEFAULT_CACHE_SIZE},
};
use crate::models::{
    HotelRecord, Location, MatchReport, MatchResult, MatchThresholds, RawHotel, RawRestaurant,
    RestaurantRecord,
};

/// Everything the engine needs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub thresholds: MatchThresholds,
    pub include_unmatched: bool,
    pub stop_terms: Vec<String>,
    pub cache_size: usize,
    pub parallel: bool,
    pub workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            include_unmatched: false,
            stop_terms: DEFAULT_STOP_TERMS.iter().map(|t| t.to_string()).collect(),
            cache_size: DEFAULT_CACHE_SIZE,
            parallel: true,
            workers: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_thresholds(&self.thresholds)?;

        if self.workers == Some(0) {
            return Err(EngineError::Configuration(
                "workers must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Entity-resolution engine linking hotels to voucher restaurants
///
/// A run validates and normalizes both record sets, indexes restaurants by
/// location, matches every hotel and packages the results. Nothing is kept
/// between runs.
#[derive(Debug, Clone)]
pub struct LinkEngine {
    normalizer: Normalizer,
    matcher: Matcher,
    aggregator: Aggregator,
    cache_size: usize,
    parallel: bool,
    workers: Option<usize>,
}

impl LinkEngine {
    /// Build an engine; invalid configuration is rejected before any matching
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let matcher = Matcher::new(config.thresholds)?;
        Ok(Self::with_matcher(config, matcher))
    }

    fn with_matcher(config: EngineConfig, matcher: Matcher) -> Self {
        Self {
            normalizer: Normalizer::new(&config.stop_terms),
            matcher,
            aggregator: Aggregator::new(config.include_unmatched),
            cache_size: config.cache_size,
            parallel: config.parallel,
            workers: config.workers,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Turn raw hotels into records, failing on the first malformed one
    pub fn ingest_hotels(&self, raw: Vec<RawHotel>) -> Result<Vec<HotelRecord>, EngineError> {
        raw.into_iter()
            .enumerate()
            .map(|(position, hotel)| {
                check(&hotel, RecordKind::Hotel, position, &hotel.id)?;
                Ok::<_, EngineError>(self.hotel_record(hotel))
            })
            .collect()
    }

    /// Turn raw restaurants into records, failing on the first malformed one
    pub fn ingest_restaurants(
        &self,
        raw: Vec<RawRestaurant>,
    ) -> Result<Vec<RestaurantRecord>, EngineError> {
        raw.into_iter()
            .enumerate()
            .map(|(position, restaurant)| {
                check(&restaurant, RecordKind::Restaurant, position, &restaurant.id)?;
                Ok::<_, EngineError>(self.restaurant_record(restaurant))
            })
            .collect()
    }

    /// Match every hotel, returning one result per hotel in input order
    pub fn match_records(
        &self,
        hotels: &[HotelRecord],
        restaurants: Vec<RestaurantRecord>,
    ) -> Vec<MatchResult> {
        let index = CandidateIndex::build(restaurants);

        if !self.parallel {
            let mut cache = ScoreCache::new(self.cache_size);
            let results = self.matcher.match_all(hotels, &index, &mut cache);
            tracing::debug!("Score cache: {} hits, {} misses", cache.hits(), cache.misses());
            return results;
        }

        match self.workers {
            Some(workers) => match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => {
                    pool.install(|| self.matcher.par_match_all(hotels, &index, self.cache_size))
                }
                Err(e) => {
                    tracing::warn!("Failed to build a {}-thread pool ({}), using the global pool", workers, e);
                    self.matcher.par_match_all(hotels, &index, self.cache_size)
                }
            },
            None => self.matcher.par_match_all(hotels, &index, self.cache_size),
        }
    }

    /// Full run: validate, normalize, index, match and aggregate
    ///
    /// Any validation error aborts before matching; no partial results.
    pub fn run(
        &self,
        hotels: Vec<RawHotel>,
        restaurants: Vec<RawRestaurant>,
    ) -> Result<Vec<MatchResult>, EngineError> {
        let hotels = self.ingest_hotels(hotels)?;
        let restaurants = self.ingest_restaurants(restaurants)?;

        tracing::info!(
            "Matching {} hotels against {} restaurants",
            hotels.len(),
            restaurants.len()
        );

        let results = self.match_records(&hotels, restaurants);
        Ok(self.aggregator.aggregate(results))
    }

    /// Same as [`LinkEngine::run`], packaged with per-status counts
    pub fn report(
        &self,
        hotels: Vec<RawHotel>,
        restaurants: Vec<RawRestaurant>,
    ) -> Result<MatchReport, EngineError> {
        // duplicated ids collapse into one result during aggregation
        let total_hotels = hotels
            .iter()
            .map(|hotel| hotel.id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let results = self.run(hotels, restaurants)?;
        let report = MatchReport::new(total_hotels, results);

        tracing::info!(
            "Run complete: {} confident, {} ambiguous, {} unmatched",
            report.summary.confident,
            report.summary.ambiguous,
            report.summary.unmatched
        );

        Ok(report)
    }

    fn hotel_record(&self, raw: RawHotel) -> HotelRecord {
        let name = raw.name.unwrap_or_default();
        let location_key = self
            .normalizer
            .location_key(&raw.city, raw.postal_code.as_deref());

        HotelRecord {
            id: raw.id,
            normalized_name: self.normalizer.normalize(&name),
            name,
            location: Location {
                city: raw.city,
                postal_code: raw.postal_code,
                country: raw.country,
                coordinates: raw.coordinates,
            },
            location_key,
            metadata: raw.metadata,
        }
    }

    fn restaurant_record(&self, raw: RawRestaurant) -> RestaurantRecord {
        let name = raw.name.unwrap_or_default();
        let location_key = self
            .normalizer
            .location_key(&raw.city, raw.postal_code.as_deref());

        RestaurantRecord {
            id: raw.id,
            normalized_name: self.normalizer.normalize(&name),
            name,
            location: Location {
                city: raw.city,
                postal_code: raw.postal_code,
                country: None,
                coordinates: raw.coordinates,
            },
            location_key,
            address: raw.address,
            canton: raw.canton,
            phone: raw.phone,
            accepts_voucher: true,
        }
    }
}

impl Default for LinkEngine {
    fn default() -> Self {
        Self::with_matcher(EngineConfig::default(), Matcher::default())
    }
}

fn check<T: Validate>(
    record: &T,
    kind: RecordKind,
    position: usize,
    id: &str,
) -> Result<(), EngineError> {
    record.validate().map_err(|e| EngineError::InputValidation {
        kind,
        position,
        id: id.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationKey, MatchStatus};

    #[test]
    fn test_ingest_normalizes_names_and_keys() {
        let engine = LinkEngine::default();
        let mut raw = RawHotel::new("h1", "Hôtel Bären", "Zürich");
        raw.postal_code = Some("8001".to_string());

        let hotels = engine.ingest_hotels(vec![raw]).unwrap();
        assert_eq!(hotels[0].normalized_name, "baren");
        assert_eq!(hotels[0].location_key, LocationKey::City("zurich".to_string()));
    }

    #[test]
    fn test_missing_name_aborts_run() {
        let engine = LinkEngine::default();
        let mut broken = RawRestaurant::new("r2", "Jardin", "Bern");
        broken.name = None;

        let err = engine
            .run(
                vec![RawHotel::new("h1", "Hotel Alpenblick", "Bern")],
                vec![RawRestaurant::new("r1", "Restaurant Alpenblick", "Bern"), broken],
            )
            .unwrap_err();

        match err {
            EngineError::InputValidation { kind, position, id, .. } => {
                assert_eq!(kind, RecordKind::Restaurant);
                assert_eq!(position, 1);
                assert_eq!(id, "r2");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            thresholds: MatchThresholds {
                confident_threshold: 1.5,
                ambiguity_margin: 0.05,
            },
            ..EngineConfig::default()
        };
        assert!(matches!(LinkEngine::new(config), Err(EngineError::Configuration(_))));

        let zero_workers = EngineConfig {
            workers: Some(0),
            ..EngineConfig::default()
        };
        assert!(LinkEngine::new(zero_workers).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let hotels: Vec<RawHotel> = (0..40)
            .map(|i| RawHotel::new(format!("h{}", i), format!("Hotel Seeblick {}", i % 7), "Luzern"))
            .collect();
        let restaurants: Vec<RawRestaurant> = (0..20)
            .map(|i| RawRestaurant::new(format!("r{}", i), format!("Restaurant Seeblick {}", i % 5), "Luzern"))
            .collect();

        let sequential = LinkEngine::new(EngineConfig {
            include_unmatched: true,
            parallel: false,
            ..EngineConfig::default()
        })
        .unwrap();
        let parallel = LinkEngine::new(EngineConfig {
            include_unmatched: true,
            parallel: true,
            workers: Some(2),
            ..EngineConfig::default()
        })
        .unwrap();

        let a = sequential.run(hotels.clone(), restaurants.clone()).unwrap();
        let b = parallel.run(hotels, restaurants).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_report_counts() {
        let engine = LinkEngine::default();
        let report = engine
            .report(
                vec![
                    RawHotel::new("h1", "Hotel Alpenblick", "Bern"),
                    RawHotel::new("h2", "Hotel Nowhere", "Chur"),
                ],
                vec![RawRestaurant::new("r1", "Restaurant Alpenblick", "Bern")],
            )
            .unwrap();

        assert_eq!(report.summary.total_hotels, 2);
        assert_eq!(report.summary.confident, 1);
        assert_eq!(report.summary.unmatched, 1);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].status, MatchStatus::Confident);
    }

    #[test]
    fn test_report_counts_duplicate_hotel_once() {
        let engine = LinkEngine::default();
        let report = engine
            .report(
                vec![
                    RawHotel::new("h1", "Hotel Alpenblick", "Bern"),
                    RawHotel::new("h1", "Hotel Alpenblick", "Bern"),
                ],
                vec![RawRestaurant::new("r1", "Restaurant Alpenblick", "Bern")],
            )
            .unwrap();

        assert_eq!(report.summary.total_hotels, 1);
        assert_eq!(report.summary.confident, 1);
        assert_eq!(report.summary.unmatched, 0);
        assert_eq!(report.results.len(), 1);
    }
}
