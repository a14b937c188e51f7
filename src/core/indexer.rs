use std::collections::BTreeMap;

use crate::models::{LocationKey, RestaurantRecord};

/// Restaurants partitioned by coarse location key
///
/// Every restaurant lands in exactly one bucket. Bucket order is insertion
/// order and is only used for deterministic tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    buckets: BTreeMap<LocationKey, Vec<RestaurantRecord>>,
    len: usize,
}

impl CandidateIndex {
    /// Build the index in one pass over the restaurants
    pub fn build(restaurants: Vec<RestaurantRecord>) -> Self {
        let len = restaurants.len();
        let mut buckets: BTreeMap<LocationKey, Vec<RestaurantRecord>> = BTreeMap::new();

        for restaurant in restaurants {
            buckets
                .entry(restaurant.location_key.clone())
                .or_default()
                .push(restaurant);
        }

        tracing::debug!(
            "Indexed {} restaurants into {} location buckets",
            len,
            buckets.len()
        );

        Self { buckets, len }
    }

    /// Restaurants sharing exactly this key
    pub fn bucket(&self, key: &LocationKey) -> &[RestaurantRecord] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Restaurants without a usable location, compared against every hotel
    pub fn unknown(&self) -> &[RestaurantRecord] {
        self.bucket(&LocationKey::Unknown)
    }

    /// Candidates for a hotel: its own bucket plus the unknown fallback,
    /// each tagged with whether it came from the hotel's own bucket
    pub fn candidates_for<'a>(
        &'a self,
        key: &LocationKey,
    ) -> impl Iterator<Item = (&'a RestaurantRecord, bool)> + 'a {
        let own: &'a [RestaurantRecord] = if key.is_unknown() { &[] } else { self.bucket(key) };

        own.iter()
            .map(|r| (r, true))
            .chain(self.unknown().iter().map(|r| (r, false)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &LocationKey> {
        self.buckets.keys()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
