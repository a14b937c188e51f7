use std::num::NonZeroUsize;

use lru::LruCache;

use crate::models::{HotelRecord, RestaurantRecord};

/// Default number of memoized name pairs per run
pub const DEFAULT_CACHE_SIZE: usize = 4096;

/// Similarity of one hotel/restaurant pairing plus its tie-break data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Normalized to [0, 1]; 1 means identical normalized names
    pub score: f64,
    pub edit_distance: usize,
}

impl Similarity {
    const UNMATCHABLE: Similarity = Similarity {
        score: 0.0,
        edit_distance: 0,
    };
}

/// Memoized edit distances, scoped to a single matching run
///
/// Created by the caller and passed into the matcher so nothing leaks
/// between runs. Keys are unordered name pairs.
pub struct ScoreCache {
    entries: LruCache<(String, String), usize>,
    hits: u64,
    misses: u64,
}

impl ScoreCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    fn edit_distance(&mut self, a: &str, b: &str) -> usize {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };

        if let Some(&distance) = self.entries.get(&key) {
            self.hits += 1;
            return distance;
        }

        self.misses += 1;
        let distance = strsim::levenshtein(&key.0, &key.1);
        self.entries.put(key, distance);
        distance
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl std::fmt::Debug for ScoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreCache")
            .field("len", &self.entries.len())
            .field("cap", &self.entries.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

/// Similarity between two already-normalized names
///
/// `1 - levenshtein(a, b) / max(len(a), len(b))`, measured in characters.
/// Two empty names score 0 so a blank name never becomes a full match.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    similarity_from_distance(a, b, strsim::levenshtein(a, b)).score
}

/// Score a hotel against a restaurant using their normalized names
pub fn score(hotel: &HotelRecord, restaurant: &RestaurantRecord) -> f64 {
    name_similarity(&hotel.normalized_name, &restaurant.normalized_name)
}

/// Score a hotel against a restaurant, memoizing the edit distance
pub fn score_cached(
    hotel: &HotelRecord,
    restaurant: &RestaurantRecord,
    cache: &mut ScoreCache,
) -> Similarity {
    let a = hotel.normalized_name.as_str();
    let b = restaurant.normalized_name.as_str();

    if a.is_empty() && b.is_empty() {
        return Similarity::UNMATCHABLE;
    }

    let distance = cache.edit_distance(a, b);
    similarity_from_distance(a, b, distance)
}

fn similarity_from_distance(a: &str, b: &str, distance: usize) -> Similarity {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return Similarity::UNMATCHABLE;
    }

    let score = 1.0 - (distance as f64 / longest as f64);

    Similarity {
        score: score.clamp(0.0, 1.0),
        edit_distance: distance,
    }
}
