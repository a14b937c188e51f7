use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where a hotel or restaurant is located
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Coarse grouping key used to bound similarity comparisons
///
/// Ordering is only used to keep bucket iteration deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum LocationKey {
    City(String),
    PostalCode(String),
    Unknown,
}

impl LocationKey {
    pub fn is_unknown(&self) -> bool {
        matches!(self, LocationKey::Unknown)
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKey::City(city) => write!(f, "city:{}", city),
            LocationKey::PostalCode(code) => write!(f, "plz:{}", code),
            LocationKey::Unknown => write!(f, "unknown"),
        }
    }
}

/// Listing details carried through from the hotel source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelMetadata {
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "dealDescription", default)]
    pub deal_description: Option<String>,
    #[serde(rename = "priceTerms", default)]
    pub price_terms: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stars: Option<u8>,
    #[serde(default)]
    pub webpage: Option<String>,
}

/// A hotel offering a discounted stay. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "normalizedName")]
    pub normalized_name: String,
    pub location: Location,
    #[serde(rename = "locationKey")]
    pub location_key: LocationKey,
    #[serde(default)]
    pub metadata: HotelMetadata,
}

/// A restaurant listed in the voucher directory. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "normalizedName")]
    pub normalized_name: String,
    pub location: Location,
    #[serde(rename = "locationKey")]
    pub location_key: LocationKey,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub canton: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Always true: the source is a directory of accepting restaurants
    #[serde(rename = "acceptsVoucher")]
    pub accepts_voucher: bool,
}

/// One scored hotel/restaurant pairing, alive for a single matching pass
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    pub hotel: &'a HotelRecord,
    pub restaurant: &'a RestaurantRecord,
    pub score: f64,
    pub edit_distance: usize,
    pub bucket_matched: bool,
}

/// Terminal state of the per-hotel decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Confident,
    Ambiguous,
    None,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Confident => "confident",
            MatchStatus::Ambiguous => "ambiguous",
            MatchStatus::None => "none",
        };
        f.write_str(s)
    }
}

/// Outcome for one hotel. The hotel id is the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub hotel: HotelRecord,
    pub restaurant: Option<RestaurantRecord>,
    pub confidence: f64,
    pub status: MatchStatus,
    #[serde(rename = "editDistance")]
    pub edit_distance: Option<usize>,
    #[serde(rename = "bucketMatched")]
    pub bucket_matched: bool,
    #[serde(rename = "runnerUpScore")]
    pub runner_up_score: Option<f64>,
    #[serde(rename = "candidatesConsidered")]
    pub candidates_considered: usize,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
}

impl MatchResult {
    /// Result for a hotel that has no acceptable restaurant
    pub fn unmatched(hotel: &HotelRecord, best_score: f64, candidates_considered: usize) -> Self {
        Self {
            hotel: hotel.clone(),
            restaurant: None,
            confidence: best_score,
            status: MatchStatus::None,
            edit_distance: None,
            bucket_matched: false,
            runner_up_score: None,
            candidates_considered,
            distance_km: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status != MatchStatus::None
    }
}

/// Acceptance thresholds used by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    /// Minimum similarity to accept a match
    pub confident_threshold: f64,
    /// Minimum gap to the runner-up to avoid the ambiguous state
    pub ambiguity_margin: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            confident_threshold: 0.85,
            ambiguity_margin: 0.05,
        }
    }
}
