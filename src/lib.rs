//! Voucher Link - entity resolution between hotel deals and voucher restaurants
//!
//! This library links two independently sourced catalogs, discounted hotel
//! stays and restaurants accepting a meal voucher, by approximate name and
//! location matching. Each hotel resolves to exactly one result: a confident
//! match, an ambiguous match flagged for review, or none.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{EngineConfig, EngineError, LinkEngine, Matcher, Normalizer};
pub use models::{HotelRecord, MatchReport, MatchResult, MatchStatus, RawHotel, RawRestaurant, RestaurantRecord};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let engine = LinkEngine::default();
        assert_eq!(engine.normalizer().normalize("Hotel Alpenblick"), "alpenblick");
    }
}
