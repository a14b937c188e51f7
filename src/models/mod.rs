// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Coordinates, HotelMetadata, HotelRecord, Location, LocationKey, MatchCandidate, MatchResult,
    MatchStatus, MatchThresholds, RestaurantRecord,
};
pub use requests::{RawHotel, RawRestaurant};
pub use responses::{MatchReport, ReportSummary};
