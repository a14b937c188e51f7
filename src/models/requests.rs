use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Coordinates, HotelMetadata};

/// Hotel as supplied by the scraping collaborator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RawHotel {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(required)]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(alias = "postal_code", rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub metadata: HotelMetadata,
}

/// Restaurant as supplied by the voucher directory collaborator
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RawRestaurant {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(required)]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(alias = "postal_code", rename = "postalCode", default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub canton: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl RawHotel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            city: city.into(),
            postal_code: None,
            country: None,
            coordinates: None,
            metadata: HotelMetadata::default(),
        }
    }
}

impl RawRestaurant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            city: city.into(),
            postal_code: None,
            coordinates: None,
            address: None,
            canton: None,
            phone: None,
        }
    }
}
