use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{HotelMetadata, RawHotel, RawRestaurant};

/// Errors that can occur while loading a dataset file
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unsupported dataset format: {0} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}

/// Hotel listing row as written by the hotel-deal scraper
#[derive(Debug, Deserialize)]
struct HotelRow {
    hotel_name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    num_stars: Option<f64>,
    #[serde(default)]
    webpage: Option<String>,
}

/// Restaurant row as written by the voucher-directory scraper
#[derive(Debug, Deserialize)]
struct RestaurantRow {
    restaurant_name: Option<String>,
    #[serde(rename = "Address", default)]
    address: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    canton: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl HotelRow {
    fn into_raw(self, row: usize) -> RawHotel {
        let (city, country) = split_location(self.location.as_deref().unwrap_or_default());
        let id = self
            .webpage
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("hotel-{}", row));

        RawHotel {
            id,
            name: self.hotel_name,
            city,
            postal_code: None,
            country,
            coordinates: None,
            metadata: HotelMetadata {
                rating: self.rating,
                stars: self.num_stars.map(|s| s.round().clamp(0.0, 7.0) as u8),
                webpage: self.webpage,
                ..HotelMetadata::default()
            },
        }
    }
}

impl RestaurantRow {
    fn into_raw(self, row: usize) -> RawRestaurant {
        RawRestaurant {
            id: format!("restaurant-{}", row),
            name: self.restaurant_name,
            city: self.city.unwrap_or_default(),
            postal_code: self.zip_code,
            coordinates: None,
            address: self.address,
            canton: self.canton,
            phone: self.phone,
        }
    }
}

/// Load hotels from a `.json` array of records or a scraper `.csv`
pub fn load_hotels(path: &Path) -> Result<Vec<RawHotel>, DatasetError> {
    let hotels = match format_of(path)? {
        Format::Json => read_json(path)?,
        Format::Csv => read_csv::<HotelRow>(path)?
            .into_iter()
            .enumerate()
            .map(|(row, hotel)| hotel.into_raw(row))
            .collect(),
    };

    tracing::info!("Loaded {} hotels from {}", hotels.len(), path.display());
    Ok(hotels)
}

/// Load restaurants from a `.json` array of records or a scraper `.csv`
pub fn load_restaurants(path: &Path) -> Result<Vec<RawRestaurant>, DatasetError> {
    let restaurants = match format_of(path)? {
        Format::Json => read_json(path)?,
        Format::Csv => read_csv::<RestaurantRow>(path)?
            .into_iter()
            .enumerate()
            .map(|(row, restaurant)| restaurant.into_raw(row))
            .collect(),
    };

    tracing::info!("Loaded {} restaurants from {}", restaurants.len(), path.display());
    Ok(restaurants)
}

/// Keep hotels in the given country; hotels with no known country are kept.
/// An empty filter disables filtering.
pub fn filter_country(hotels: Vec<RawHotel>, country: Option<&str>) -> Vec<RawHotel> {
    let Some(country) = country.filter(|c| !c.trim().is_empty()) else {
        return hotels;
    };

    let before = hotels.len();
    let kept: Vec<RawHotel> = hotels
        .into_iter()
        .filter(|hotel| match hotel.country.as_deref() {
            Some(c) => c.trim().eq_ignore_ascii_case(country.trim()),
            None => true,
        })
        .collect();

    if kept.len() < before {
        tracing::info!("Dropped {} hotels outside {}", before - kept.len(), country);
    }

    kept
}

/// Split a listing location such as "Interlaken, CH" into city and country
pub fn split_location(location: &str) -> (String, Option<String>) {
    match location.rsplit_once(',') {
        Some((city, country)) if !country.trim().is_empty() => {
            (city.trim().to_string(), Some(country.trim().to_string()))
        }
        Some((city, _)) => (city.trim().to_string(), None),
        None => (location.trim().to_string(), None),
    }
}

enum Format {
    Json,
    Csv,
}

fn format_of(path: &Path) -> Result<Format, DatasetError> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => Ok(Format::Json),
        Some("csv") => Ok(Format::Csv),
        _ => Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let reader = BufReader::new(open(path)?);
    serde_json::from_reader(reader).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_split_location() {
        assert_eq!(split_location("Interlaken, CH"), ("Interlaken".to_string(), Some("CH".to_string())));
        assert_eq!(split_location("Bern"), ("Bern".to_string(), None));
        assert_eq!(split_location("Bern,"), ("Bern".to_string(), None));
    }

    #[test]
    fn test_load_hotels_csv() {
        let file = write_file(
            ".csv",
            ",hotel_name,location,rating,num_stars,webpage\n\
             0,Hotel Alpenblick,\"Bern, CH\",4.5,4,https://deals.example/alpenblick\n\
             1,Hotel Adler,\"Bregenz, AT\",,3,\n",
        );

        let hotels = load_hotels(file.path()).unwrap();
        assert_eq!(hotels.len(), 2);
        assert_eq!(hotels[0].id, "https://deals.example/alpenblick");
        assert_eq!(hotels[0].city, "Bern");
        assert_eq!(hotels[0].country.as_deref(), Some("CH"));
        assert_eq!(hotels[0].metadata.stars, Some(4));
        assert_eq!(hotels[1].id, "hotel-1");
        assert_eq!(hotels[1].metadata.rating, None);
    }

    #[test]
    fn test_load_restaurants_csv() {
        let file = write_file(
            ".csv",
            "restaurant_name,Address,zip_code,city,canton,phone\n\
             Restaurant Alpenblick,Hauptgasse 1,3011,Bern,BE,031 000 00 00\n",
        );

        let restaurants = load_restaurants(file.path()).unwrap();
        assert_eq!(restaurants.len(), 1);
        assert_eq!(restaurants[0].name.as_deref(), Some("Restaurant Alpenblick"));
        assert_eq!(restaurants[0].postal_code.as_deref(), Some("3011"));
        assert_eq!(restaurants[0].canton.as_deref(), Some("BE"));
    }

    #[test]
    fn test_load_restaurants_json() {
        let file = write_file(
            ".json",
            r#"[{"id": "r1", "name": "Restaurant Jardin", "city": "Bern", "postalCode": "3011"}]"#,
        );

        let restaurants = load_restaurants(file.path()).unwrap();
        assert_eq!(restaurants[0].id, "r1");
        assert_eq!(restaurants[0].postal_code.as_deref(), Some("3011"));
    }

    #[test]
    fn test_unsupported_format() {
        let file = write_file(".xlsx", "");
        assert!(matches!(load_hotels(file.path()), Err(DatasetError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_filter_country() {
        let mut swiss = RawHotel::new("h1", "Hotel Alpenblick", "Bern");
        swiss.country = Some("CH".to_string());
        let mut austrian = RawHotel::new("h2", "Hotel Adler", "Bregenz");
        austrian.country = Some("AT".to_string());
        let unknown = RawHotel::new("h3", "Hotel Krone", "Thun");

        let kept = filter_country(vec![swiss, austrian, unknown], Some("ch"));
        let ids: Vec<&str> = kept.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "h3"]);
    }
}
