//! Finding places by their name or coordinates.

use serde::Deserialize;
use walkers::{Position, lon_lat};

/// Place found by the [`Geocoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub name: String,
    pub center: Position,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("geocoder responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("geocoder response is malformed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("geocoder returned invalid coordinates: {lat}, {lon}")]
    Coordinates { lat: String, lon: String },
}

/// Single entry of Nominatim's `/search` response. Coordinates are strings there.
#[derive(Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
}

impl TryFrom<Place> for GeocodeResult {
    type Error = GeocodeError;

    fn try_from(place: Place) -> Result<Self, Self::Error> {
        match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Ok(GeocodeResult {
                name: place.display_name,
                center: lon_lat(lon, lat),
            }),
            _ => Err(GeocodeError::Coordinates {
                lat: place.lat,
                lon: place.lon,
            }),
        }
    }
}

/// Interpret `query` as `lat, lon` or `lat lon`, in decimal degrees.
pub fn parse_coordinates(query: &str) -> Option<GeocodeResult> {
    let query = query.trim();
    let mut parts = if query.contains(',') {
        query.split(',').map(str::trim).collect::<Vec<_>>()
    } else {
        query.split_whitespace().collect()
    };
    parts.retain(|part| !part.is_empty());

    let [lat, lon] = parts.as_slice() else {
        return None;
    };

    let lat: f64 = lat.parse().ok()?;
    let lon: f64 = lon.parse().ok()?;

    if !(-90. ..=90.).contains(&lat) || !(-180. ..=180.).contains(&lon) {
        return None;
    }

    Some(GeocodeResult {
        name: format!("{lat}, {lon}"),
        center: lon_lat(lon, lat),
    })
}

/// Client of a Nominatim compatible geocoding service.
/// <https://nominatim.org/release-docs/latest/api/Search/>
#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    url: String,
    limit: usize,
}

impl Geocoder {
    pub fn new(client: reqwest::Client, url: impl Into<String>, limit: usize) -> Self {
        Self {
            client,
            url: url.into(),
            limit,
        }
    }

    /// Find places matching `query`. Coordinates are recognized without asking the service.
    ///
    /// # Errors
    ///
    /// When the service could not be reached or its response makes no sense.
    pub async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(result) = parse_coordinates(query) {
            log::debug!("'{query}' looks like coordinates.");
            return Ok(vec![result]);
        }

        log::debug!("Geocoding '{query}'.");
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.url))
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let places: Vec<Place> = serde_json::from_slice(&response.bytes().await?)?;
        places.into_iter().map(GeocodeResult::try_from).collect()
    }
}
