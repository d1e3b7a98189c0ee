//! Overlay shown when the application starts.

use serde_json::Value;

use crate::{
    alerts::Alerts,
    config::DefaultOverlay,
    io::http::is_remote,
    loader::{FitBounds, add_geojson_layer},
    registry::OverlayRegistry,
    viewport::Viewport,
};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error fetching {location}! status: {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{location} is not JSON: {source}")]
    Decode {
        location: String,
        source: serde_json::Error,
    },

    #[error("could not read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("{0} cannot be loaded on this platform")]
    UnsupportedLocation(String),
}

/// Get the GeoJSON document from `location`, which is either an http(s) URL or a path to a
/// local file.
///
/// # Errors
///
/// When the document could not be obtained or is not JSON. Whether it is GeoJSON is not
/// checked here.
pub async fn fetch_overlay(client: reqwest::Client, location: String) -> Result<Value, FetchError> {
    let bytes = if is_remote(&location) {
        download(&client, &location).await?
    } else {
        read_local(&location).await?
    };

    serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode { location, source })
}

async fn download(client: &reqwest::Client, location: &str) -> Result<Vec<u8>, FetchError> {
    log::debug!("Downloading {location}.");
    let response = client.get(location).send().await?;

    let status = response.status();
    if !status.is_success() {
        log::error!("Failed to fetch default GeoJSON: {status}");
        return Err(FetchError::Status {
            location: location.to_owned(),
            status,
        });
    }

    Ok(response.bytes().await?.to_vec())
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_local(location: &str) -> Result<Vec<u8>, FetchError> {
    log::debug!("Reading {location}.");
    tokio::fs::read(location)
        .await
        .map_err(|source| FetchError::Io {
            location: location.to_owned(),
            source,
        })
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::unused_async)]
async fn read_local(location: &str) -> Result<Vec<u8>, FetchError> {
    Err(FetchError::UnsupportedLocation(location.to_owned()))
}

/// Put the fetched default overlay on the map and register it. Failures are only logged, the
/// map is perfectly usable without it.
pub(crate) fn apply(
    viewport: &mut Viewport,
    alerts: &mut Alerts,
    registry: &mut OverlayRegistry,
    overlay: &DefaultOverlay,
    result: Result<Value, FetchError>,
) {
    match result {
        Ok(document) => {
            let layer = add_geojson_layer(
                viewport,
                alerts,
                Some(&document),
                &overlay.name,
                FitBounds::Fit {
                    fallback: Some(overlay.fallback),
                },
            );

            if let Some(layer) = layer {
                log::info!("Default overlay \"{}\" loaded.", overlay.name);
                registry.insert(overlay.name.clone(), layer);
            }
        }
        Err(err) => {
            log::error!("Error loading default overlay: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::View;
    use hypermocker::{Mock, StatusCode};
    use walkers::lon_lat;

    const LAKE: &str = include_str!("../assets/bao_linh_lake.geojson");

    fn vietnam() -> Viewport {
        Viewport::new(View {
            center: lon_lat(107.0, 16.0),
            zoom: 6.,
        })
    }

    #[tokio::test]
    async fn downloading() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        mock.anticipate("/lake.geojson").respond(LAKE);

        let document = fetch_overlay(reqwest::Client::new(), mock.url("/lake.geojson"))
            .await
            .unwrap();
        assert_eq!("FeatureCollection", document["type"]);
    }

    #[tokio::test]
    async fn http_errors() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        mock.anticipate("/lake.geojson")
            .respond_with_status(StatusCode::NOT_FOUND);

        let result = fetch_overlay(reqwest::Client::new(), mock.url("/lake.geojson")).await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn downloading_something_else_than_json() {
        let _ = env_logger::try_init();

        let mock = Mock::bind().await;
        mock.anticipate("/lake.geojson").respond("<html>lake</html>");

        let result = fetch_overlay(reqwest::Client::new(), mock.url("/lake.geojson")).await;
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn reading_from_disk() {
        let location = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/bao_linh_lake.geojson");
        let document = fetch_overlay(reqwest::Client::new(), location.to_owned())
            .await
            .unwrap();
        assert_eq!("FeatureCollection", document["type"]);

        let result = fetch_overlay(reqwest::Client::new(), "/no/such/lake.geojson".to_owned()).await;
        assert!(matches!(result, Err(FetchError::Io { .. })));
    }

    #[test]
    fn loaded_overlay_is_registered() {
        let mut viewport = vietnam();
        let mut alerts = Alerts::default();
        let mut registry = OverlayRegistry::default();
        let overlay = DefaultOverlay::default();

        apply(
            &mut viewport,
            &mut alerts,
            &mut registry,
            &overlay,
            Ok(serde_json::from_str(LAKE).unwrap()),
        );

        let layer = registry.get("💧 Bao Linh Lake").unwrap();
        assert!(viewport.has_layer(layer.id()));
        assert_eq!(17., viewport.view().zoom);
        assert!(alerts.is_empty());
    }

    #[test]
    fn empty_overlay_falls_back_to_the_lake() {
        let mut viewport = vietnam();
        let mut alerts = Alerts::default();
        let mut registry = OverlayRegistry::default();
        let overlay = DefaultOverlay::default();

        apply(
            &mut viewport,
            &mut alerts,
            &mut registry,
            &overlay,
            Ok(serde_json::json!({"type": "FeatureCollection", "features": []})),
        );

        assert_eq!(1, registry.len());
        assert_eq!(overlay.fallback, viewport.view());
    }

    #[test]
    fn failures_are_quiet() {
        let mut viewport = vietnam();
        let mut alerts = Alerts::default();
        let mut registry = OverlayRegistry::default();

        apply(
            &mut viewport,
            &mut alerts,
            &mut registry,
            &DefaultOverlay::default(),
            Err(FetchError::UnsupportedLocation("lake.geojson".to_owned())),
        );

        assert!(registry.is_empty());
        assert!(viewport.layers().is_empty());
        assert!(alerts.is_empty());
        assert_eq!(0, viewport.revision());
    }

    #[test]
    fn invalid_default_overlay_alerts_but_is_not_registered() {
        let mut viewport = vietnam();
        let mut alerts = Alerts::default();
        let mut registry = OverlayRegistry::default();

        apply(
            &mut viewport,
            &mut alerts,
            &mut registry,
            &DefaultOverlay::default(),
            Ok(serde_json::json!({"name": "not a lake"})),
        );

        assert!(registry.is_empty());
        assert_eq!(1, alerts.len());
    }

    #[test]
    fn typed_but_broken_default_overlay_is_quiet() {
        let mut viewport = vietnam();
        let mut alerts = Alerts::default();
        let mut registry = OverlayRegistry::default();

        apply(
            &mut viewport,
            &mut alerts,
            &mut registry,
            &DefaultOverlay::default(),
            Ok(serde_json::json!({"type": "Feature", "geometry": {"type": "Point"}})),
        );

        assert!(registry.is_empty());
        assert!(viewport.layers().is_empty());
        assert!(alerts.is_empty());
        assert_eq!(0, viewport.revision());
    }
}
