use walkers::lon_lat;

use crate::{search::Corner, viewport::View};

/// Environment variable overriding [`DefaultOverlay::location`].
const DEFAULT_OVERLAY_VAR: &str = "LAKEVIEW_DEFAULT_OVERLAY";

/// Environment variable overriding [`SearchOptions::geocoder_url`].
const GEOCODER_URL_VAR: &str = "LAKEVIEW_GEOCODER_URL";

/// Overlay loaded when the application starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultOverlay {
    /// http(s) URL or, on native targets, path to a local file.
    pub location: String,

    /// Name under which the overlay is listed in the layer control.
    pub name: String,

    /// Where to look at if the overlay turns out to have no usable bounds.
    pub fallback: View,
}

impl Default for DefaultOverlay {
    fn default() -> Self {
        Self {
            location: "lakeview/assets/bao_linh_lake.geojson".to_owned(),
            name: "💧 Bao Linh Lake".to_owned(),
            fallback: View {
                center: lon_lat(105.95, 21.06),
                zoom: 13.,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub placeholder: String,
    pub corner: Corner,

    /// Zoom applied when a search result is selected.
    pub zoom: f64,

    /// Base URL of a Nominatim compatible service.
    pub geocoder_url: String,

    /// Maximum number of results asked for.
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            placeholder: "🔍 Search address or coordinates...".to_owned(),
            corner: Corner::TopRight,
            zoom: 16.,
            geocoder_url: "https://nominatim.openstreetmap.org".to_owned(),
            limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// What the map shows before anything gets loaded.
    pub initial_view: View,
    pub default_overlay: DefaultOverlay,
    pub search: SearchOptions,

    /// User agent of the requests made by the application itself. Ignored on wasm targets.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_view: View {
                center: lon_lat(107.0, 16.0),
                zoom: 6.,
            },
            default_overlay: DefaultOverlay::default(),
            search: SearchOptions::default(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl Config {
    /// Defaults overridden by the environment variables, if set.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        if let Some(location) = non_empty(DEFAULT_OVERLAY_VAR) {
            log::info!("Default overlay will be loaded from {location}.");
            self.default_overlay.location = location;
        }

        if let Some(url) = non_empty(GEOCODER_URL_VAR) {
            log::info!("Using geocoder at {url}.");
            self.search.geocoder_url = url.trim_end_matches('/').to_owned();
        }

        self
    }
}
