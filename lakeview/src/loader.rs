//! Turning GeoJSON documents into layers on the map.

use serde_json::Value;

use crate::{
    alerts::Alerts,
    layer::RenderedLayer,
    overlay::{OverlayFeature, OverlayStyle, has_type, parse_features},
    viewport::{View, Viewport},
};

/// Shown when a document is missing or does not say what it is.
pub const INVALID_DOCUMENT_ALERT: &str = "❌ Invalid GeoJSON data.";

/// What to do with the view once the layer is on the map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FitBounds {
    /// Leave it where it is.
    #[default]
    Skip,

    /// Show the whole layer. If that is not possible, show `fallback` instead, or leave the view
    /// as it is if there's no fallback.
    Fit { fallback: Option<View> },
}

/// Add GeoJSON `data` to the map as a new layer named `name`.
///
/// Returns `None` if `data` is missing or does not say what it is, in which case the user gets
/// alerted and the map stays untouched. A typed document which still fails to parse is only
/// logged. Otherwise the layer is on the map once this returns, even if the view could not be
/// fitted to it.
pub fn add_geojson_layer(
    viewport: &mut Viewport,
    alerts: &mut Alerts,
    data: Option<&Value>,
    name: &str,
    fit: FitBounds,
) -> Option<RenderedLayer> {
    let Some(document) = data.filter(|data| has_type(data)) else {
        log::error!("Invalid GeoJSON data provided: missing type.");
        alerts.push(INVALID_DOCUMENT_ALERT);
        return None;
    };

    match parse_features(document) {
        Ok(features) => Some(add_features_layer(viewport, name, features, fit)),
        Err(err) => {
            log::error!("Could not load layer \"{name}\": {err}");
            None
        }
    }
}

/// Put already parsed `features` on the map as a new layer.
pub(crate) fn add_features_layer(
    viewport: &mut Viewport,
    name: &str,
    features: Vec<OverlayFeature>,
    fit: FitBounds,
) -> RenderedLayer {
    let layer = RenderedLayer::new(
        viewport.allocate_layer_id(),
        name,
        OverlayStyle::default(),
        features,
    );
    log::debug!(
        "Adding layer \"{name}\" with {} features.",
        layer.features().len()
    );
    viewport.add_layer(layer.clone());

    if let FitBounds::Fit { fallback } = fit {
        fit_to_layer(viewport, &layer, fallback);
    }

    layer
}

fn fit_to_layer(viewport: &mut Viewport, layer: &RenderedLayer, fallback: Option<View>) {
    match layer.bounds() {
        Ok(Some(bounds)) => {
            viewport.fit_bounds(bounds);
            return;
        }
        Ok(None) => {
            log::warn!(
                "Layer \"{}\" has no valid bounds or is empty.",
                layer.name()
            );
        }
        Err(err) => {
            log::error!("Error fitting bounds for layer \"{}\": {err}", layer.name());
        }
    }

    if let Some(fallback) = fallback {
        viewport.set_view(fallback.center, fallback.zoom);
    }
}
