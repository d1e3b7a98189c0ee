//! GeoJSON documents turned into something that can be drawn.

use egui::{Color32, Stroke};
use geo::CoordsIter as _;
use geo_types::{Geometry, Rect, coord};
use geojson::{GeoJson, JsonObject};
use serde_json::Value;

/// Visual style of an overlay. Every overlay is drawn the same way, no matter where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Color of borders and lines.
    pub color: Color32,

    /// Width of borders and lines, in pixels.
    pub weight: f32,

    /// Color of polygons' interior.
    pub fill_color: Color32,

    /// Opacity of polygons' interior, from 0 to 1.
    pub fill_opacity: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0x00, 0x00, 0xFF),
            weight: 2.,
            fill_color: Color32::from_rgb(0xAD, 0xD8, 0xE6),
            fill_opacity: 0.7,
        }
    }
}

impl OverlayStyle {
    pub fn stroke(&self) -> Stroke {
        Stroke::new(self.weight, self.color)
    }

    /// Fill color with the opacity applied.
    pub fn fill(&self) -> Color32 {
        self.fill_color.gamma_multiply(self.fill_opacity)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("document has no \"type\"")]
    MissingType,

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoundsError {
    #[error("geometry has non-finite coordinates")]
    NonFinite,
}

/// Single drawable feature of an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFeature {
    pub geometry: Geometry<f64>,

    /// Text shown when the feature gets clicked.
    pub popup: String,
}

/// Whether the document says what it is. Nothing else is checked before parsing.
pub(crate) fn has_type(document: &Value) -> bool {
    document
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| !kind.is_empty())
}

/// Parse a GeoJSON document into features. Features without geometry are skipped, as there is
/// nothing to draw for them.
pub(crate) fn parse_features(document: &Value) -> Result<Vec<OverlayFeature>, OverlayError> {
    if !has_type(document) {
        return Err(OverlayError::MissingType);
    }

    let features = match GeoJson::from_json_value(document.to_owned())? {
        GeoJson::Geometry(geometry) => vec![OverlayFeature {
            geometry: Geometry::try_from(geometry)?,
            popup: popup_content(None),
        }],
        GeoJson::Feature(feature) => feature_to_overlay(feature)?.into_iter().collect(),
        GeoJson::FeatureCollection(collection) => {
            let mut features = Vec::with_capacity(collection.features.len());
            for feature in collection.features {
                features.extend(feature_to_overlay(feature)?);
            }
            features
        }
    };

    Ok(features)
}

fn feature_to_overlay(feature: geojson::Feature) -> Result<Option<OverlayFeature>, OverlayError> {
    let Some(geometry) = feature.geometry else {
        log::debug!("Skipping feature without geometry.");
        return Ok(None);
    };

    Ok(Some(OverlayFeature {
        geometry: Geometry::try_from(geometry)?,
        popup: popup_content(feature.properties.as_ref()),
    }))
}

/// One `key: value` line per property, in the order they appear in the document. Nulls are
/// left out.
pub(crate) fn popup_content(properties: Option<&JsonObject>) -> String {
    let lines: Vec<String> = properties
        .into_iter()
        .flatten()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}: {text}"),
            other => format!("{key}: {other}"),
        })
        .collect();

    if lines.is_empty() {
        "No properties".to_owned()
    } else {
        lines.join("\n")
    }
}

/// Smallest rectangle containing all features. `None` if there is nothing to contain.
pub(crate) fn bounds(features: &[OverlayFeature]) -> Result<Option<Rect<f64>>, BoundsError> {
    let mut coords = features
        .iter()
        .flat_map(|feature| feature.geometry.coords_iter())
        .peekable();

    if coords.peek().is_none() {
        return Ok(None);
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);

    for coord in coords {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(BoundsError::NonFinite);
        }
        min_x = min_x.min(coord.x);
        min_y = min_y.min(coord.y);
        max_x = max_x.max(coord.x);
        max_y = max_y.max(coord.y);
    }

    Ok(Some(Rect::new(
        coord! { x: min_x, y: min_y },
        coord! { x: max_x, y: max_y },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, point};
    use serde_json::json;

    fn lake() -> Value {
        serde_json::from_str(include_str!("../assets/bao_linh_lake.geojson")).unwrap()
    }

    #[test]
    fn default_style() {
        let style = OverlayStyle::default();
        assert_eq!(Color32::from_rgb(0, 0, 255), style.color);
        assert_eq!(Stroke::new(2., Color32::BLUE), style.stroke());
        assert_eq!(Color32::from_rgb(173, 216, 230), style.fill_color);
        assert_eq!(style.fill_color.gamma_multiply(0.7), style.fill());
    }

    #[test]
    fn documents_without_type_are_rejected() {
        for document in [
            json!(null),
            json!({}),
            json!({"type": null}),
            json!({"type": ""}),
            json!({"features": []}),
            json!([1, 2, 3]),
            json!("FeatureCollection"),
        ] {
            assert!(!has_type(&document), "{document} should not have a type");
            assert!(matches!(
                parse_features(&document),
                Err(OverlayError::MissingType)
            ));
        }
    }

    #[test]
    fn documents_with_unknown_type_are_rejected() {
        let document = json!({"type": "Lake", "coordinates": [105.95, 21.06]});
        assert!(has_type(&document));
        assert!(matches!(
            parse_features(&document),
            Err(OverlayError::GeoJson(_))
        ));
    }

    #[test]
    fn parsing_feature_collection() {
        let features = parse_features(&lake()).unwrap();
        assert_eq!(1, features.len());
        assert!(matches!(features[0].geometry, Geometry::Polygon(_)));
        assert!(features[0].popup.starts_with("name: Bao Linh Lake\n"));
    }

    #[test]
    fn parsing_bare_geometry() {
        let features =
            parse_features(&json!({"type": "Point", "coordinates": [105.95, 21.06]})).unwrap();
        assert_eq!(
            vec![OverlayFeature {
                geometry: Geometry::Point(point!(x: 105.95, y: 21.06)),
                popup: "No properties".to_owned(),
            }],
            features
        );
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let features = parse_features(&json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": {"name": "nowhere"}},
                {
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": [[105.9, 21.0], [106.0, 21.1]]},
                    "properties": {"name": "road"}
                }
            ]
        }))
        .unwrap();

        assert_eq!(1, features.len());
        assert_eq!("name: road", features[0].popup);
    }

    #[test]
    fn popup_lists_non_null_properties_in_order() {
        let properties = json!({
            "name": "Bao Linh Lake",
            "area_ha": 12.5,
            "note": null,
            "fishing": false,
            "depths": [1, 2.5],
        });

        assert_eq!(
            "name: Bao Linh Lake\narea_ha: 12.5\nfishing: false\ndepths: [1,2.5]",
            popup_content(properties.as_object())
        );
    }

    #[test]
    fn popup_without_properties() {
        assert_eq!("No properties", popup_content(None));
        assert_eq!(
            "No properties",
            popup_content(json!({}).as_object())
        );
        assert_eq!(
            "No properties",
            popup_content(json!({"only": null}).as_object())
        );
    }

    #[test]
    fn bounds_of_features() {
        let features = vec![
            OverlayFeature {
                geometry: Geometry::Point(point!(x: 105.95, y: 21.06)),
                popup: String::new(),
            },
            OverlayFeature {
                geometry: Geometry::LineString(LineString::from(vec![
                    (105.90, 21.10),
                    (106.00, 21.00),
                ])),
                popup: String::new(),
            },
        ];

        let bounds = bounds(&features).unwrap().unwrap();
        assert_eq!(coord! { x: 105.90, y: 21.00 }, bounds.min());
        assert_eq!(coord! { x: 106.00, y: 21.10 }, bounds.max());
    }

    #[test]
    fn bounds_of_nothing() {
        assert_eq!(Ok(None), bounds(&[]));

        let empty = vec![OverlayFeature {
            geometry: Geometry::LineString(LineString::new(vec![])),
            popup: String::new(),
        }];
        assert_eq!(Ok(None), bounds(&empty));
    }

    #[test]
    fn bounds_of_broken_geometry() {
        let features = vec![OverlayFeature {
            geometry: Geometry::Point(Point::new(f64::NAN, 21.06)),
            popup: String::new(),
        }];
        assert_eq!(Err(BoundsError::NonFinite), bounds(&features));
    }
}
