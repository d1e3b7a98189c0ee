use std::sync::Arc;

use egui::Pos2;
use geo::{Intersects as _, MapCoords as _};
use geo_types::{Geometry, LineString, Point, Polygon, Rect, coord};
use walkers::{Position, lon_lat};

use crate::overlay::{BoundsError, OverlayFeature, OverlayStyle, bounds};

/// Clicks closer than this to a point feature hit it.
const POINT_RADIUS: f32 = 8.;

/// How far beyond the drawn stroke a click still hits a line.
const LINE_TOLERANCE: f32 = 3.;

/// Identifies a layer within a single viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub(crate) u64);

#[derive(Debug)]
struct LayerState {
    id: LayerId,
    name: String,
    style: OverlayStyle,
    features: Vec<OverlayFeature>,
}

/// GeoJSON overlay which can be put on the map. Cloning is cheap and clones refer to the same
/// layer.
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    inner: Arc<LayerState>,
}

impl RenderedLayer {
    pub(crate) fn new(
        id: LayerId,
        name: impl Into<String>,
        style: OverlayStyle,
        features: Vec<OverlayFeature>,
    ) -> Self {
        Self {
            inner: Arc::new(LayerState {
                id,
                name: name.into(),
                style,
                features,
            }),
        }
    }

    pub fn id(&self) -> LayerId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.inner.style
    }

    pub fn features(&self) -> &[OverlayFeature] {
        &self.inner.features
    }

    pub fn bounds(&self) -> Result<Option<Rect<f64>>, BoundsError> {
        bounds(&self.inner.features)
    }

    /// Find the feature drawn at `click`, top-most first. `project` tells where on the screen a
    /// given position is drawn.
    pub fn pick(
        &self,
        click: Pos2,
        project: &impl Fn(Position) -> Pos2,
    ) -> Option<&OverlayFeature> {
        let tolerance = self.inner.style.weight + LINE_TOLERANCE;
        self.inner
            .features
            .iter()
            .rev()
            .find(|feature| hits(&feature.geometry, click, project, tolerance))
    }
}

fn hits(
    geometry: &Geometry<f64>,
    click: Pos2,
    project: &impl Fn(Position) -> Pos2,
    tolerance: f32,
) -> bool {
    match geometry {
        Geometry::Point(point) => hits_point(*point, click, project),
        Geometry::MultiPoint(points) => points
            .iter()
            .any(|point| hits_point(*point, click, project)),
        Geometry::Line(line) => {
            hits_line(&LineString::from(vec![line.start, line.end]), click, project, tolerance)
        }
        Geometry::LineString(line) => hits_line(line, click, project, tolerance),
        Geometry::MultiLineString(lines) => lines
            .iter()
            .any(|line| hits_line(line, click, project, tolerance)),
        Geometry::Polygon(polygon) => hits_polygon(polygon, click, project, tolerance),
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .any(|polygon| hits_polygon(polygon, click, project, tolerance)),
        Geometry::Rect(rect) => hits_polygon(&rect.to_polygon(), click, project, tolerance),
        Geometry::Triangle(triangle) => {
            hits_polygon(&triangle.to_polygon(), click, project, tolerance)
        }
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .any(|geometry| hits(geometry, click, project, tolerance)),
    }
}

fn hits_point(point: Point<f64>, click: Pos2, project: &impl Fn(Position) -> Pos2) -> bool {
    project(point).distance(click) <= POINT_RADIUS
}

fn hits_line(
    line: &LineString<f64>,
    click: Pos2,
    project: &impl Fn(Position) -> Pos2,
    tolerance: f32,
) -> bool {
    let screen: Vec<Pos2> = line
        .coords()
        .map(|coord| project(lon_lat(coord.x, coord.y)))
        .collect();

    match screen.as_slice() {
        [single] => single.distance(click) <= tolerance,
        _ => screen
            .windows(2)
            .any(|segment| distance_to_segment(click, segment[0], segment[1]) <= tolerance),
    }
}

fn hits_polygon(
    polygon: &Polygon<f64>,
    click: Pos2,
    project: &impl Fn(Position) -> Pos2,
    tolerance: f32,
) -> bool {
    let on_screen = polygon.map_coords(|coord| {
        let projected = project(lon_lat(coord.x, coord.y));
        coord! { x: projected.x as f64, y: projected.y as f64 }
    });

    on_screen.intersects(&Point::new(click.x as f64, click.y as f64))
        // Border is drawn, so clicking it counts too.
        || hits_line(polygon.exterior(), click, project, tolerance)
}

fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq == 0. {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0., 1.);
    point.distance(start + segment * t)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::viewport::Viewport;
    use egui::pos2;
    use geo_types::{GeometryCollection, point};

    /// Screen which shows lon/lat degrees as pixels.
    fn degrees_as_pixels(position: Position) -> Pos2 {
        pos2(position.x() as f32, position.y() as f32)
    }

    pub(crate) fn layer_from(
        viewport: &mut Viewport,
        features: Vec<(Geometry<f64>, &str)>,
    ) -> RenderedLayer {
        RenderedLayer::new(
            viewport.allocate_layer_id(),
            "test",
            OverlayStyle::default(),
            features
                .into_iter()
                .map(|(geometry, popup)| OverlayFeature {
                    geometry,
                    popup: popup.to_owned(),
                })
                .collect(),
        )
    }

    fn layer(features: Vec<(Geometry<f64>, &str)>) -> RenderedLayer {
        layer_from(
            &mut Viewport::new(crate::View {
                center: lon_lat(0., 0.),
                zoom: 0.,
            }),
            features,
        )
    }

    fn square_with_hole() -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            vec![(0., 0.), (100., 0.), (100., 100.), (0., 100.)].into(),
            vec![vec![(40., 40.), (60., 40.), (60., 60.), (40., 60.)].into()],
        ))
    }

    fn pick<'a>(layer: &'a RenderedLayer, x: f32, y: f32) -> Option<&'a str> {
        layer
            .pick(pos2(x, y), &degrees_as_pixels)
            .map(|feature| feature.popup.as_str())
    }

    #[test]
    fn clones_are_the_same_layer() {
        let layer = layer(vec![]);
        let clone = layer.clone();
        assert_eq!(layer.id(), clone.id());
        assert_eq!("test", clone.name());
    }

    #[test]
    fn picking_polygons() {
        let layer = layer(vec![(square_with_hole(), "square")]);

        assert_eq!(Some("square"), pick(&layer, 10., 10.));
        assert_eq!(Some("square"), pick(&layer, 90., 50.));
        assert_eq!(None, pick(&layer, 200., 50.));

        // Hole is not a part of the polygon.
        assert_eq!(None, pick(&layer, 50., 50.));
        assert_eq!(None, pick(&layer, 50., 44.));

        // Neither is the outside, unless close to the border.
        assert_eq!(Some("square"), pick(&layer, 103., 50.));
        assert_eq!(None, pick(&layer, 106., 50.));
    }

    #[test]
    fn picking_lines() {
        let line = Geometry::LineString(vec![(0., 0.), (100., 0.), (100., 100.)].into());
        let layer = layer(vec![(line, "road")]);

        assert_eq!(Some("road"), pick(&layer, 50., 4.));
        assert_eq!(Some("road"), pick(&layer, 96., 50.));
        assert_eq!(None, pick(&layer, 50., 6.));
        assert_eq!(None, pick(&layer, 50., 50.));
    }

    #[test]
    fn picking_points() {
        let layer = layer(vec![(Geometry::Point(point!(x: 10., y: 10.)), "pier")]);

        assert_eq!(Some("pier"), pick(&layer, 15., 15.));
        assert_eq!(None, pick(&layer, 20., 20.));
    }

    #[test]
    fn picking_inside_collections() {
        let collection = Geometry::GeometryCollection(GeometryCollection::from(vec![
            Geometry::Point(point!(x: 10., y: 10.)),
            square_with_hole(),
        ]));
        let layer = layer(vec![(collection, "collection")]);

        assert_eq!(Some("collection"), pick(&layer, 12., 8.));
        assert_eq!(Some("collection"), pick(&layer, 80., 80.));
        assert_eq!(None, pick(&layer, -50., -50.));
    }

    #[test]
    fn later_features_are_on_top() {
        let layer = layer(vec![
            (square_with_hole(), "below"),
            (Geometry::Point(point!(x: 10., y: 10.)), "above"),
        ]);

        assert_eq!(Some("above"), pick(&layer, 10., 10.));
        assert_eq!(Some("below"), pick(&layer, 30., 30.));
    }

    #[test]
    fn bounds_of_the_layer() {
        let layer = layer(vec![(square_with_hole(), "square")]);
        let bounds = layer.bounds().unwrap().unwrap();
        assert_eq!(coord! { x: 0., y: 0. }, bounds.min());
        assert_eq!(coord! { x: 100., y: 100. }, bounds.max());
    }

    #[test]
    fn distance_to_segments() {
        let start = pos2(0., 0.);
        let end = pos2(10., 0.);
        assert_eq!(0., distance_to_segment(pos2(5., 0.), start, end));
        assert_eq!(3., distance_to_segment(pos2(5., 3.), start, end));
        assert_eq!(5., distance_to_segment(pos2(13., 4.), start, end));
        assert_eq!(5., distance_to_segment(pos2(3., 4.), start, start));
    }
}
