use egui::{
    Color32, FontId, Mesh, Painter, PointerButton, Pos2, Rect, Response, Shape, Stroke,
    StrokeKind, Ui, epaint::Vertex, pos2, vec2,
};
use geo_types::{Geometry, LineString, Polygon};
use lakeview::{OverlayStyle, Position, RenderedLayer, Viewport, lon_lat};
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers, math::point,
    path::Path,
};
use walkers::{MapMemory, Plugin, Projector};

/// Radius of drawn point features.
const POINT_RADIUS: f32 = 5.;

/// Radius of search markers.
const MARKER_RADIUS: f32 = 8.;

/// Draws the layers, markers and the popup of a [`Viewport`], and lets the user click them.
pub struct OverlayPlugin<'a> {
    viewport: &'a mut Viewport,
}

impl<'a> OverlayPlugin<'a> {
    pub fn new(viewport: &'a mut Viewport) -> Self {
        Self { viewport }
    }
}

impl Plugin for OverlayPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        response: &Response,
        projector: &Projector,
        _map_memory: &MapMemory,
    ) {
        let project = |position: Position| projector.project(position).to_pos2();

        if !response.changed() && response.clicked_by(PointerButton::Primary) {
            if let Some(pointer) = response.interact_pointer_pos() {
                let anchor = self.viewport.position_at(pointer - response.rect.center());
                self.viewport.click(pointer, anchor, project);
            }
        }

        let painter = ui.painter_at(response.rect);

        for layer in self.viewport.layers() {
            draw_layer(&painter, layer, &project);
        }

        for marker in self.viewport.markers() {
            painter.circle(
                project(marker.position),
                MARKER_RADIUS,
                Color32::from_rgb(0x2A, 0x81, 0xCB),
                Stroke::new(2., Color32::WHITE),
            );
        }

        if let Some(popup) = self.viewport.popup() {
            draw_popup(ui, &painter, project(popup.position), &popup.content);
        }
    }
}

fn draw_layer(painter: &Painter, layer: &RenderedLayer, project: &impl Fn(Position) -> Pos2) {
    for feature in layer.features() {
        draw_geometry(painter, &feature.geometry, layer.style(), project);
    }
}

fn draw_geometry(
    painter: &Painter,
    geometry: &Geometry<f64>,
    style: &OverlayStyle,
    project: &impl Fn(Position) -> Pos2,
) {
    match geometry {
        Geometry::Point(point) => {
            painter.circle(project(*point), POINT_RADIUS, style.fill(), style.stroke());
        }
        Geometry::MultiPoint(points) => {
            for point in points {
                painter.circle(project(*point), POINT_RADIUS, style.fill(), style.stroke());
            }
        }
        Geometry::Line(line) => {
            painter.line_segment(
                [
                    project(lon_lat(line.start.x, line.start.y)),
                    project(lon_lat(line.end.x, line.end.y)),
                ],
                style.stroke(),
            );
        }
        Geometry::LineString(line) => draw_line(painter, line, style, project),
        Geometry::MultiLineString(lines) => {
            for line in lines {
                draw_line(painter, line, style, project);
            }
        }
        Geometry::Polygon(polygon) => draw_polygon(painter, polygon, style, project),
        Geometry::MultiPolygon(polygons) => {
            for polygon in polygons {
                draw_polygon(painter, polygon, style, project);
            }
        }
        Geometry::Rect(rect) => draw_polygon(painter, &rect.to_polygon(), style, project),
        Geometry::Triangle(triangle) => {
            draw_polygon(painter, &triangle.to_polygon(), style, project);
        }
        Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                draw_geometry(painter, geometry, style, project);
            }
        }
    }
}

fn draw_line(
    painter: &Painter,
    line: &LineString<f64>,
    style: &OverlayStyle,
    project: &impl Fn(Position) -> Pos2,
) {
    let points: Vec<Pos2> = line
        .coords()
        .map(|coord| project(lon_lat(coord.x, coord.y)))
        .collect();
    painter.add(Shape::line(points, style.stroke()));
}

fn draw_polygon(
    painter: &Painter,
    polygon: &Polygon<f64>,
    style: &OverlayStyle,
    project: &impl Fn(Position) -> Pos2,
) {
    let Some(exterior) = ring_to_screen(polygon.exterior(), project) else {
        return;
    };

    let holes: Vec<Vec<Pos2>> = polygon
        .interiors()
        .iter()
        .filter_map(|hole| ring_to_screen(hole, project))
        .collect();

    if let Some(mesh) = tessellate(&exterior, &holes, style.fill()) {
        painter.add(Shape::mesh(mesh));
    }

    painter.add(Shape::closed_line(exterior, style.stroke()));
    for hole in holes {
        painter.add(Shape::closed_line(hole, style.stroke()));
    }
}

/// Project the ring onto the screen. `None` if it does not enclose anything.
fn ring_to_screen(
    ring: &LineString<f64>,
    project: &impl Fn(Position) -> Pos2,
) -> Option<Vec<Pos2>> {
    let mut coords: Vec<_> = ring.coords().collect();

    // Closing vertex is implied.
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }

    if coords.len() < 3 {
        return None;
    }

    Some(
        coords
            .into_iter()
            .map(|coord| project(lon_lat(coord.x, coord.y)))
            .collect(),
    )
}

/// Triangulate the polygon, so that egui can fill it. Concave shapes and holes are handled.
fn tessellate(exterior: &[Pos2], holes: &[Vec<Pos2>], color: Color32) -> Option<Mesh> {
    let mut builder = Path::builder();
    for ring in std::iter::once(exterior).chain(holes.iter().map(Vec::as_slice)) {
        let [first, rest @ ..] = ring else {
            continue;
        };
        builder.begin(point(first.x, first.y));
        for p in rest {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<Pos2, u32> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex<'_>| {
            let position = vertex.position();
            pos2(position.x, position.y)
        }),
    );

    if let Err(err) = result {
        log::debug!("Could not tessellate a polygon: {err:?}");
        return None;
    }

    let mut mesh = Mesh::default();
    mesh.indices = buffers.indices;
    mesh.vertices = buffers
        .vertices
        .into_iter()
        .map(|pos| Vertex {
            pos,
            uv: egui::epaint::WHITE_UV,
            color,
        })
        .collect();
    Some(mesh)
}

/// Box with the text, pointing at `anchor`.
fn draw_popup(ui: &Ui, painter: &Painter, anchor: Pos2, content: &str) {
    let visuals = ui.visuals();
    let galley = painter.layout(
        content.to_owned(),
        FontId::proportional(14.),
        visuals.text_color(),
        300.,
    );

    let margin = 8.;
    let tip = anchor - vec2(0., MARKER_RADIUS);
    let size = galley.size() + vec2(2. * margin, 2. * margin);
    let rect = Rect::from_min_size(tip - vec2(size.x / 2., size.y + margin), size);

    painter.add(Shape::convex_polygon(
        vec![
            rect.center_bottom() - vec2(margin, 0.),
            rect.center_bottom() + vec2(margin, 0.),
            tip,
        ],
        visuals.window_fill,
        Stroke::NONE,
    ));
    painter.rect(
        rect,
        4.,
        visuals.window_fill,
        visuals.window_stroke,
        StrokeKind::Outside,
    );
    painter.galley(rect.min + vec2(margin, margin), galley, visuals.text_color());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees_as_pixels(position: Position) -> Pos2 {
        pos2(position.x() as f32, position.y() as f32)
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let ring = LineString::from(vec![(0., 0.), (10., 0.), (10., 10.), (0., 0.)]);
        assert_eq!(
            Some(vec![pos2(0., 0.), pos2(10., 0.), pos2(10., 10.)]),
            ring_to_screen(&ring, &degrees_as_pixels)
        );
    }

    #[test]
    fn degenerate_rings_are_skipped() {
        let ring = LineString::from(vec![(0., 0.), (10., 0.), (0., 0.)]);
        assert_eq!(None, ring_to_screen(&ring, &degrees_as_pixels));
    }

    #[test]
    fn tessellating_square() {
        let square = [pos2(0., 0.), pos2(10., 0.), pos2(10., 10.), pos2(0., 10.)];
        let mesh = tessellate(&square, &[], Color32::RED).unwrap();

        assert_eq!(6, mesh.indices.len());
        assert_eq!(4, mesh.vertices.len());
        assert!(mesh.vertices.iter().all(|vertex| vertex.color == Color32::RED));
    }

    #[test]
    fn tessellating_square_with_hole() {
        let square = [pos2(0., 0.), pos2(30., 0.), pos2(30., 30.), pos2(0., 30.)];
        let hole = vec![pos2(10., 10.), pos2(20., 10.), pos2(20., 20.), pos2(10., 20.)];
        let mesh = tessellate(&square, &[hole], Color32::RED).unwrap();

        assert_eq!(8, mesh.vertices.len());

        // Hole has 100 px², out of 900 px² of the square.
        let area: f32 = mesh
            .indices
            .chunks(3)
            .map(|triangle| {
                let [a, b, c] = [0, 1, 2].map(|i| mesh.vertices[triangle[i] as usize].pos);
                ((b - a).x * (c - a).y - (b - a).y * (c - a).x).abs() / 2.
            })
            .sum();
        assert!((area - 800.).abs() < 0.01);
    }
}
