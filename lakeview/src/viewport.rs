//! What the map shows: view, layers, markers and the popup. Lives independently of the widget
//! so that it can be driven without a screen.

use egui::{Pos2, Vec2, vec2};
use geo_types::{Rect, coord};
use walkers::{Position, lon_lat};

use crate::{
    layer::{LayerId, RenderedLayer},
    mercator::{self, Pixels},
};

/// Clicks closer than this to a marker hit it.
const MARKER_RADIUS: f32 = 12.;

/// Center and zoom of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Position,
    pub zoom: f64,
}

/// Pin placed on the map by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Position,
    pub popup: String,
}

/// Text box anchored to a geographical position.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub position: Position,
    pub content: String,
}

pub struct Viewport {
    view: View,
    size: Vec2,
    min_zoom: f64,
    max_zoom: f64,
    layers: Vec<RenderedLayer>,
    markers: Vec<Marker>,
    popup: Option<Popup>,
    next_layer_id: u64,
    revision: u64,
}

impl Viewport {
    pub fn new(view: View) -> Self {
        let mut viewport = Self {
            view,
            size: vec2(1024., 768.),
            min_zoom: 0.,
            max_zoom: 19.,
            layers: Vec::new(),
            markers: Vec::new(),
            popup: None,
            next_layer_id: 0,
            revision: 0,
        };
        viewport.view.zoom = viewport.clamp_zoom(view.zoom);
        viewport
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Bumped each time the view is changed by the application, as opposed to the user dragging
    /// or zooming the map.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn set_view(&mut self, center: Position, zoom: f64) {
        self.view = View {
            center,
            zoom: self.clamp_zoom(zoom),
        };
        self.revision += 1;
    }

    /// User moved the map.
    pub fn follow_map(&mut self, center: Position, zoom: f64) {
        self.view = View {
            center,
            zoom: self.clamp_zoom(zoom),
        };
    }

    pub fn resize(&mut self, size: Vec2) {
        if size.x > 0. && size.y > 0. {
            self.size = size;
        } else {
            log::trace!("Ignoring degenerate viewport size {size:?}.");
        }
    }

    /// Center the map on `bounds`, using the highest integer zoom at which they are fully
    /// visible.
    pub fn fit_bounds(&mut self, bounds: Rect<f64>) {
        let north_west = mercator::project(lon_lat(bounds.min().x, bounds.max().y), 0.);
        let south_east = mercator::project(lon_lat(bounds.max().x, bounds.min().y), 0.);

        let width = south_east.x() - north_west.x();
        let height = south_east.y() - north_west.y();

        let scale = (self.size.x as f64 / width).min(self.size.y as f64 / height);
        let zoom = scale.log2();

        // Snap to whole levels, ignoring the floating point noise.
        let zoom = ((zoom * 100.).round() / 100.).floor();

        let middle = Pixels::new(
            (north_west.x() + south_east.x()) / 2.,
            (north_west.y() + south_east.y()) / 2.,
        );

        self.set_view(mercator::unproject(middle, 0.), zoom);
    }

    /// Geographical area currently shown by the map.
    pub fn visible_bounds(&self) -> Rect<f64> {
        let north_west = self.position_at(-self.size / 2.);
        let south_east = self.position_at(self.size / 2.);

        Rect::new(
            coord! { x: north_west.x(), y: south_east.y() },
            coord! { x: south_east.x(), y: north_west.y() },
        )
    }

    /// Offset of `position` from the center of the map, in screen pixels.
    pub fn project(&self, position: Position) -> Vec2 {
        offset_from(self.view, position)
    }

    /// Position shown at `offset` from the center of the map.
    pub fn position_at(&self, offset: Vec2) -> Position {
        let center = mercator::project(self.view.center, self.view.zoom);
        mercator::unproject(
            Pixels::new(
                center.x() + offset.x as f64,
                center.y() + offset.y as f64,
            ),
            self.view.zoom,
        )
    }

    /// Allocate an id for a new layer. Ids are never reused.
    pub(crate) fn allocate_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        id
    }

    /// Put the layer on top of the others. Adding a layer which is already there does nothing.
    pub fn add_layer(&mut self, layer: RenderedLayer) {
        if self.has_layer(layer.id()) {
            log::debug!("Layer {:?} is already on the map.", layer.id());
        } else {
            self.layers.push(layer);
        }
    }

    /// Returns whether the layer was on the map.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id() != id);
        before != self.layers.len()
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layers.iter().any(|layer| layer.id() == id)
    }

    /// Layers on the map, bottom first.
    pub fn layers(&self) -> &[RenderedLayer] {
        &self.layers
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Open the popup, closing the one opened previously.
    pub fn open_popup(&mut self, popup: Popup) {
        self.popup = Some(popup);
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Handle a click at `at` screen position, which corresponds to `anchor` on the map.
    /// `project` tells where on the screen a given position is drawn.
    pub fn click(&mut self, at: Pos2, anchor: Position, project: impl Fn(Position) -> Pos2) {
        let marker = self
            .markers
            .iter()
            .rev()
            .find(|marker| project(marker.position).distance(at) <= MARKER_RADIUS);

        if let Some(marker) = marker {
            self.popup = Some(Popup {
                position: marker.position,
                content: marker.popup.clone(),
            });
            return;
        }

        let feature = self
            .layers
            .iter()
            .rev()
            .find_map(|layer| layer.pick(at, &project));

        self.popup = feature.map(|feature| Popup {
            position: anchor,
            content: feature.popup.clone(),
        });
    }

    /// Handle a click at `offset` from the center of the map.
    pub fn click_offset(&mut self, offset: Vec2) {
        let view = self.view;
        let anchor = self.position_at(offset);
        self.click(Pos2::ZERO + offset, anchor, move |position| {
            Pos2::ZERO + offset_from(view, position)
        });
    }
}

fn offset_from(view: View, position: Position) -> Vec2 {
    let center = mercator::project(view.center, view.zoom);
    let position = mercator::project(position, view.zoom);
    vec2(
        (position.x() - center.x()) as f32,
        (position.y() - center.y()) as f32,
    )
}
