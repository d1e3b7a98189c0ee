//! Base layers, named overlays and the control switching between them.

use walkers::sources::{Attribution, OpenStreetMap, TileSource as _};

use crate::{layer::RenderedLayer, sources::EsriWorldImagery, viewport::Viewport};

/// Tiles drawn beneath everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BaseLayer {
    #[default]
    OpenStreetMap,
    Satellite,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 2] = [BaseLayer::OpenStreetMap, BaseLayer::Satellite];

    pub fn label(self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "🗺️ OpenStreetMap",
            BaseLayer::Satellite => "🛰️ Satellite",
        }
    }

    pub fn attribution(self) -> Attribution {
        match self {
            BaseLayer::OpenStreetMap => OpenStreetMap.attribution(),
            BaseLayer::Satellite => EsriWorldImagery.attribution(),
        }
    }

    pub fn max_zoom(self) -> u8 {
        match self {
            BaseLayer::OpenStreetMap => OpenStreetMap.max_zoom(),
            BaseLayer::Satellite => EsriWorldImagery.max_zoom(),
        }
    }
}

/// Exactly one base layer is shown at a time.
#[derive(Debug)]
pub struct BaseLayerSet {
    layers: Vec<BaseLayer>,
    active: BaseLayer,
}

impl Default for BaseLayerSet {
    fn default() -> Self {
        Self {
            layers: BaseLayer::ALL.to_vec(),
            active: BaseLayer::default(),
        }
    }
}

impl BaseLayerSet {
    pub fn active(&self) -> BaseLayer {
        self.active
    }

    /// Base layers to choose from.
    pub fn layers(&self) -> &[BaseLayer] {
        &self.layers
    }

    pub fn select(&mut self, layer: BaseLayer) {
        if !self.layers.contains(&layer) {
            log::warn!("{layer:?} is not one of the base layers.");
        } else if self.active != layer {
            log::debug!("Switching base layer to {layer:?}.");
            self.active = layer;
        }
    }
}

/// Named overlays, in the order they were registered.
#[derive(Debug, Default, Clone)]
pub struct OverlayRegistry {
    entries: Vec<(String, RenderedLayer)>,
}

impl OverlayRegistry {
    /// Register `layer` under `label`, replacing whatever was registered there before.
    pub fn insert(&mut self, label: impl Into<String>, layer: RenderedLayer) {
        let label = label.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, existing)) => *existing = layer,
            None => self.entries.push((label, layer)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&RenderedLayer> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, layer)| layer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RenderedLayer)> {
        self.entries
            .iter()
            .map(|(label, layer)| (label.as_str(), layer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lets the user pick the base layer and toggle overlays.
///
/// Overlays are captured when the control is created. Anything registered afterwards will not
/// show up in it.
#[derive(Debug, Clone)]
pub struct LayerControl {
    base_layers: Vec<BaseLayer>,
    overlays: Vec<(String, RenderedLayer)>,
}

impl LayerControl {
    pub fn new(base_layers: &BaseLayerSet, overlays: &OverlayRegistry) -> Self {
        Self {
            base_layers: base_layers.layers().to_vec(),
            overlays: overlays.entries.clone(),
        }
    }

    pub fn base_layers(&self) -> &[BaseLayer] {
        &self.base_layers
    }

    pub fn overlays(&self) -> impl Iterator<Item = &str> {
        self.overlays.iter().map(|(label, _)| label.as_str())
    }

    pub fn is_overlay_visible(&self, viewport: &Viewport, label: &str) -> bool {
        self.overlay(label)
            .is_some_and(|layer| viewport.has_layer(layer.id()))
    }

    /// Show or hide the overlay. Returns `false` if the control does not know such overlay.
    pub fn set_overlay_visible(&self, viewport: &mut Viewport, label: &str, visible: bool) -> bool {
        let Some(layer) = self.overlay(label) else {
            log::warn!("Layer control has no overlay named \"{label}\".");
            return false;
        };

        if visible {
            viewport.add_layer(layer.clone());
        } else {
            viewport.remove_layer(layer.id());
        }
        true
    }

    fn overlay(&self, label: &str) -> Option<&RenderedLayer> {
        self.overlays
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, layer)| layer)
    }
}
