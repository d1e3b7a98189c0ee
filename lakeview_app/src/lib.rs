//! egui front-end of Lakeview: a slippy map with GeoJSON overlays, file uploads and search.

mod plugins;
mod tiles;
mod windows;

use std::collections::BTreeMap;

use egui::{CentralPanel, Context, DroppedFile, Frame};
use lakeview::{BaseLayer, Config, PickedFile, Session};
use walkers::{HttpTiles, Map, MapMemory};

pub use plugins::OverlayPlugin;

pub struct LakeviewApp {
    session: Session,
    map_memory: MapMemory,
    tiles: BTreeMap<BaseLayer, HttpTiles>,

    /// Revision of the viewport which the map memory was last updated to.
    applied_revision: Option<u64>,
}

impl LakeviewApp {
    pub fn new(egui_ctx: Context, config: Config) -> Self {
        Self {
            tiles: tiles::providers(egui_ctx.to_owned()),
            session: Session::bootstrap(config, egui_ctx),
            map_memory: MapMemory::default(),
            applied_revision: None,
        }
    }

    /// Move the map wherever the viewport was told to go since the last frame.
    fn sync_map_memory(&mut self) {
        let viewport = &self.session.viewport;
        if self.applied_revision == Some(viewport.revision()) {
            return;
        }

        let view = viewport.view();
        self.map_memory.center_at(view.center);
        if let Err(err) = self.map_memory.set_zoom(view.zoom) {
            log::warn!("Could not zoom to {}: {err:?}", view.zoom);
        }
        self.applied_revision = Some(viewport.revision());
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input_mut(|input| std::mem::take(&mut input.raw.dropped_files));

        // Only one upload is shown at a time, so the last one wins.
        let Some(file) = dropped.into_iter().last() else {
            return;
        };

        match file {
            DroppedFile {
                bytes: Some(bytes),
                name,
                ..
            } => self.session.upload_picked(PickedFile {
                name,
                contents: bytes.to_vec(),
            }),
            #[cfg(not(target_arch = "wasm32"))]
            DroppedFile {
                path: Some(path), ..
            } => self
                .session
                .upload(lakeview::read_picked_file(Some(path))),
            _ => log::warn!("Dropped file has neither contents nor path."),
        }
    }
}

impl eframe::App for LakeviewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.session.poll();
        self.handle_dropped_files(ctx);
        self.sync_map_memory();

        let rimless = Frame::new().fill(ctx.style().visuals.panel_fill);

        CentralPanel::default().frame(rimless).show(ctx, |ui| {
            self.session.viewport.resize(ui.available_size());
            let view = self.session.viewport.view();
            let active = self.session.base_layers.active();

            let mut map = Map::new(None, &mut self.map_memory, view.center);
            if let Some(tiles) = self.tiles.get_mut(&active) {
                map = map.with_layer(tiles, 1.0);
            }
            map.with_plugin(OverlayPlugin::new(&mut self.session.viewport))
                .show(ui, |_, _, _, _| {});

            self.session.viewport.follow_map(
                self.map_memory.detached().unwrap_or(view.center),
                self.map_memory.zoom(),
            );

            windows::acknowledge(ui, active.attribution());
            windows::zoom(ui, &mut self.map_memory);
            windows::layer_control(ui, &mut self.session);
            windows::search(ui, &mut self.session);
        });

        windows::alerts(ctx, &mut self.session.alerts);
    }
}
