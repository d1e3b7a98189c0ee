use std::collections::BTreeMap;

use egui::Context;
use lakeview::{BaseLayer, sources::EsriWorldImagery};
use walkers::{HttpOptions, HttpTiles};

fn http_options() -> HttpOptions {
    // Tiles are never stored on the disk.
    HttpOptions {
        cache: None,
        ..Default::default()
    }
}

fn tiles(layer: BaseLayer, egui_ctx: Context) -> HttpTiles {
    match layer {
        BaseLayer::OpenStreetMap => {
            HttpTiles::with_options(walkers::sources::OpenStreetMap, http_options(), egui_ctx)
        }
        BaseLayer::Satellite => HttpTiles::with_options(EsriWorldImagery, http_options(), egui_ctx),
    }
}

/// Tiles for every base layer. They are downloaded only when shown.
pub(crate) fn providers(egui_ctx: Context) -> BTreeMap<BaseLayer, HttpTiles> {
    BaseLayer::ALL
        .into_iter()
        .map(|layer| (layer, tiles(layer, egui_ctx.to_owned())))
        .collect()
}
