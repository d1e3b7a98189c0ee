//! Tile sources walkers does not ship with.

use walkers::{
    TileId,
    sources::{Attribution, TileSource},
};

/// Satellite and aerial imagery from Esri.
/// <https://www.arcgis.com/home/item.html?id=10df2279f9684e4a9f6a7f08febac2a9>
pub struct EsriWorldImagery;

impl TileSource for EsriWorldImagery {
    fn tile_url(&self, tile_id: TileId) -> String {
        // Note the order, Esri wants the row before the column.
        format!(
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
            tile_id.zoom, tile_id.y, tile_id.x
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Tiles © Esri — Source: Esri, Earthstar Geographics, CNES/Airbus DS, GeoEye, \
                USDA FSA, USGS, AeroGRID, IGN, Kadaster NL, Ordnance Survey, Esri Japan, METI, \
                Esri China (Hong Kong), cribis ltd, MapmyIndia, © OpenStreetMap contributors, \
                and the GIS User Community",
            url: "https://www.esri.com/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}
