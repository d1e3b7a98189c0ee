//! Project the lat/lon coordinates into a 2D x/y using the Web Mercator, the same way walkers
//! does when drawing tiles.
//! <https://en.wikipedia.org/wiki/Web_Mercator_projection>
//! <https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames>

use std::f64::consts::PI;

use walkers::{Position, lon_lat};

/// Location projected on the "world bitmap", in pixels.
pub(crate) type Pixels = geo_types::Point;

/// Size of a single tile in pixels.
const TILE_SIZE: f64 = 256.;

/// Beyond that, Mercator goes to infinity.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Number of pixels the whole world takes at given zoom.
pub(crate) fn total_pixels(zoom: f64) -> f64 {
    2f64.powf(zoom) * TILE_SIZE
}

/// Project the position into the Mercator projection and normalize it to 0-1 range.
fn mercator_normalized(position: Position) -> (f64, f64) {
    let latitude = position.y().clamp(-MAX_LATITUDE, MAX_LATITUDE);

    // Project into Mercator (cylindrical map projection).
    let x = position.x().to_radians();
    let y = latitude.to_radians().tan().asinh();

    // Scale both x and y to 0-1 range.
    let x = (1. + (x / PI)) / 2.;
    let y = (1. - (y / PI)) / 2.;

    (x, y)
}

/// Project geographical position into a 2D plane using Mercator.
pub(crate) fn project(position: Position, zoom: f64) -> Pixels {
    let total_pixels = total_pixels(zoom);
    let (x, y) = mercator_normalized(position);
    Pixels::new(x * total_pixels, y * total_pixels)
}

/// Transforms pixels on the world bitmap back into a geographical position.
pub(crate) fn unproject(pixels: Pixels, zoom: f64) -> Position {
    let total_pixels = total_pixels(zoom);

    let lon = pixels.x() / total_pixels;
    let lon = (lon * 2. - 1.) * PI;

    let lat = pixels.y() / total_pixels;
    let lat = (-lat * 2. + 1.) * PI;
    let lat = lat.sinh().atan();

    lon_lat(lon.to_degrees(), lat.to_degrees())
}
