#![doc = include_str!("../README.md")]
#![deny(clippy::unwrap_used, rustdoc::broken_intra_doc_links)]

mod alerts;
mod config;
mod default_overlay;
mod geocoder;
mod io;
mod layer;
mod loader;
mod mercator;
mod overlay;
mod registry;
mod search;
mod session;
pub mod sources;
mod upload;
mod viewport;

pub use alerts::Alerts;
pub use config::{Config, DefaultOverlay, SearchOptions};
pub use default_overlay::{FetchError, fetch_overlay};
pub use geocoder::{GeocodeError, GeocodeResult, Geocoder, parse_coordinates};
pub use io::MaybeSend;
pub use layer::{LayerId, RenderedLayer};
pub use loader::{FitBounds, INVALID_DOCUMENT_ALERT, add_geojson_layer};
pub use overlay::{BoundsError, OverlayError, OverlayFeature, OverlayStyle};
pub use registry::{BaseLayer, BaseLayerSet, LayerControl, OverlayRegistry};
pub use search::{Corner, SearchControl, select_location};
pub use session::Session;
#[cfg(not(target_arch = "wasm32"))]
pub use upload::read_picked_file;
pub use upload::{PickedFile, ReadError, UNREADABLE_UPLOAD_ALERT, Uploads};
pub use viewport::{Marker, Popup, View, Viewport};
pub use walkers::{Position, lon_lat};
