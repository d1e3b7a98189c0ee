use crate::{
    config::SearchOptions,
    geocoder::{GeocodeError, GeocodeResult},
    viewport::{Marker, Popup, Viewport},
};

/// Corner of the map where a control sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// State of the search box.
#[derive(Debug)]
pub struct SearchControl {
    placeholder: String,
    corner: Corner,

    /// What the user typed.
    pub query: String,

    results: Vec<GeocodeResult>,
    searching: bool,
    failed: bool,

    /// Sequence number of the most recent search. Results of any other are ignored.
    latest: u64,
}

impl SearchControl {
    pub fn new(options: &SearchOptions) -> Self {
        Self {
            placeholder: options.placeholder.clone(),
            corner: options.corner,
            query: String::new(),
            results: Vec::new(),
            searching: false,
            failed: false,
            latest: 0,
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn results(&self) -> &[GeocodeResult] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Whether the last search came back empty handed, either because nothing matched or
    /// because the geocoder failed.
    pub fn found_nothing(&self) -> bool {
        self.failed
    }

    /// Start a new search, superseding any ongoing one.
    pub(crate) fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.searching = true;
        self.failed = false;
        self.latest
    }

    pub(crate) fn complete(
        &mut self,
        seq: u64,
        result: Result<Vec<GeocodeResult>, GeocodeError>,
    ) {
        if seq != self.latest {
            log::debug!("Search {seq} was superseded by {}.", self.latest);
            return;
        }

        self.searching = false;
        self.results = match result {
            Ok(results) => results,
            Err(err) => {
                log::warn!("Geocoding failed: {err}");
                Vec::new()
            }
        };
        self.failed = self.results.is_empty();
    }

    /// Take the result the user picked, clearing the list.
    pub(crate) fn take(&mut self, index: usize) -> Option<GeocodeResult> {
        if index < self.results.len() {
            let result = self.results.swap_remove(index);
            self.results.clear();
            Some(result)
        } else {
            None
        }
    }
}

/// Fly to the found place and mark it.
pub fn select_location(viewport: &mut Viewport, result: &GeocodeResult, zoom: f64) {
    viewport.set_view(result.center, zoom);

    let popup = format!("📍 {}", result.name);
    viewport.add_marker(Marker {
        position: result.center,
        popup: popup.clone(),
    });
    viewport.open_popup(Popup {
        position: result.center,
        content: popup,
    });
}
