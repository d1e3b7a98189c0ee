//! Everything the application knows, in one place.

use std::future::Future;

use egui::Context;
use futures::channel::mpsc::{TryRecvError, UnboundedReceiver, UnboundedSender, unbounded};
use serde_json::Value;

use crate::{
    alerts::Alerts,
    config::Config,
    default_overlay::{self, FetchError, fetch_overlay},
    geocoder::{GeocodeError, GeocodeResult, Geocoder},
    io::{MaybeSend, http::http_client, runtime::Runtime},
    layer::RenderedLayer,
    registry::{BaseLayerSet, LayerControl, OverlayRegistry},
    search::{SearchControl, select_location},
    upload::{PickedFile, ReadError, Uploads},
    viewport::Viewport,
};

/// Outcome of work done on the IO runtime.
enum Event {
    DefaultOverlay(Result<Value, FetchError>),
    Upload {
        seq: u64,
        result: Result<Option<PickedFile>, ReadError>,
    },
    Geocoded {
        seq: u64,
        result: Result<Vec<GeocodeResult>, GeocodeError>,
    },
}

/// Runs futures on the IO runtime and sends their outcomes back to the UI thread.
struct Tasks {
    runtime: Runtime,
    tx: UnboundedSender<Event>,
    egui_ctx: Context,
    in_flight: usize,
}

impl Tasks {
    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Event> + MaybeSend + 'static,
    {
        let tx = self.tx.clone();
        let egui_ctx = self.egui_ctx.clone();
        self.in_flight += 1;

        self.runtime.spawn(async move {
            let event = task.await;
            if tx.unbounded_send(event).is_err() {
                log::debug!("Session is gone, dropping the outcome.");
                return;
            }
            egui_ctx.request_repaint();
        });
    }
}

/// Application state. Mutated only from the UI thread, through [`Session::poll`] and the user
/// actions.
pub struct Session {
    config: Config,

    pub viewport: Viewport,
    pub alerts: Alerts,
    pub base_layers: BaseLayerSet,
    pub search: SearchControl,

    registry: OverlayRegistry,
    layer_control: LayerControl,
    uploads: Uploads,
    geocoder: Geocoder,

    tasks: Tasks,
    rx: UnboundedReceiver<Event>,
}

impl Session {
    /// Set up the application and start loading the default overlay.
    pub fn bootstrap(config: Config, egui_ctx: Context) -> Self {
        let (tx, rx) = unbounded();
        let client = http_client(&config.user_agent);

        let mut tasks = Tasks {
            runtime: Runtime::new(),
            tx,
            egui_ctx,
            in_flight: 0,
        };

        let location = config.default_overlay.location.clone();
        log::info!("Loading default overlay from {location}.");
        let fetch = fetch_overlay(client.clone(), location);
        tasks.spawn(async move { Event::DefaultOverlay(fetch.await) });

        let base_layers = BaseLayerSet::default();
        let registry = OverlayRegistry::default();

        // The fetch above is still running, so the default overlay will not make it here.
        let layer_control = LayerControl::new(&base_layers, &registry);

        Self {
            viewport: Viewport::new(config.initial_view),
            alerts: Alerts::default(),
            base_layers,
            search: SearchControl::new(&config.search),
            registry,
            layer_control,
            uploads: Uploads::default(),
            geocoder: Geocoder::new(client, &config.search.geocoder_url, config.search.limit),
            config,
            tasks,
            rx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn layer_control(&self) -> &LayerControl {
        &self.layer_control
    }

    /// Layer made from the most recently uploaded file.
    pub fn uploaded_layer(&self) -> Option<&RenderedLayer> {
        self.uploads.layer()
    }

    /// Whether anything is still running in the background.
    pub fn is_busy(&self) -> bool {
        self.tasks.in_flight > 0
    }

    /// Apply whatever the background work came up with. Meant to be called every frame.
    pub fn poll(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.tasks.in_flight = self.tasks.in_flight.saturating_sub(1);
                    self.handle(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    log::error!("IO runtime is dead.");
                    break;
                }
            }
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::DefaultOverlay(result) => default_overlay::apply(
                &mut self.viewport,
                &mut self.alerts,
                &mut self.registry,
                &self.config.default_overlay,
                result,
            ),
            Event::Upload { seq, result } => {
                self.uploads
                    .complete(&mut self.viewport, &mut self.alerts, seq, result);
            }
            Event::Geocoded { seq, result } => self.search.complete(seq, result),
        }
    }

    /// Upload the file `read` resolves to. Resolving to `None` means the user did not pick
    /// anything. If the user uploads another file before this one is read, this one is ignored.
    pub fn upload<F>(&mut self, read: F)
    where
        F: Future<Output = Result<Option<PickedFile>, ReadError>> + MaybeSend + 'static,
    {
        let seq = self.uploads.issue();
        log::debug!("Upload {seq} started.");
        self.tasks.spawn(async move {
            Event::Upload {
                seq,
                result: read.await,
            }
        });
    }

    /// Upload a file which is already in the memory, for example dropped onto the window.
    pub fn upload_picked(&mut self, file: PickedFile) {
        self.upload(std::future::ready(Ok(Some(file))));
    }

    /// Look for what the user typed in the search box.
    pub fn search(&mut self) {
        let query = self.search.query.trim().to_owned();
        if query.is_empty() {
            return;
        }

        let seq = self.search.issue();
        let geocoder = self.geocoder.clone();
        self.tasks.spawn(async move {
            Event::Geocoded {
                seq,
                result: geocoder.geocode(&query).await,
            }
        });
    }

    /// User picked one of the search results.
    pub fn select_search_result(&mut self, index: usize) {
        if let Some(result) = self.search.take(index) {
            log::info!("Going to {}.", result.name);
            select_location(&mut self.viewport, &result, self.config.search.zoom);
        }
    }

    /// Show or hide an overlay listed in the layer control.
    pub fn set_overlay_visible(&mut self, label: &str, visible: bool) -> bool {
        self.layer_control
            .set_overlay_visible(&mut self.viewport, label, visible)
    }

    pub fn is_overlay_visible(&self, label: &str) -> bool {
        self.layer_control.is_overlay_visible(&self.viewport, label)
    }
}
