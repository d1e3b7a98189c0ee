//! GeoJSON files picked by the user.

use crate::{
    alerts::Alerts,
    layer::RenderedLayer,
    loader::{FitBounds, add_features_layer, add_geojson_layer},
    overlay::{has_type, parse_features},
    viewport::Viewport,
};

/// Shown when the picked file could not be read or is not JSON.
pub const UNREADABLE_UPLOAD_ALERT: &str = "❌ Could not read or parse the file as GeoJSON.";

/// File picked by the user, already read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("could not read {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
}

/// Read the file at `path`. `None` means no file was picked.
///
/// # Errors
///
/// When the file cannot be read.
#[cfg(not(target_arch = "wasm32"))]
pub async fn read_picked_file(
    path: Option<std::path::PathBuf>,
) -> Result<Option<PickedFile>, ReadError> {
    let Some(path) = path else {
        log::debug!("No file picked.");
        return Ok(None);
    };

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let contents = tokio::fs::read(&path)
        .await
        .map_err(|source| ReadError::Io {
            name: name.clone(),
            source,
        })?;

    Ok(Some(PickedFile { name, contents }))
}

/// Tracks the layer made from the most recent upload. There is at most one at a time.
#[derive(Debug, Default)]
pub struct Uploads {
    layer: Option<RenderedLayer>,

    /// Sequence number given to the most recent upload.
    issued: u64,

    /// Sequence number of the upload which the current state comes from.
    applied: u64,
}

impl Uploads {
    pub fn layer(&self) -> Option<&RenderedLayer> {
        self.layer.as_ref()
    }

    /// Sequence number for a new upload. Uploads are applied in the order they were issued.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply the outcome of the upload `seq`.
    pub fn complete(
        &mut self,
        viewport: &mut Viewport,
        alerts: &mut Alerts,
        seq: u64,
        result: Result<Option<PickedFile>, ReadError>,
    ) {
        if seq < self.applied {
            log::debug!("Upload {seq} finished after upload {}, dropping it.", self.applied);
            return;
        }

        let file = match result {
            Ok(Some(file)) => file,
            Ok(None) => return,
            Err(err) => {
                log::error!("Error processing uploaded file: {err}");
                self.reject(alerts, seq);
                return;
            }
        };

        let text = String::from_utf8_lossy(&file.contents);
        let document: serde_json::Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(err) => {
                log::error!("Error processing uploaded file {}: {err}", file.name);
                self.reject(alerts, seq);
                return;
            }
        };

        // Typed documents which are not GeoJSON after all count as unreadable files.
        let features = match has_type(&document).then(|| parse_features(&document)) {
            Some(Ok(features)) => Some(features),
            Some(Err(err)) => {
                log::error!("Error processing uploaded file {}: {err}", file.name);
                self.reject(alerts, seq);
                return;
            }
            None => None,
        };

        if let Some(previous) = self.layer.take() {
            log::debug!("Removing previously uploaded \"{}\".", previous.name());
            viewport.remove_layer(previous.id());
        }

        let name = format!("📂 {}", file.name);
        let fit = FitBounds::Fit { fallback: None };
        self.layer = match features {
            Some(features) => Some(add_features_layer(viewport, &name, features, fit)),
            None => add_geojson_layer(viewport, alerts, Some(&document), &name, fit),
        };
        self.applied = seq;
    }

    /// Upload `seq` failed. It still supersedes the ones issued before it.
    fn reject(&mut self, alerts: &mut Alerts, seq: u64) {
        self.applied = seq;
        alerts.push(UNREADABLE_UPLOAD_ALERT);
    }
}
