use egui::{Align2, Context, Id, Key, Modal, RichText, TextEdit, Ui, Window};
use lakeview::{Alerts, BaseLayer, Corner, Session};
use walkers::{MapMemory, sources::Attribution};

/// Where a window anchored at `corner` goes.
fn anchor(corner: Corner) -> (Align2, [f32; 2]) {
    match corner {
        Corner::TopLeft => (Align2::LEFT_TOP, [10., 10.]),
        Corner::TopRight => (Align2::RIGHT_TOP, [-10., 10.]),
        Corner::BottomLeft => (Align2::LEFT_BOTTOM, [10., -10.]),
        Corner::BottomRight => (Align2::RIGHT_BOTTOM, [-10., -10.]),
    }
}

pub fn acknowledge(ui: &Ui, attribution: Attribution) {
    Window::new("Acknowledge")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_BOTTOM, [10., -10.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                ui.label("map provided by");
                ui.hyperlink_to(attribution.text, attribution.url);
            });
        });
}

/// Simple GUI to zoom in and out.
pub fn zoom(ui: &Ui, map_memory: &mut MapMemory) {
    Window::new("Map")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::RIGHT_BOTTOM, [-10., -10.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                if ui.button(RichText::new("➕").heading()).clicked() {
                    let _ = map_memory.zoom_in();
                }

                if ui.button(RichText::new("➖").heading()).clicked() {
                    let _ = map_memory.zoom_out();
                }

                ui.label(format!("{:.1}", map_memory.zoom()));
            });
        });
}

/// Base layers, overlays and the upload button.
pub fn layer_control(ui: &Ui, session: &mut Session) {
    Window::new("Layers")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_TOP, [10., 10.])
        .show(ui.ctx(), |ui| {
            let mut active = session.base_layers.active();
            for layer in BaseLayer::ALL {
                ui.radio_value(&mut active, layer, layer.label());
            }
            session.base_layers.select(active);

            let overlays: Vec<String> = session
                .layer_control()
                .overlays()
                .map(str::to_owned)
                .collect();

            if !overlays.is_empty() {
                ui.separator();
            }

            for label in overlays {
                let mut visible = session.is_overlay_visible(&label);
                if ui.checkbox(&mut visible, &label).changed() {
                    session.set_overlay_visible(&label, visible);
                }
            }

            ui.separator();

            #[cfg(not(target_os = "android"))]
            if ui.button("📂 Upload GeoJSON").clicked() {
                pick_and_upload(session);
            }

            if let Some(layer) = session.uploaded_layer() {
                ui.label(layer.name());
            }

            if session.is_busy() {
                ui.spinner();
            }
        });
}

#[cfg(all(not(target_arch = "wasm32"), not(target_os = "android")))]
fn pick_and_upload(session: &mut Session) {
    let path = rfd::FileDialog::new()
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();
    session.upload(lakeview::read_picked_file(path));
}

#[cfg(target_arch = "wasm32")]
fn pick_and_upload(session: &mut Session) {
    let dialog = rfd::AsyncFileDialog::new()
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    session.upload(async move {
        let Some(file) = dialog.await else {
            return Ok(None);
        };

        Ok(Some(lakeview::PickedFile {
            name: file.file_name(),
            contents: file.read().await,
        }))
    });
}

pub fn search(ui: &Ui, session: &mut Session) {
    let (align, offset) = anchor(session.search.corner());

    Window::new("Search")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(align, offset)
        .fixed_size([250., 0.])
        .show(ui.ctx(), |ui| {
            let placeholder = session.search.placeholder().to_owned();
            let response =
                ui.add(TextEdit::singleline(&mut session.search.query).hint_text(placeholder));

            if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
                session.search();
            }

            if session.search.is_searching() {
                ui.spinner();
            } else if session.search.found_nothing() {
                ui.label("No results");
            }

            let mut selected = None;
            for (index, result) in session.search.results().iter().enumerate() {
                if ui.button(&result.name).clicked() {
                    selected = Some(index);
                }
            }

            if let Some(index) = selected {
                session.select_search_result(index);
            }
        });
}

/// Show the oldest alert, until the user dismisses it.
pub fn alerts(ctx: &Context, alerts: &mut Alerts) {
    let Some(message) = alerts.current() else {
        return;
    };

    let mut dismissed = false;
    let modal = Modal::new(Id::new("lakeview_alert")).show(ctx, |ui| {
        ui.label(message);
        ui.add_space(8.);
        if ui.button("OK").clicked() {
            dismissed = true;
        }
    });

    if dismissed || modal.should_close() {
        alerts.dismiss();
    }
}
