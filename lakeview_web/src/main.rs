#[cfg(target_arch = "wasm32")]
use eframe::wasm_bindgen::JsCast as _;

/// Overlay bundled next to `index.html`.
#[cfg(target_arch = "wasm32")]
const BUNDLED_OVERLAY: &str = "bao_linh_lake.geojson";

/// Absolute URL of the bundled overlay, relative to the page.
#[cfg(target_arch = "wasm32")]
fn bundled_overlay(window: &web_sys::Window) -> Option<String> {
    let page = window.location().href().ok()?;
    let url = web_sys::Url::new_with_base(BUNDLED_OVERLAY, &page).ok()?;
    Some(url.href())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(window) = web_sys::window() else {
            log::error!("No window.");
            return;
        };

        let Some(canvas) = window
            .document()
            .and_then(|document| document.get_element_by_id("the_canvas_id"))
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("the_canvas_id is missing or is not a canvas.");
            return;
        };

        let mut config = lakeview::Config::default();
        match bundled_overlay(&window) {
            Some(location) => config.default_overlay.location = location,
            None => log::warn!("Could not resolve the location of {BUNDLED_OVERLAY}."),
        }

        let result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| {
                    Ok(Box::new(lakeview_app::LakeviewApp::new(
                        cc.egui_ctx.clone(),
                        config,
                    )))
                }),
            )
            .await;

        if let Err(err) = result {
            log::error!("Failed to start eframe: {err:?}");
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    println!("This binary is only meant to be compiled for WASM, see lakeview_native.");
}
