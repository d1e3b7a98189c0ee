#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), eframe::Error> {
    use lakeview::Config;
    use lakeview_app::LakeviewApp;

    env_logger::init();

    let config = Config::from_env();
    log::info!("Starting with {config:?}.");

    eframe::run_native(
        "Lakeview",
        Default::default(),
        Box::new(|cc| Ok(Box::new(LakeviewApp::new(cc.egui_ctx.clone(), config)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    println!("This binary is not meant to be compiled for WASM, see lakeview_web.");
}
