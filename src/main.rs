use autopartes_inventory::app::InventoryApp;
use autopartes_inventory::config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Could not load settings, using defaults: {e:#}");
            Settings::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Inventario Autopartes",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(InventoryApp::new(settings)))
        }),
    )
}
