use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::CategoryFilter;
use crate::state::{AppState, ExportKind};

/// Label the category picker shows for "no category filter".
const ALL_CATEGORIES_LABEL: &str = "Todos";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and downloads
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    let logo = egui::include_image!("../../assets/logo.png");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add(
            egui::Image::new(logo)
                .max_width(ui.available_width() * 0.5)
                .max_height(120.0)
                .corner_radius(4.0),
        );
    });
    ui.add_space(4.0);

    ui.heading("Filtros");
    ui.label(RichText::new("Filtra por código, descripción, precio o categoría").weak());
    ui.separator();

    let Some(inventory) = &state.inventory else {
        ui.label("No hay inventario cargado.");
        return;
    };

    // Clone what we need so we can mutate state inside the closures.
    let categories = inventory.categories().to_vec();
    let bounds = inventory.price_bounds();
    let before = state.inputs.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Código");
            ui.add(
                egui::TextEdit::singleline(&mut state.inputs.code)
                    .hint_text("p. ej. A1-200"),
            );

            ui.strong("Descripción");
            ui.add(
                egui::TextEdit::singleline(&mut state.inputs.description)
                    .hint_text("buscar en la descripción"),
            );

            ui.strong("Categoría");
            let selected_text = match &state.inputs.category {
                CategoryFilter::All => ALL_CATEGORIES_LABEL.to_string(),
                CategoryFilter::Exact(c) => c.clone(),
            };
            egui::ComboBox::from_id_salt("category")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(
                        &mut state.inputs.category,
                        CategoryFilter::All,
                        ALL_CATEGORIES_LABEL,
                    );
                    for cat in &categories {
                        let text = RichText::new(cat).color(state.category_colors.color_for(cat));
                        ui.selectable_value(
                            &mut state.inputs.category,
                            CategoryFilter::Exact(cat.clone()),
                            text,
                        );
                    }
                });

            ui.add_space(6.0);
            if let Some(bounds) = bounds {
                ui.strong("Rango de Precio Outlet");
                let (min_range, max_range) = state.inputs.price_slider_ranges(bounds);
                ui.add(
                    egui::Slider::new(&mut state.inputs.price_min, min_range)
                        .prefix("$")
                        .text("mín"),
                );
                ui.add(
                    egui::Slider::new(&mut state.inputs.price_max, max_range)
                        .prefix("$")
                        .text("máx"),
                );
            }

            ui.add_space(6.0);
            if ui.button("Limpiar filtros").clicked() {
                if let Some(inventory) = &state.inventory {
                    state.inputs = crate::state::FilterInputs::reset_for(inventory);
                }
            }

            ui.separator();
            ui.heading("Descargar resultados filtrados");
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("📄 CSV").clicked() {
                    save_dialog(state, ExportKind::Csv);
                }
                if ui.button("📊 Excel").clicked() {
                    save_dialog(state, ExportKind::Workbook);
                }
            });
        });

    // Only recompute when a widget actually changed something.
    if state.inputs != before {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir carpeta…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Recargar").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("Inventario Autopartes");
        ui.label(RichText::new(state.source_description()).weak());
        ui.separator();

        if let Some(inv) = &state.inventory {
            let visible = state.result.as_ref().map_or(0, |r| r.table.len());
            ui.label(format!(
                "{} partes cargadas, resultados encontrados: {visible}",
                inv.len()
            ));
        }

        if let Some(url) = &state.settings.contact_url {
            ui.separator();
            ui.hyperlink_to("💬 WhatsApp", url);
        }

        if let Some(note) = &state.notice {
            ui.separator();
            ui.label(RichText::new(note).color(Color32::from_rgb(200, 140, 0)));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Carpeta del inventario")
        .set_directory(&state.settings.source_dir)
        .pick_folder();

    if let Some(dir) = folder {
        log::info!("Switching source to {}", dir.display());
        state.set_source_dir(&dir);
    }
}

fn save_dialog(state: &mut AppState, kind: ExportKind) {
    let Some(export) = state.export(kind) else {
        return;
    };
    let (bytes, file_name) = match export {
        Ok(ok) => ok,
        Err(e) => {
            log::error!("Export failed: {e}");
            state.status_message = Some(format!("{}: {e}", e.headline()));
            return;
        }
    };

    let (label, ext) = match kind {
        ExportKind::Csv => ("CSV", "csv"),
        ExportKind::Workbook => ("Excel", "xlsx"),
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Guardar resultados")
        .set_file_name(file_name)
        .add_filter(label, &[ext])
        .save_file()
    else {
        return;
    };

    match std::fs::write(&path, &bytes) {
        Ok(()) => {
            log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
            state.notice = Some(format!("Guardado en {}", path.display()));
        }
        Err(e) => {
            log::error!("Failed to write {}: {e}", path.display());
            state.status_message = Some(format!("No se pudo guardar {}: {e}", path.display()));
        }
    }
}
