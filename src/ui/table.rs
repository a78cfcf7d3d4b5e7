use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Results table (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered inventory in the central panel.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(result) = &state.result else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Sin datos  (Archivo → Abrir carpeta… / Recargar)");
        });
        return;
    };

    let display = &result.display;
    ui.strong(format!("🔎 Resultados encontrados: {}", display.len()));
    ui.add_space(4.0);

    if display.is_empty() {
        ui.label("Ningún producto coincide con los filtros.");
        return;
    }

    let headers = display.headers();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder().at_least(200.0).clip(true))
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(80.0), 3)
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for h in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, display.len(), |mut row| {
                let rec = &display.rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.monospace(&rec.code);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.description);
                });
                row.col(|ui: &mut Ui| {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                        ui.label(&rec.outlet_price);
                    });
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.brand);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.model);
                });
                row.col(|ui: &mut Ui| {
                    let color = state.category_colors.color_for(&rec.category);
                    ui.label(RichText::new(&rec.category).color(color));
                });
            });
        });
}
