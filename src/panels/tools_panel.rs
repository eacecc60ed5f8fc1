use eframe::egui;

use crate::element::ShapeVariant;
use crate::StudioApp;

pub fn tools_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            if ui.button("Add Text").clicked() {
                app.add_text();
            }
            for variant in ShapeVariant::ALL {
                let label = format!("Add {}", capitalized(variant.name()));
                if ui.button(label).clicked() {
                    app.add_shape(variant);
                }
            }
            ui.label("Drop an image file onto the window to add it");
            if app.editor.pending_images() > 0 {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading image…");
                });
            }

            ui.separator();

            // Undo/Redo section
            ui.horizontal(|ui| {
                let can_undo = app.editor.can_undo();
                let can_redo = app.editor.can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
            });
            ui.label(format!(
                "History: {} of {}",
                app.editor.history_cursor() + 1,
                app.editor.history_len()
            ));

            ui.separator();

            let has_selection = app.editor.document().selected_id().is_some();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(has_selection, egui::Button::new("Duplicate"))
                    .clicked()
                {
                    app.duplicate_selected();
                }
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete"))
                    .clicked()
                {
                    app.delete_selected();
                }
            });

            ui.separator();

            if ui.button("Export PNG").clicked() {
                app.export();
            }
            if ui.button("Clear Canvas").clicked() {
                app.clear();
            }
        });
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
