use std::ops::RangeInclusive;

use eframe::egui;

use crate::command::ObjectEdit;
use crate::element::{Payload, MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::StudioApp;

pub fn properties_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::SidePanel::right("properties_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                canvas_section(app, ui);
                ui.separator();
                tool_defaults_section(app, ui);
                ui.separator();
                selection_section(app, ui);
                ui.separator();
                layers_section(app, ui);
            });
        });
}

fn canvas_section(app: &mut StudioApp, ui: &mut egui::Ui) {
    ui.heading("Canvas");
    let canvas = app.editor.canvas();
    ui.label(format!("{} × {}", canvas.width, canvas.height));

    let mut background = canvas.background;
    ui.horizontal(|ui| {
        ui.label("Background");
        if ui.color_edit_button_srgba(&mut background).changed() {
            app.editor.set_background(background);
        }
    });
}

fn tool_defaults_section(app: &mut StudioApp, ui: &mut egui::Ui) {
    ui.heading("New Objects");
    let tools = &mut app.tools;

    let mut text_size = tools.text_size();
    ui.horizontal(|ui| {
        ui.label("Text size");
        if ui
            .add(egui::DragValue::new(&mut text_size).range(MIN_FONT_SIZE..=MAX_FONT_SIZE))
            .changed()
        {
            tools.set_text_size(text_size);
        }
    });
    ui.horizontal(|ui| {
        ui.label("Text color");
        ui.color_edit_button_srgba(&mut tools.text_color);
    });
    ui.horizontal(|ui| {
        ui.label("Fill");
        ui.color_edit_button_srgba(&mut tools.shape_fill);
    });
    ui.horizontal(|ui| {
        ui.label("Stroke");
        ui.color_edit_button_srgba(&mut tools.shape_stroke);
        ui.add(egui::DragValue::new(&mut tools.stroke_width).range(0.0..=20.0));
    });
}

fn selection_section(app: &mut StudioApp, ui: &mut egui::Ui) {
    ui.heading("Selection");
    let Some(selected) = app.editor.document().selected().cloned() else {
        ui.label("Nothing selected");
        return;
    };
    ui.label(selected.kind().name());

    let mut edits = Vec::new();

    if let Some(angle) = committed_drag_value(ui, "Rotation", selected.rotation, -360.0..=360.0) {
        edits.push(ObjectEdit::Rotate(angle));
    }

    match &selected.payload {
        Payload::Text(text) => {
            let id = ui.make_persistent_id(("text_content", selected.id()));
            let mut content = ui
                .data(|d| d.get_temp::<String>(id))
                .unwrap_or_else(|| text.content.clone());
            let response = ui.text_edit_singleline(&mut content);
            if response.changed() {
                ui.data_mut(|d| d.insert_temp(id, content.clone()));
            }
            if response.lost_focus() {
                ui.data_mut(|d| d.remove::<String>(id));
                if content != text.content {
                    edits.push(ObjectEdit::SetText(content));
                }
            }

            if let Some(size) =
                committed_drag_value(ui, "Font size", text.font_size, MIN_FONT_SIZE..=MAX_FONT_SIZE)
            {
                edits.push(ObjectEdit::SetFontSize(size));
            }

            let mut color = text.color;
            ui.horizontal(|ui| {
                ui.label("Color");
                if ui.color_edit_button_srgba(&mut color).changed() {
                    edits.push(ObjectEdit::SetTextColor(color));
                }
            });
        }
        Payload::Shape(shape) => {
            let mut fill = shape.fill;
            let mut stroke = shape.stroke;
            ui.horizontal(|ui| {
                ui.label("Fill");
                if ui.color_edit_button_srgba(&mut fill).changed() {
                    edits.push(ObjectEdit::SetFill(fill));
                }
            });
            ui.horizontal(|ui| {
                ui.label("Stroke");
                if ui.color_edit_button_srgba(&mut stroke).changed() {
                    edits.push(ObjectEdit::SetStroke(stroke));
                }
            });
            if let Some(width) =
                committed_drag_value(ui, "Stroke width", shape.stroke_width, 0.0..=20.0)
            {
                edits.push(ObjectEdit::SetStrokeWidth(width));
            }
        }
        Payload::Image(image) => {
            let [width, height] = image.natural_size;
            ui.label(format!("Source: {width} × {height} px"));
        }
    }

    for edit in edits {
        if let Err(err) = app.editor.edit_selected(edit) {
            log::debug!("Edit did not apply: {}", err);
        }
    }
}

fn layers_section(app: &mut StudioApp, ui: &mut egui::Ui) {
    ui.heading("Layers");
    let layers = app.editor.layers();
    if layers.is_empty() {
        ui.label("No objects yet");
        return;
    }
    // Topmost first, the way layer lists usually read
    for layer in layers.iter().rev() {
        if ui.selectable_label(layer.selected, &layer.label).clicked() {
            app.editor.select(layer.id);
        }
    }
}

/// A drag value that reports one change when the drag ends, so a drag
/// becomes a single history entry
fn committed_drag_value(
    ui: &mut egui::Ui,
    label: &str,
    current: f32,
    range: RangeInclusive<f32>,
) -> Option<f32> {
    let id = ui.make_persistent_id(label);
    let mut value = ui.data(|d| d.get_temp::<f32>(id)).unwrap_or(current);
    let response = ui
        .horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(&mut value).range(range))
        })
        .inner;

    if response.dragged() {
        ui.data_mut(|d| d.insert_temp(id, value));
        return None;
    }
    ui.data_mut(|d| d.remove::<f32>(id));
    (value != current).then_some(value)
}
