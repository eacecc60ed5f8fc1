use eframe::egui;

use crate::app::DragState;
use crate::command::ObjectEdit;
use crate::renderer::CanvasView;
use crate::StudioApp;

const CANVAS_MARGIN: f32 = 16.0;

pub fn central_panel(app: &mut StudioApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::central_panel(&ctx.style()).fill(egui::Color32::from_gray(64)))
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let view = CanvasView::fit(
                response.rect.shrink(CANVAS_MARGIN),
                app.editor.canvas().size(),
            );

            handle_pointer(app, &response, view);

            // While dragging, paint the moved object without touching history
            let document = match &app.drag {
                Some(drag) => match app.editor.document().get(drag.id) {
                    Some(obj) => {
                        let mut moved = obj.clone();
                        moved.position = drag.position;
                        app.editor.document().with_replaced(drag.id, moved)
                    }
                    None => app.editor.document().clone(),
                },
                None => app.editor.document().clone(),
            };

            let canvas = app.editor.canvas().clone();
            app.renderer.paint(ctx, &painter, view, &document, &canvas);
        });
}

fn handle_pointer(app: &mut StudioApp, response: &egui::Response, view: CanvasView) {
    let pointer = response
        .interact_pointer_pos()
        .map(|pos| view.to_document(pos));

    if response.drag_started() {
        if let Some(pos) = pointer {
            app.drag = app.editor.select_at(pos).and_then(|id| {
                let obj = app.editor.document().get(id)?;
                Some(DragState {
                    id,
                    grab_offset: pos - obj.position,
                    start: obj.position,
                    position: obj.position,
                })
            });
        }
    } else if response.clicked() {
        if let Some(pos) = pointer {
            app.editor.select_at(pos);
        }
    }

    if response.dragged() {
        if let (Some(drag), Some(pos)) = (app.drag.as_mut(), pointer) {
            drag.position = pos - drag.grab_offset;
        }
    }

    if response.drag_stopped() {
        if let Some(drag) = app.drag.take() {
            if drag.position != drag.start {
                log::debug!("Moving {} to {:?}", drag.id, drag.position);
                if let Err(err) = app.editor.edit_selected(ObjectEdit::MoveTo(drag.position)) {
                    log::debug!("Move did not apply: {}", err);
                }
            }
        }
    }
}
