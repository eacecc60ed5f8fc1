use eframe::egui;
use egui::{Pos2, Vec2};

use crate::command::CommandResult;
use crate::config::{CanvasConfig, ToolSettings};
use crate::editor::CanvasEditor;
use crate::element::{ObjectId, ShapeVariant};
use crate::export::ExportedImage;
use crate::file_handler::FileHandler;
use crate::notification::{Notification, NotificationLevel, RecordingSink};
use crate::panels::{central_panel, properties_panel, tools_panel};
use crate::renderer::DocumentRenderer;
use crate::util::time;

const TOAST_SECONDS: f64 = 3.0;

/// What survives a restart: the canvas setup and the tool defaults.
/// Documents are saved explicitly as projects, never implicitly.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct Settings {
    canvas: CanvasConfig,
    tools: ToolSettings,
}

pub(crate) struct Toast {
    pub notification: Notification,
    pub expires_at: f64,
}

/// An object being dragged on the canvas; committed as one move on release
pub(crate) struct DragState {
    pub id: ObjectId,
    pub grab_offset: Vec2,
    pub start: Pos2,
    pub position: Pos2,
}

pub struct StudioApp {
    pub(crate) editor: CanvasEditor,
    pub(crate) tools: ToolSettings,
    pub(crate) renderer: DocumentRenderer,
    pub(crate) drag: Option<DragState>,
    file_handler: FileHandler,
    inbox: RecordingSink,
    toasts: Vec<Toast>,
}

impl Default for StudioApp {
    fn default() -> Self {
        Self::with_settings(CanvasConfig::default(), ToolSettings::default())
    }
}

impl StudioApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(settings.canvas, settings.tools)
    }

    pub fn with_settings(canvas: CanvasConfig, tools: ToolSettings) -> Self {
        let editor = CanvasEditor::new(canvas);
        let inbox = RecordingSink::new();
        editor.subscribe(inbox.clone());
        Self {
            editor,
            tools,
            renderer: DocumentRenderer::new(),
            drag: None,
            file_handler: FileHandler::new(),
            inbox,
            toasts: Vec::new(),
        }
    }

    pub fn editor(&self) -> &CanvasEditor {
        &self.editor
    }

    pub fn add_text(&mut self) {
        let style = self.tools.text_style();
        report(self.editor.add_text(style));
    }

    pub fn add_shape(&mut self, variant: ShapeVariant) {
        let style = self.tools.shape_style();
        report(self.editor.add_shape(variant, style));
    }

    pub fn delete_selected(&mut self) {
        report(self.editor.delete_selected());
    }

    pub fn duplicate_selected(&mut self) {
        report(self.editor.duplicate_selected());
    }

    pub fn clear(&mut self) {
        self.drag = None;
        report(self.editor.clear());
    }

    pub fn undo(&mut self) {
        self.drag = None;
        self.editor.undo();
    }

    pub fn redo(&mut self) {
        self.drag = None;
        self.editor.redo();
    }

    pub fn export(&mut self) {
        if let Ok(exported) = self.editor.export_to_image() {
            save_export(&exported);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if self.file_handler.check_for_dropped_files(ctx) {
            for bytes in self.file_handler.take_image_bytes() {
                self.editor.queue_image(bytes);
            }
        }
        self.file_handler.preview_files_being_dropped(ctx);

        if self.editor.poll_images() > 0 {
            self.renderer.prune_textures(self.editor.document());
        }
        if self.editor.pending_images() > 0 {
            ctx.request_repaint();
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, KeyboardShortcut, Modifiers};

        let redo = KeyboardShortcut::new(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z);
        let undo = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
        let duplicate = KeyboardShortcut::new(Modifiers::COMMAND, Key::D);

        if ctx.input_mut(|i| i.consume_shortcut(&redo)) {
            self.redo();
        } else if ctx.input_mut(|i| i.consume_shortcut(&undo)) {
            self.undo();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&duplicate)) {
            self.duplicate_selected();
        }

        // Text fields own the delete key while focused
        let typing = ctx.memory(|m| m.focused().is_some());
        if !typing && ctx.input(|i| i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace)) {
            self.delete_selected();
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let now = time::current_time_secs();
        self.toasts.extend(self.inbox.drain().into_iter().map(|notification| Toast {
            notification,
            expires_at: now + TOAST_SECONDS,
        }));
        self.toasts.retain(|toast| toast.expires_at > now);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let color = match toast.notification.level {
                        NotificationLevel::Success => egui::Color32::from_rgb(22, 163, 74),
                        NotificationLevel::Info => egui::Color32::from_rgb(37, 99, 235),
                        NotificationLevel::Error => egui::Color32::from_rgb(220, 38, 38),
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, color))
                        .show(ui, |ui| {
                            ui.colored_label(color, &toast.notification.message);
                        });
                }
            });
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

/// Failures were already logged and shown to the user by the editor
fn report(result: CommandResult) {
    if let Err(err) = result {
        log::debug!("Command did not apply: {}", err);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_export(exported: &ExportedImage) {
    let path = std::env::current_dir()
        .unwrap_or_default()
        .join(&exported.file_name);
    match std::fs::write(&path, &exported.png) {
        Ok(()) => log::info!("Wrote {}", path.display()),
        Err(err) => log::error!("Failed to write {}: {}", path.display(), err),
    }
}

#[cfg(target_arch = "wasm32")]
fn save_export(exported: &ExportedImage) {
    log::warn!(
        "Saving {} is not supported in the browser build",
        exported.file_name
    );
}

impl eframe::App for StudioApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = Settings {
            canvas: self.editor.canvas().clone(),
            tools: self.tools.clone(),
        };
        eframe::set_value(storage, eframe::APP_KEY, &settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        tools_panel(self, ctx);
        properties_panel(self, ctx);
        central_panel(self, ctx);

        self.show_toasts(ctx);
    }
}
