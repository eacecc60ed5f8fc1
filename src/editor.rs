//! The editing session: one document, its history, and the commands that
//! change them.
//!
//! Every mutation goes through [`CanvasEditor::execute`], which computes the
//! next document from the current one, records it in the [`History`], and
//! emits a notification. Nothing here panics or propagates past the session:
//! a rejected command leaves document and history as they were and tells
//! the user why.

use std::sync::Arc;

use egui::{Color32, Pos2};
use futures::task::{noop_waker_ref, Context, Poll};
use futures::FutureExt;

use crate::command::{Command, CommandError, CommandResult, History, ObjectEdit};
use crate::config::CanvasConfig;
use crate::decode::{DecodeError, DecodeFuture, DecodedImage, ImageDecoder, RasterDecoder};
use crate::document::Document;
use crate::element::{ObjectId, ShapeStyle, ShapeVariant, TextStyle};
use crate::export::{ExportedImage, RasterSurface, RenderSurface};
use crate::notification::{Notification, NotificationBus, NotificationSink};

/// One row of the layers list, in paint order
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEntry {
    pub id: ObjectId,
    pub label: String,
    pub selected: bool,
}

pub struct CanvasEditor {
    canvas: CanvasConfig,
    history: History,
    notifications: NotificationBus,
    decoder: Arc<dyn ImageDecoder>,
    surface: Box<dyn RenderSurface>,
    /// Image decodes that have not resolved yet, committed as they finish
    pending_images: Vec<DecodeFuture>,
}

impl std::fmt::Debug for CanvasEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEditor")
            .field("canvas", &self.canvas)
            .field("history_len", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("pending_images", &self.pending_images.len())
            .finish()
    }
}

impl Default for CanvasEditor {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasEditor {
    /// Start a session on an empty canvas
    pub fn new(canvas: CanvasConfig) -> Self {
        let canvas = canvas.sanitized();
        let history = History::new().with_limit(canvas.history_limit);
        Self {
            canvas,
            history,
            notifications: NotificationBus::new(),
            decoder: Arc::new(RasterDecoder),
            surface: Box::new(RasterSurface),
            pending_images: Vec::new(),
        }
    }

    pub fn with_decoder(mut self, decoder: impl ImageDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    /// Subscribe a sink to the status messages emitted after each command
    pub fn subscribe(&self, sink: impl NotificationSink + 'static) {
        self.notifications.subscribe(Box::new(sink));
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn set_background(&mut self, color: Color32) {
        self.canvas.background = color;
    }

    pub fn document(&self) -> &Document {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the session with `document` as the only history entry
    pub fn load_document(&mut self, document: Document) {
        log::info!("Loading document with {} objects", document.len());
        self.history = History::starting_at(document).with_limit(self.canvas.history_limit);
    }

    /// Run a command against the current document and record the result
    pub fn execute(&mut self, command: Command) -> CommandResult {
        match command.apply(self.document(), &self.canvas) {
            Ok(Some(next)) => {
                self.history.push(next);
                log::info!(
                    "{} committed: {} objects, history {}/{}",
                    command.name(),
                    self.document().len(),
                    self.history.cursor() + 1,
                    self.history.len()
                );
                self.notifications
                    .emit(Notification::success(command.success_message()));
                Ok(())
            }
            Ok(None) => {
                log::debug!("{} skipped: nothing selected", command.name());
                Ok(())
            }
            Err(err) => {
                log::warn!("{} rejected: {}", command.name(), err);
                self.notifications.emit(Notification::error(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn add_text(&mut self, style: TextStyle) -> CommandResult {
        self.execute(Command::AddText { style })
    }

    pub fn add_shape(&mut self, variant: ShapeVariant, style: ShapeStyle) -> CommandResult {
        self.execute(Command::AddShape { variant, style })
    }

    pub fn delete_selected(&mut self) -> CommandResult {
        self.execute(Command::DeleteSelected)
    }

    pub fn duplicate_selected(&mut self) -> CommandResult {
        self.execute(Command::DuplicateSelected)
    }

    pub fn clear(&mut self) -> CommandResult {
        self.execute(Command::Clear)
    }

    pub fn edit_selected(&mut self, edit: ObjectEdit) -> CommandResult {
        self.execute(Command::EditSelected(edit))
    }

    /// Decode `bytes` and place the image on the canvas.
    ///
    /// Holding the editor across the decode means nothing else can commit
    /// meanwhile; UI code that must stay responsive uses [`Self::queue_image`].
    pub async fn add_image(&mut self, bytes: Vec<u8>) -> CommandResult {
        let decode = self.start_decode(bytes)?;
        let result = decode.await;
        self.commit_decoded(result)
    }

    /// Start decoding `bytes` in the background; returns false for an empty upload.
    ///
    /// The image is committed by a later [`Self::poll_images`] call, on top of
    /// whatever the document is at that moment.
    pub fn queue_image(&mut self, bytes: Vec<u8>) -> bool {
        match self.start_decode(bytes) {
            Ok(decode) => {
                self.pending_images.push(decode);
                true
            }
            Err(_) => false,
        }
    }

    pub fn pending_images(&self) -> usize {
        self.pending_images.len()
    }

    /// Commit every queued decode that has finished, in completion order.
    ///
    /// Returns how many decodes resolved, successfully or not.
    pub fn poll_images(&mut self) -> usize {
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut finished = Vec::new();
        self.pending_images
            .retain_mut(|decode| match decode.poll_unpin(&mut cx) {
                Poll::Ready(result) => {
                    finished.push(result);
                    false
                }
                Poll::Pending => true,
            });

        let resolved = finished.len();
        for result in finished {
            // Failures were already reported to the user
            let _ = self.commit_decoded(result);
        }
        resolved
    }

    fn start_decode(&self, bytes: Vec<u8>) -> Result<DecodeFuture, CommandError> {
        if bytes.is_empty() {
            log::warn!("Image upload ignored: no data");
            return Err(CommandError::EmptyInput("image upload"));
        }
        log::info!("Decoding uploaded image ({} bytes)", bytes.len());
        Ok(self.decoder.decode(Arc::new(bytes)))
    }

    fn commit_decoded(&mut self, result: Result<DecodedImage, DecodeError>) -> CommandResult {
        match result {
            Ok(image) => self.execute(Command::AddImage { image }),
            Err(err) => {
                log::warn!("Image upload failed: {}", err);
                self.notifications
                    .emit(Notification::error(format!("Could not load image: {err}")));
                Err(err.into())
            }
        }
    }

    /// Change the selection without recording a history entry.
    ///
    /// Unknown ids are ignored.
    pub fn select(&mut self, id: ObjectId) {
        if !self.document().contains(id) || self.document().selected_id() == Some(id) {
            return;
        }
        let selected = self.document().with_selection(Some(id));
        self.history.replace_current(selected);
    }

    pub fn clear_selection(&mut self) {
        if self.document().selected_id().is_none() {
            return;
        }
        let cleared = self.document().with_selection(None);
        self.history.replace_current(cleared);
    }

    /// Select the topmost object under `pos`, or clear the selection
    pub fn select_at(&mut self, pos: Pos2) -> Option<ObjectId> {
        let hit = self.document().object_at(pos).map(|obj| obj.id());
        match hit {
            Some(id) => self.select(id),
            None => self.clear_selection(),
        }
        hit
    }

    pub fn undo(&mut self) {
        if self.history.undo().is_some() {
            self.notifications
                .emit(Notification::success("Undid last action"));
        } else {
            self.notifications.emit(Notification::info("Nothing to undo"));
        }
    }

    pub fn redo(&mut self) {
        if self.history.redo().is_some() {
            self.notifications.emit(Notification::success("Redid action"));
        } else {
            self.notifications.emit(Notification::info("Nothing to redo"));
        }
    }

    /// Render the current document to an encoded bitmap.
    ///
    /// Reads the document only; history is untouched.
    pub fn export_to_image(&self) -> Result<ExportedImage, CommandError> {
        match self.surface.export(self.document(), &self.canvas) {
            Ok(exported) => {
                log::info!(
                    "Exported {}x{} canvas as {} ({} bytes)",
                    exported.width,
                    exported.height,
                    exported.file_name,
                    exported.png.len()
                );
                self.notifications
                    .emit(Notification::success("Canvas exported successfully"));
                Ok(exported)
            }
            Err(err) => {
                log::error!("Export failed: {}", err);
                self.notifications
                    .emit(Notification::error(format!("Export failed: {err}")));
                Err(err.into())
            }
        }
    }

    pub fn layers(&self) -> Vec<LayerEntry> {
        let document = self.document();
        let selected = document.selected_id();
        document
            .objects()
            .iter()
            .enumerate()
            .map(|(index, obj)| LayerEntry {
                id: obj.id(),
                label: obj.label(index),
                selected: selected == Some(obj.id()),
            })
            .collect()
    }
}
