use std::io::Cursor;
use std::sync::Arc;

use canvas_studio::command::CommandError;
use canvas_studio::decode::{DecodeError, DecodeFuture, DecodedImage, ImageDecoder};
use canvas_studio::document::Document;
use canvas_studio::editor::CanvasEditor;
use canvas_studio::element::{ObjectKind, TextStyle};
use canvas_studio::notification::{NotificationLevel, RecordingSink};
use canvas_studio::persistence::{PersistenceError, ProjectSnapshot};
use futures::channel::oneshot;
use futures::executor::block_on;
use futures::FutureExt;
use parking_lot::Mutex;

type Resolver = oneshot::Sender<Result<DecodedImage, DecodeError>>;

fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let buffer = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    let mut bytes = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn create_test_editor() -> (CanvasEditor, RecordingSink) {
    let editor = CanvasEditor::default();
    let sink = RecordingSink::new();
    editor.subscribe(sink.clone());
    (editor, sink)
}

/// Decoder whose results the test hands out by hand, in any order
#[derive(Clone, Default)]
struct ManualDecoder {
    pending: Arc<Mutex<Vec<(Arc<Vec<u8>>, Resolver)>>>,
}

impl ManualDecoder {
    /// Finish the decode that was started `index`-th among those still open
    fn resolve(&self, index: usize, width: u32, height: u32) {
        let (bytes, sender) = self.pending.lock().remove(index);
        let _ = sender.send(Ok(DecodedImage {
            bytes,
            width,
            height,
        }));
    }
}

impl ImageDecoder for ManualDecoder {
    fn decode(&self, bytes: Arc<Vec<u8>>) -> DecodeFuture {
        let (sender, receiver) = oneshot::channel();
        self.pending.lock().push((bytes, sender));
        receiver
            .map(|result| result.unwrap_or(Err(DecodeError::Abandoned)))
            .boxed()
    }
}

#[test]
fn test_image_is_scaled_to_half_canvas() {
    let (mut editor, sink) = create_test_editor();
    block_on(editor.add_image(png_bytes(1000, 500, [255, 0, 0, 255]))).unwrap();

    let doc = editor.document();
    assert_eq!(doc.len(), 1);
    let image = doc.selected().unwrap();
    assert_eq!(image.kind(), ObjectKind::Image);

    let size = image.size();
    assert!(size.x <= 400.0);
    assert!(size.y <= 300.0);
    assert!((size.x / size.y - 2.0).abs() < 0.01);
    assert_eq!(image.center(), editor.canvas().center());
    assert_eq!(image.as_image().unwrap().natural_size, [1000, 500]);

    assert_eq!(editor.history_len(), 2);
    assert_eq!(sink.last().unwrap().message, "Image added to canvas");
}

#[test]
fn test_corrupt_image_only_notifies() {
    let (mut editor, sink) = create_test_editor();
    editor.add_text(TextStyle::default()).unwrap();
    let doc = editor.document().clone();
    let len = editor.history_len();
    sink.clear();

    let result = block_on(editor.add_image(b"definitely not a png".to_vec()));

    assert!(matches!(result, Err(CommandError::Decode(_))));
    assert_eq!(editor.document(), &doc);
    assert_eq!(editor.history_len(), len);

    let notifications = sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Error);
    assert!(notifications[0].message.starts_with("Could not load image"));
}

#[test]
fn test_empty_upload_is_silent_noop() {
    let (mut editor, sink) = create_test_editor();

    let result = block_on(editor.add_image(Vec::new()));
    assert!(matches!(result, Err(CommandError::EmptyInput(_))));
    assert!(!editor.queue_image(Vec::new()));

    assert_eq!(editor.history_len(), 1);
    assert_eq!(editor.pending_images(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_late_decode_lands_on_current_document() {
    let decoder = ManualDecoder::default();
    let mut editor = CanvasEditor::default().with_decoder(decoder.clone());

    assert!(editor.queue_image(vec![1, 2, 3]));
    assert_eq!(editor.poll_images(), 0);

    // Other commands commit while the decode is outstanding
    editor.add_text(TextStyle::default()).unwrap();
    assert_eq!(editor.history_len(), 2);

    decoder.resolve(0, 100, 50);
    assert_eq!(editor.poll_images(), 1);
    assert_eq!(editor.pending_images(), 0);

    let kinds: Vec<_> = editor
        .document()
        .objects()
        .iter()
        .map(|obj| obj.kind())
        .collect();
    assert_eq!(kinds, vec![ObjectKind::Text, ObjectKind::Image]);
    assert_eq!(editor.history_len(), 3);

    // Undo removes only the image
    editor.undo();
    assert_eq!(editor.document().len(), 1);
}

#[test]
fn test_decodes_commit_in_completion_order() {
    let decoder = ManualDecoder::default();
    let mut editor = CanvasEditor::default().with_decoder(decoder.clone());

    editor.queue_image(vec![1]);
    editor.queue_image(vec![2]);
    assert_eq!(editor.pending_images(), 2);

    // Second upload finishes first
    decoder.resolve(1, 20, 10);
    assert_eq!(editor.poll_images(), 1);
    decoder.resolve(0, 10, 20);
    assert_eq!(editor.poll_images(), 1);

    let sizes: Vec<_> = editor
        .document()
        .objects()
        .iter()
        .map(|obj| obj.as_image().unwrap().natural_size)
        .collect();
    assert_eq!(sizes, vec![[20, 10], [10, 20]]);
}

#[test]
fn test_abandoned_decode_reports_error() {
    let decoder = ManualDecoder::default();
    let (editor, sink) = create_test_editor();
    let mut editor = editor.with_decoder(decoder.clone());

    editor.queue_image(vec![9, 9, 9]);
    decoder.pending.lock().clear();

    assert_eq!(editor.poll_images(), 1);
    assert!(editor.document().is_empty());
    assert!(sink.last().unwrap().is_error());
}

#[test]
fn test_export_renders_without_touching_history() {
    let (mut editor, sink) = create_test_editor();
    block_on(editor.add_image(png_bytes(1000, 500, [255, 0, 0, 255]))).unwrap();
    let len = editor.history_len();
    let doc = editor.document().clone();

    let exported = editor.export_to_image().unwrap();

    assert_eq!((exported.width, exported.height), (800, 600));
    assert!(exported.file_name.starts_with("canvas-"));
    assert!(exported.file_name.ends_with(".png"));
    assert_eq!(editor.history_len(), len);
    assert_eq!(editor.document(), &doc);
    assert_eq!(sink.last().unwrap().message, "Canvas exported successfully");

    let bitmap = image::load_from_memory(&exported.png).unwrap().to_rgba8();
    assert_eq!(bitmap.get_pixel(400, 300).0, [255, 0, 0, 255]);
    assert_eq!(bitmap.get_pixel(10, 10).0, [255, 255, 255, 255]);
}

#[test]
fn test_project_round_trip() {
    let (mut editor, _sink) = create_test_editor();
    block_on(editor.add_image(png_bytes(40, 20, [0, 0, 255, 255]))).unwrap();
    editor.add_text(TextStyle::default()).unwrap();

    let json = ProjectSnapshot::capture(&editor).to_json().unwrap();
    let restored = ProjectSnapshot::from_json(&json).unwrap().restore().unwrap();

    assert_eq!(restored.document(), editor.document());
    assert_eq!(restored.canvas(), editor.canvas());
    assert_eq!(restored.history_len(), 1);
    assert!(!restored.can_undo());
}

#[test]
fn test_project_with_duplicate_ids_is_rejected() {
    let (mut editor, _sink) = create_test_editor();
    editor.add_text(TextStyle::default()).unwrap();
    let obj = editor.document().objects()[0].as_ref().clone();

    let mut snapshot = ProjectSnapshot::capture(&editor);
    snapshot.document = Document::from_objects(vec![obj.clone(), obj], None);

    assert!(matches!(
        snapshot.restore(),
        Err(PersistenceError::InvalidProject(_))
    ));
}

#[test]
fn test_project_selection_of_missing_object_is_dropped() {
    let (mut editor, _sink) = create_test_editor();
    editor.add_text(TextStyle::default()).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_str(&ProjectSnapshot::capture(&editor).to_json().unwrap()).unwrap();
    json["document"]["selected_id"] = serde_json::json!("00000000-0000-0000-0000-000000000001");
    let snapshot = ProjectSnapshot::from_json(&json.to_string()).unwrap();
    assert!(snapshot.document.selected_id().is_some());

    let mut restored = snapshot.restore().unwrap();
    let sink = RecordingSink::new();
    restored.subscribe(sink.clone());
    assert!(restored.document().selected_id().is_none());

    restored.delete_selected().unwrap();
    assert_eq!(restored.history_len(), 1);
    assert_eq!(restored.document().len(), 1);
    assert!(sink.is_empty());
}

#[test]
fn test_project_font_sizes_are_clamped_on_restore() {
    let (mut editor, _sink) = create_test_editor();
    editor.add_text(TextStyle::default()).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_str(&ProjectSnapshot::capture(&editor).to_json().unwrap()).unwrap();
    json["document"]["objects"][0]["payload"]["font_size"] = serde_json::json!(200.0);

    let restored = ProjectSnapshot::from_json(&json.to_string())
        .unwrap()
        .restore()
        .unwrap();
    let font_size = restored.document().objects()[0].as_text().unwrap().font_size;
    assert_eq!(font_size, 72.0);
}

#[test]
fn test_project_with_unusable_canvas_gets_default_size() {
    let (editor, _sink) = create_test_editor();
    let mut snapshot = ProjectSnapshot::capture(&editor);
    snapshot.canvas.width = 0.0;
    snapshot.canvas.height = -10.0;

    let mut restored = snapshot.restore().unwrap();
    assert_eq!(restored.canvas().width, 800.0);
    assert_eq!(restored.canvas().height, 600.0);

    block_on(restored.add_image(png_bytes(1000, 500, [0, 255, 0, 255]))).unwrap();
    let size = restored.document().selected().unwrap().size();
    assert!(size.x > 0.0 && size.y > 0.0);
}
