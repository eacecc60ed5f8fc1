use eframe::egui;

/// Collects image files dropped onto the window and reads their bytes
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check for newly dropped files.
    /// Returns true if any arrived this frame
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if i.raw.dropped_files.is_empty() {
                false
            } else {
                self.dropped_files = i.raw.dropped_files.clone();
                true
            }
        })
    }

    /// Read the bytes of every dropped image file, skipping anything else
    pub fn take_image_bytes(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.dropped_files)
            .into_iter()
            .filter_map(|file| {
                let file_name = display_name(&file);
                if !is_image_file(&file) {
                    log::warn!("Dropped file is not a supported type: {}", file_name);
                    return None;
                }
                read_bytes(&file, &file_name)
            })
            .collect()
    }

    /// Highlight the window while files are dragged over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if !hovering {
            return;
        }

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("file_drop_target"),
        ));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(160));
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "Drop image to add it to the canvas",
            egui::TextStyle::Heading.resolve(&ctx.style()),
            egui::Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_ref()
        .and_then(|path| path.extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .or_else(|| {
            file.name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
        });
    matches!(
        name.as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    )
}

fn read_bytes(file: &egui::DroppedFile, file_name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        log::info!("Reading image from memory: {} ({} bytes)", file_name, bytes.len());
        return Some(bytes.to_vec());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        return match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::error!("Failed to read image file: {}: {}", path.display(), err);
                None
            }
        };
    }

    log::warn!("Dropped file has no accessible data: {}", file_name);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_detection() {
        let png = egui::DroppedFile {
            name: "photo.PNG".to_owned(),
            ..Default::default()
        };
        let text = egui::DroppedFile {
            name: "notes.txt".to_owned(),
            ..Default::default()
        };
        let by_mime = egui::DroppedFile {
            mime: "image/webp".to_owned(),
            ..Default::default()
        };
        assert!(is_image_file(&png));
        assert!(!is_image_file(&text));
        assert!(is_image_file(&by_mime));
    }

    #[test]
    fn test_take_image_bytes_skips_other_files() {
        let mut handler = FileHandler::new();
        handler.dropped_files = vec![
            egui::DroppedFile {
                name: "a.png".to_owned(),
                bytes: Some(vec![1u8, 2, 3].into()),
                ..Default::default()
            },
            egui::DroppedFile {
                name: "b.txt".to_owned(),
                bytes: Some(vec![4u8].into()),
                ..Default::default()
            },
        ];

        assert_eq!(handler.take_image_bytes(), vec![vec![1, 2, 3]]);
        assert!(handler.take_image_bytes().is_empty());
    }
}
