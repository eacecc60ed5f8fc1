use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::CanvasConfig;
use crate::document::Document;
use crate::editor::CanvasEditor;
use crate::element::{clamp_font_size, Payload};
use crate::util::time;

/// Errors that can occur while saving or loading a project
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize project: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to access project file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid project data: {0}")]
    InvalidProject(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A saved canvas project: the current document and the canvas it was drawn on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub document: Document,
    pub canvas: CanvasConfig,
    /// Timestamp of when the snapshot was taken
    pub timestamp: u64,
    /// Version of the application when the snapshot was taken
    pub version: String,
}

impl ProjectSnapshot {
    /// Capture the editor's current document. History is not saved.
    pub fn capture(editor: &CanvasEditor) -> Self {
        Self {
            document: editor.document().clone(),
            canvas: editor.canvas().clone(),
            timestamp: time::timestamp_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Start a fresh editing session on this snapshot
    pub fn restore(self) -> PersistenceResult<CanvasEditor> {
        if self.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Project version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        self.validate()?;

        let document = Self::normalized(&self.document);
        let mut editor = CanvasEditor::new(self.canvas);
        editor.load_document(document);
        Ok(editor)
    }

    /// Font sizes clamped into range and a selection of a missing object dropped,
    /// since saved files never went through the editing commands
    fn normalized(document: &Document) -> Document {
        let objects = document
            .objects()
            .iter()
            .map(|obj| {
                let mut obj = obj.as_ref().clone();
                if let Payload::Text(text) = &mut obj.payload {
                    text.font_size = clamp_font_size(text.font_size);
                }
                obj
            })
            .collect();
        Document::from_objects(objects, document.selected_id())
    }

    fn validate(&self) -> PersistenceResult<()> {
        let objects = self.document.objects();
        for (index, obj) in objects.iter().enumerate() {
            let size = obj.size();
            if !(size.x > 0.0 && size.y > 0.0) {
                return Err(PersistenceError::InvalidProject(format!(
                    "object {} has non-positive size {:?}",
                    obj.id(),
                    size
                )));
            }
            if objects[..index].iter().any(|other| other.id() == obj.id()) {
                return Err(PersistenceError::InvalidProject(format!(
                    "duplicate object id {}",
                    obj.id()
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> PersistenceResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_json()?)?;
        log::info!("Saved project to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> PersistenceResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
