#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod decode;
pub mod document;
pub mod editor;
pub mod element;
pub mod export;
pub mod file_handler;
pub mod notification;
pub mod panels;
pub mod persistence;
pub mod renderer;
pub mod texture_manager;
pub mod util;

pub use app::StudioApp;
pub use command::{Command, CommandError, History, ObjectEdit};
pub use config::{CanvasConfig, ToolSettings};
pub use decode::{DecodedImage, ImageDecoder, RasterDecoder};
pub use document::Document;
pub use editor::CanvasEditor;
pub use element::{CanvasObject, ObjectId};
pub use export::{ExportedImage, RasterSurface, RenderSurface};
pub use notification::{Notification, NotificationLevel, RecordingSink};
pub use persistence::ProjectSnapshot;
pub use renderer::DocumentRenderer;
