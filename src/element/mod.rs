use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) mod common;
pub(crate) mod image;
pub(crate) mod shape;
pub(crate) mod text;

pub use common::{
    clamp_font_size, fit_within, rotate_about, DUPLICATE_OFFSET, IMAGE_MAX_CANVAS_FRACTION,
    MAX_FONT_SIZE, MIN_FONT_SIZE, SHAPE_BOX_SIZE, TEXT_BOX_SIZE,
};
pub(crate) use common::validate_size;
pub use self::image::{ImageData, ImageSource};
pub use shape::{ShapeData, ShapeStyle, ShapeVariant};
pub use text::{FontWeight, TextAlign, TextData, TextStyle};

/// Object identifier, unique within a document snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminant of the payload carried by an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Image,
    Text,
    Shape,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Image => "image",
            ObjectKind::Text => "text",
            ObjectKind::Shape => "shape",
        }
    }
}

/// Kind-specific data of a canvas object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Image(ImageData),
    Text(TextData),
    Shape(ShapeData),
}

/// A single placed element on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    id: ObjectId,
    /// Top-left corner in document space
    pub position: Pos2,
    /// Width and height, both positive
    size: Vec2,
    /// Degrees around the box center, stored as entered
    pub rotation: f32,
    pub payload: Payload,
}

impl CanvasObject {
    fn new(position: Pos2, size: Vec2, payload: Payload) -> Self {
        Self {
            id: ObjectId::new(),
            position,
            size,
            rotation: 0.0,
            payload,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        match &self.payload {
            Payload::Image(_) => ObjectKind::Image,
            Payload::Text(_) => ObjectKind::Text,
            Payload::Shape(_) => ObjectKind::Shape,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize the object, rejecting non-positive dimensions
    pub fn set_size(&mut self, size: Vec2) -> Result<(), String> {
        common::validate_size(size)?;
        self.size = size;
        Ok(())
    }

    /// Unrotated bounding box
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    /// Corners of the box after rotation: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Pos2; 4] {
        let rect = self.rect();
        let center = rect.center();
        [
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ]
        .map(|corner| rotate_about(corner, center, self.rotation))
    }

    /// Test if the rotated box contains the given document position
    pub fn hit_test(&self, pos: Pos2) -> bool {
        let local = rotate_about(pos, self.center(), -self.rotation);
        self.rect().contains(local)
    }

    /// A copy carrying a fresh id, shifted by `offset`
    pub fn duplicate(&self, offset: Vec2) -> Self {
        Self {
            id: ObjectId::new(),
            position: self.position + offset,
            ..self.clone()
        }
    }

    /// Name shown in the layers list
    pub fn label(&self, index: usize) -> String {
        match &self.payload {
            Payload::Text(text) => text.content.clone(),
            _ => format!("{} {}", self.kind().name(), index + 1),
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeData> {
        match &self.payload {
            Payload::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match &self.payload {
            Payload::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Factory functions for creating objects.
///
/// All constructors assign a fresh id. Callers validate their inputs.
pub mod factory {
    use super::*;

    /// Text object with the default content, centered on `center`
    pub fn create_text(center: Pos2, size: Vec2, style: &TextStyle) -> CanvasObject {
        CanvasObject::new(
            common::top_left_for_center(center, size),
            size,
            Payload::Text(TextData::new(TextData::DEFAULT_CONTENT, style)),
        )
    }

    /// Shape object of the requested variant, centered on `center`
    pub fn create_shape(
        variant: ShapeVariant,
        center: Pos2,
        size: Vec2,
        style: &ShapeStyle,
    ) -> CanvasObject {
        CanvasObject::new(
            common::top_left_for_center(center, size),
            size,
            Payload::Shape(ShapeData::new(variant, style)),
        )
    }

    /// Image object whose natural size is scaled down to fit `max_bounds`
    pub fn create_image(
        center: Pos2,
        natural_size: [u32; 2],
        max_bounds: Vec2,
        source: ImageSource,
    ) -> CanvasObject {
        let natural = Vec2::new(natural_size[0] as f32, natural_size[1] as f32);
        let size = fit_within(natural, max_bounds);
        CanvasObject::new(
            common::top_left_for_center(center, size),
            size,
            Payload::Image(ImageData::new(source, natural_size)),
        )
    }
}
