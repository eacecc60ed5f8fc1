use egui::{Color32, Pos2, Vec2};

use super::CommandError;
use crate::config::CanvasConfig;
use crate::decode::DecodedImage;
use crate::document::Document;
use crate::element::{
    self, clamp_font_size, factory, CanvasObject, ImageSource, Payload, ShapeStyle, ShapeVariant,
    TextStyle,
};

/// A property change applied to the selected object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEdit {
    MoveTo(Pos2),
    Resize(Vec2),
    Rotate(f32),
    SetText(String),
    SetFontSize(f32),
    SetTextColor(Color32),
    SetFill(Color32),
    SetStroke(Color32),
    SetStrokeWidth(f32),
}

impl ObjectEdit {
    /// Produce the edited copy of `obj`, or an error if the edit does not fit it
    fn apply_to(&self, obj: &CanvasObject) -> Result<CanvasObject, CommandError> {
        let mut edited = obj.clone();
        match self {
            ObjectEdit::MoveTo(pos) => {
                edited.position = *pos;
                return Ok(edited);
            }
            ObjectEdit::Resize(size) => {
                edited
                    .set_size(*size)
                    .map_err(CommandError::InvalidParameters)?;
                return Ok(edited);
            }
            ObjectEdit::Rotate(degrees) => {
                if !degrees.is_finite() {
                    return Err(CommandError::InvalidParameters(format!(
                        "Rotation must be finite, got {degrees}"
                    )));
                }
                edited.rotation = *degrees;
                return Ok(edited);
            }
            _ => {}
        }

        match (self, &mut edited.payload) {
            (ObjectEdit::SetText(content), Payload::Text(text)) => text.content = content.clone(),
            (ObjectEdit::SetFontSize(size), Payload::Text(text)) => {
                text.font_size = clamp_font_size(*size);
            }
            (ObjectEdit::SetTextColor(color), Payload::Text(text)) => text.color = *color,
            (ObjectEdit::SetFill(color), Payload::Shape(shape)) => shape.fill = *color,
            (ObjectEdit::SetStroke(color), Payload::Shape(shape)) => shape.stroke = *color,
            (ObjectEdit::SetStrokeWidth(width), Payload::Shape(shape)) => {
                if !(width.is_finite() && *width >= 0.0) {
                    return Err(CommandError::InvalidParameters(format!(
                        "Stroke width must be non-negative, got {width}"
                    )));
                }
                shape.stroke_width = *width;
            }
            (edit, _) => {
                return Err(CommandError::InvalidParameters(format!(
                    "{edit:?} does not apply to a {} object",
                    obj.kind().name()
                )));
            }
        }
        Ok(edited)
    }
}

/// Mutations the editor records in its history
#[derive(Debug, Clone)]
pub enum Command {
    AddText { style: TextStyle },
    AddShape { variant: ShapeVariant, style: ShapeStyle },
    AddImage { image: DecodedImage },
    DeleteSelected,
    DuplicateSelected,
    Clear,
    EditSelected(ObjectEdit),
}

impl Command {
    /// Compute the document this command produces from `document`.
    ///
    /// `Ok(None)` means the command is a guarded no-op (nothing selected)
    /// and must not be recorded.
    pub fn apply(
        &self,
        document: &Document,
        canvas: &CanvasConfig,
    ) -> Result<Option<Document>, CommandError> {
        match self {
            Command::AddText { style } => {
                let obj = factory::create_text(canvas.center(), element::TEXT_BOX_SIZE, style);
                Ok(Some(document.with_appended(obj)))
            }

            Command::AddShape { variant, style } => {
                let obj = factory::create_shape(
                    *variant,
                    canvas.center(),
                    element::SHAPE_BOX_SIZE,
                    style,
                );
                Ok(Some(document.with_appended(obj)))
            }

            Command::AddImage { image } => {
                if image.width == 0 || image.height == 0 {
                    return Err(CommandError::InvalidParameters(format!(
                        "Image has no pixels: {}x{}",
                        image.width, image.height
                    )));
                }
                let obj = factory::create_image(
                    canvas.center(),
                    [image.width, image.height],
                    canvas.max_image_size(),
                    ImageSource::Embedded(image.bytes.clone()),
                );
                element::validate_size(obj.size()).map_err(CommandError::InvalidParameters)?;
                Ok(Some(document.with_appended(obj)))
            }

            Command::DeleteSelected => Ok(document
                .selected()
                .map(|obj| document.with_removed(obj.id()))),

            Command::DuplicateSelected => Ok(document.selected().map(|obj| {
                let copy = obj.duplicate(element::DUPLICATE_OFFSET);
                document.with_appended(copy)
            })),

            // Always recorded, even when the document is already empty
            Command::Clear => Ok(Some(document.cleared())),

            Command::EditSelected(edit) => {
                let Some(obj) = document.selected() else {
                    return Ok(None);
                };
                let edited = edit.apply_to(obj)?;
                Ok(Some(document.with_replaced(obj.id(), edited)))
            }
        }
    }

    /// Message shown after the command was recorded
    pub fn success_message(&self) -> String {
        match self {
            Command::AddText { .. } => "Text added to canvas".to_owned(),
            Command::AddShape { variant, .. } => format!("{variant} added to canvas"),
            Command::AddImage { .. } => "Image added to canvas".to_owned(),
            Command::DeleteSelected => "Object deleted".to_owned(),
            Command::DuplicateSelected => "Object duplicated".to_owned(),
            Command::Clear => "Canvas cleared".to_owned(),
            Command::EditSelected(_) => "Object updated".to_owned(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::AddText { .. } => "AddText",
            Command::AddShape { .. } => "AddShape",
            Command::AddImage { .. } => "AddImage",
            Command::DeleteSelected => "DeleteSelected",
            Command::DuplicateSelected => "DuplicateSelected",
            Command::Clear => "Clear",
            Command::EditSelected(_) => "EditSelected",
        }
    }
}
