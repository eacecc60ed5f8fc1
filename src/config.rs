use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::{
    clamp_font_size, FontWeight, ShapeStyle, TextAlign, TextStyle, IMAGE_MAX_CANVAS_FRACTION,
};

/// Canvas the editor draws on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub background: Color32,
    /// Maximum number of history snapshots kept; `None` keeps all of them
    pub history_limit: Option<usize>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: Color32::WHITE,
            history_limit: None,
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Replace a width or height that cannot be drawn on with the default
    pub fn sanitized(mut self) -> Self {
        let default = Self::default();
        if !(self.width.is_finite() && self.width > 0.0) {
            log::warn!("Invalid canvas width {}, using {}", self.width, default.width);
            self.width = default.width;
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            log::warn!("Invalid canvas height {}, using {}", self.height, default.height);
            self.height = default.height;
        }
        self
    }

    /// Largest box a freshly imported image may occupy
    pub fn max_image_size(&self) -> Vec2 {
        self.size() * IMAGE_MAX_CANVAS_FRACTION
    }
}

/// Current tool defaults, turned into explicit styles for each new object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    text_size: f32,
    pub text_color: Color32,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
    pub shape_fill: Color32,
    pub shape_stroke: Color32,
    pub stroke_width: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        let text = TextStyle::default();
        let shape = ShapeStyle::default();
        Self {
            text_size: text.font_size,
            text_color: text.color,
            font_family: text.font_family,
            font_weight: text.weight,
            text_align: text.align,
            shape_fill: shape.fill,
            shape_stroke: shape.stroke,
            stroke_width: shape.stroke_width,
        }
    }
}

impl ToolSettings {
    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    /// Set the text size, clamped to the supported font range
    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = clamp_font_size(size);
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: clamp_font_size(self.text_size),
            color: self.text_color,
            font_family: self.font_family.clone(),
            weight: self.font_weight,
            align: self.text_align,
        }
    }

    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill: self.shape_fill,
            stroke: self.shape_stroke,
            stroke_width: self.stroke_width.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_defaults() {
        let canvas = CanvasConfig::default();
        assert_eq!(canvas.center(), Pos2::new(400.0, 300.0));
        assert_eq!(canvas.max_image_size(), Vec2::new(400.0, 300.0));
        assert!(canvas.history_limit.is_none());
    }

    #[test]
    fn test_unusable_canvas_size_falls_back_to_default() {
        let canvas: CanvasConfig =
            serde_json::from_str(r#"{"width": 0.0, "height": -5.0}"#).unwrap();
        let canvas = canvas.sanitized();
        assert_eq!(canvas.size(), Vec2::new(800.0, 600.0));

        let nan = CanvasConfig {
            width: f32::NAN,
            height: 300.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(nan.size(), Vec2::new(800.0, 300.0));
    }

    #[test]
    fn test_text_size_is_clamped() {
        let mut tools = ToolSettings::default();
        tools.set_text_size(2.0);
        assert_eq!(tools.text_size(), 8.0);
        tools.set_text_size(90.0);
        assert_eq!(tools.text_style().font_size, 72.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let canvas: CanvasConfig = serde_json::from_str(r#"{"width": 1024.0}"#).unwrap();
        assert_eq!(canvas.width, 1024.0);
        assert_eq!(canvas.height, 600.0);
    }
}
