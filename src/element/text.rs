use egui::Color32;
use serde::{Deserialize, Serialize};

use super::common;

/// Horizontal alignment of text inside its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Style a text object is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: Color32,
    pub font_family: String,
    pub weight: FontWeight,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: common::DEFAULT_FONT_SIZE,
            color: Color32::BLACK,
            font_family: "Arial".to_owned(),
            weight: FontWeight::Normal,
            align: TextAlign::Left,
        }
    }
}

/// Kind-specific data of a text object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub content: String,
    pub font_size: f32,
    pub color: Color32,
    pub font_family: String,
    pub weight: FontWeight,
    pub align: TextAlign,
}

impl TextData {
    pub const DEFAULT_CONTENT: &'static str = "New Text";

    pub fn new(content: impl Into<String>, style: &TextStyle) -> Self {
        Self {
            content: content.into(),
            font_size: common::clamp_font_size(style.font_size),
            color: style.color,
            font_family: style.font_family.clone(),
            weight: style.weight,
            align: style.align,
        }
    }

    /// Whether the font family should be drawn with a monospace face
    pub fn is_monospace(&self) -> bool {
        let family = self.font_family.to_ascii_lowercase();
        family.contains("mono") || family.contains("courier")
    }
}
