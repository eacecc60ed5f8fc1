use egui::Color32;
use serde::{Deserialize, Serialize};

/// The closed set of shapes the editor can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    Rectangle,
    Circle,
    Triangle,
    Line,
}

impl ShapeVariant {
    pub const ALL: [ShapeVariant; 4] = [
        ShapeVariant::Rectangle,
        ShapeVariant::Circle,
        ShapeVariant::Triangle,
        ShapeVariant::Line,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeVariant::Rectangle => "rectangle",
            ShapeVariant::Circle => "circle",
            ShapeVariant::Triangle => "triangle",
            ShapeVariant::Line => "line",
        }
    }
}

impl std::fmt::Display for ShapeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ShapeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeVariant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown shape: {s}"))
    }
}

/// Fill and outline a shape is created with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Color32::from_rgb(0x3b, 0x82, 0xf6),
            stroke: Color32::from_rgb(0x1e, 0x40, 0xaf),
            stroke_width: 2.0,
        }
    }
}

/// Kind-specific data of a shape object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeData {
    pub variant: ShapeVariant,
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
}

impl ShapeData {
    pub fn new(variant: ShapeVariant, style: &ShapeStyle) -> Self {
        Self {
            variant,
            fill: style.fill,
            stroke: style.stroke,
            stroke_width: style.stroke_width.max(0.0),
        }
    }
}
