use egui::{Pos2, Vec2};

// Common constants for all object kinds
pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 72.0;
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

pub const TEXT_BOX_SIZE: Vec2 = Vec2::new(100.0, 24.0);
pub const SHAPE_BOX_SIZE: Vec2 = Vec2::new(100.0, 100.0);

/// Offset applied to a duplicated object relative to its original
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Share of the canvas an imported image may cover on each axis
pub const IMAGE_MAX_CANVAS_FRACTION: f32 = 0.5;

/// Clamps a font size into the range the editor accepts
pub fn clamp_font_size(size: f32) -> f32 {
    if size.is_nan() {
        return DEFAULT_FONT_SIZE;
    }
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Validates that a size has strictly positive dimensions
pub(crate) fn validate_size(size: Vec2) -> Result<(), String> {
    if size.x > 0.0 && size.y > 0.0 && size.x.is_finite() && size.y.is_finite() {
        Ok(())
    } else {
        Err(format!(
            "Object dimensions must be positive. Width: {}, Height: {}",
            size.x, size.y
        ))
    }
}

/// Top-left corner of a box of `size` centered on `center`
pub(crate) fn top_left_for_center(center: Pos2, size: Vec2) -> Pos2 {
    center - size / 2.0
}

/// Scales `natural` down, preserving aspect ratio, until it fits inside `bounds`.
///
/// Sizes that already fit are returned unchanged: a small image keeps its
/// pixel size instead of being stretched to fill `bounds`.
pub fn fit_within(natural: Vec2, bounds: Vec2) -> Vec2 {
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return natural;
    }
    let scale = (bounds.x / natural.x).min(bounds.y / natural.y).min(1.0);
    natural * scale
}

/// Rotates `point` around `origin` by `degrees` (clockwise in screen space)
pub fn rotate_about(point: Pos2, origin: Pos2, degrees: f32) -> Pos2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - origin;
    origin + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}
