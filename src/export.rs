//! Bitmap export of a document.
//!
//! [`RasterSurface`] paints the same geometry the on-screen renderer draws
//! into an `image::RgbaImage`, then encodes it as PNG. Objects are painted
//! in document order; each one is sampled in its own unrotated box space so
//! rotation costs nothing extra per shape kind.

use std::io::Cursor;

use egui::epaint::text::{FontDefinitions, Fonts};
use egui::{Color32, FontFamily, FontId, Pos2, Vec2};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use thiserror::Error;

use crate::config::CanvasConfig;
use crate::document::Document;
use crate::element::{
    rotate_about, CanvasObject, ImageData, ObjectId, Payload, ShapeData, ShapeVariant, TextAlign,
    TextData,
};
use crate::util::time;

/// Placeholder drawn for images whose pixels are not held in memory
const PLACEHOLDER_COLOR: Color32 = Color32::from_gray(200);

/// Glyph atlas side length used while laying out text for export
const MAX_ATLAS_SIDE: usize = 4096;

/// Errors that can occur while exporting a document
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Canvas is too small to export: {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("Image object {id} could not be decoded")]
    ImageSource {
        id: ObjectId,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode bitmap: {0}")]
    Encode(#[from] image::ImageError),
}

/// An encoded bitmap of the document, ready to download or upload
#[derive(Clone)]
pub struct ExportedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

impl std::fmt::Debug for ExportedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedImage")
            .field("png_len", &self.png.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Produces an encoded bitmap for a document
pub trait RenderSurface: Send + Sync {
    fn export(&self, document: &Document, canvas: &CanvasConfig)
        -> Result<ExportedImage, ExportError>;
}

/// Software rasterizer built on the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterSurface;

impl RenderSurface for RasterSurface {
    fn export(
        &self,
        document: &Document,
        canvas: &CanvasConfig,
    ) -> Result<ExportedImage, ExportError> {
        let bitmap = self.rasterize(document, canvas)?;
        let (width, height) = bitmap.dimensions();

        let mut png = Vec::new();
        bitmap.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(ExportedImage {
            png,
            width,
            height,
            file_name: format!("canvas-{}.png", time::timestamp_millis()),
        })
    }
}

impl RasterSurface {
    /// Paint `document` onto a fresh bitmap the size of the canvas
    pub fn rasterize(
        &self,
        document: &Document,
        canvas: &CanvasConfig,
    ) -> Result<RgbaImage, ExportError> {
        if !(canvas.width >= 1.0 && canvas.height >= 1.0) {
            return Err(ExportError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }
        let width = canvas.width.round() as u32;
        let height = canvas.height.round() as u32;
        let mut target = RgbaImage::from_pixel(width, height, to_rgba(canvas.background));

        // Only pay for font loading when there is text to lay out
        let fonts = document
            .objects()
            .iter()
            .any(|obj| obj.as_text().is_some())
            .then(|| Fonts::new(1.0, MAX_ATLAS_SIDE, FontDefinitions::default()));

        for obj in document.objects() {
            let sampler = match &obj.payload {
                Payload::Shape(shape) => Sampler::Shape(*shape),
                Payload::Image(data) => image_sampler(obj.id(), data)?,
                Payload::Text(text) => match &fonts {
                    Some(fonts) => Sampler::Text(TextMask::layout(fonts, text, obj.size().x)),
                    None => continue,
                },
            };
            paint_object(&mut target, obj, &sampler);
        }

        Ok(target)
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

fn image_sampler(id: ObjectId, data: &ImageData) -> Result<Sampler, ExportError> {
    match data.source.embedded_bytes() {
        Some(bytes) => {
            let decoded = image::load_from_memory(bytes)
                .map_err(|source| ExportError::ImageSource { id, source })?;
            Ok(Sampler::Image(decoded.to_rgba8()))
        }
        None => {
            log::warn!("Image {} has no embedded pixels, exporting a placeholder", id);
            Ok(Sampler::Placeholder)
        }
    }
}

/// Per-object color lookup in the object's own, unrotated box space
enum Sampler {
    Shape(ShapeData),
    Image(RgbaImage),
    Placeholder,
    Text(TextMask),
}

impl Sampler {
    /// Extent of the sampled area; text may spill past its box
    fn extent(&self, size: Vec2) -> Vec2 {
        match self {
            Sampler::Text(mask) => size.max(Vec2::new(mask.width as f32, mask.height as f32)),
            _ => size,
        }
    }

    fn sample(&self, local: Vec2, size: Vec2) -> Option<Rgba<u8>> {
        match self {
            Sampler::Shape(shape) => sample_shape(shape, local, size).map(to_rgba),
            Sampler::Image(bitmap) => {
                let x = ((local.x / size.x) * bitmap.width() as f32) as u32;
                let y = ((local.y / size.y) * bitmap.height() as f32) as u32;
                Some(*bitmap.get_pixel(
                    x.min(bitmap.width() - 1),
                    y.min(bitmap.height() - 1),
                ))
            }
            Sampler::Placeholder => Some(to_rgba(PLACEHOLDER_COLOR)),
            Sampler::Text(mask) => mask.sample(local),
        }
    }
}

fn paint_object(target: &mut RgbaImage, obj: &CanvasObject, sampler: &Sampler) {
    let size = obj.size();
    let extent = sampler.extent(size);
    let origin = obj.position;
    let center = obj.center();

    // Screen-space bounds of the rotated extent
    let corners = [
        origin,
        origin + Vec2::new(extent.x, 0.0),
        origin + extent,
        origin + Vec2::new(0.0, extent.y),
    ]
    .map(|corner| rotate_about(corner, center, obj.rotation));
    let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(target.width());
    let y1 = (max_y.ceil().max(0.0) as u32).min(target.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let screen = Pos2::new(px as f32 + 0.5, py as f32 + 0.5);
            let local = rotate_about(screen, center, -obj.rotation) - origin;
            if local.x < 0.0 || local.y < 0.0 || local.x >= extent.x || local.y >= extent.y {
                continue;
            }
            if let Some(color) = sampler.sample(local, size) {
                target.get_pixel_mut(px, py).blend(&color);
            }
        }
    }
}

fn sample_shape(shape: &ShapeData, p: Vec2, size: Vec2) -> Option<Color32> {
    let stroke_width = shape.stroke_width;
    let (w, h) = (size.x, size.y);
    match shape.variant {
        ShapeVariant::Rectangle => {
            let edge = p.x.min(p.y).min(w - p.x).min(h - p.y);
            if edge < 0.0 {
                None
            } else if edge < stroke_width {
                Some(shape.stroke)
            } else {
                Some(shape.fill)
            }
        }
        ShapeVariant::Circle => {
            let (a, b) = (w / 2.0, h / 2.0);
            let r = (((p.x - a) / a).powi(2) + ((p.y - b) / b).powi(2)).sqrt();
            if r > 1.0 {
                None
            } else if r > 1.0 - stroke_width / a.min(b) {
                Some(shape.stroke)
            } else {
                Some(shape.fill)
            }
        }
        ShapeVariant::Triangle => {
            // Apex at the top centre, base along the bottom edge
            let vertices = [Vec2::new(w / 2.0, 0.0), Vec2::new(w, h), Vec2::new(0.0, h)];
            let mut nearest_edge = f32::INFINITY;
            for i in 0..3 {
                let a = vertices[i];
                let b = vertices[(i + 1) % 3];
                let edge = b - a;
                let cross = edge.x * (p.y - a.y) - edge.y * (p.x - a.x);
                if cross < 0.0 {
                    return None;
                }
                nearest_edge = nearest_edge.min(cross / edge.length());
            }
            if nearest_edge < stroke_width {
                Some(shape.stroke)
            } else {
                Some(shape.fill)
            }
        }
        ShapeVariant::Line => {
            let half_width = stroke_width.max(1.0) / 2.0;
            ((p.y - h / 2.0).abs() <= half_width).then_some(shape.stroke)
        }
    }
}

/// Glyph coverage of a laid-out text, in box space
struct TextMask {
    width: usize,
    height: usize,
    coverage: Vec<f32>,
    color: Color32,
}

impl TextMask {
    fn layout(fonts: &Fonts, text: &TextData, box_width: f32) -> Self {
        let family = if text.is_monospace() {
            FontFamily::Monospace
        } else {
            FontFamily::Proportional
        };
        let galley = fonts.layout_no_wrap(
            text.content.clone(),
            FontId::new(text.font_size, family),
            Color32::WHITE,
        );
        let atlas = fonts.image();

        let text_size = galley.size();
        let shift = match text.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => ((box_width - text_size.x) / 2.0).max(0.0),
            TextAlign::Right => (box_width - text_size.x).max(0.0),
        };
        let width = (text_size.x + shift).ceil().max(1.0) as usize;
        let height = text_size.y.ceil().max(1.0) as usize;
        let mut coverage = vec![0.0_f32; width * height];

        for row in &galley.rows {
            for glyph in &row.glyphs {
                let uv = glyph.uv_rect;
                if uv.max[0] <= uv.min[0] || uv.max[1] <= uv.min[1] {
                    continue;
                }
                let left_top = glyph.pos + uv.offset + Vec2::new(shift, 0.0);
                for ty in 0..(uv.max[1] - uv.min[1]) as usize {
                    for tx in 0..(uv.max[0] - uv.min[0]) as usize {
                        let ax = uv.min[0] as usize + tx;
                        let ay = uv.min[1] as usize + ty;
                        let Some(&alpha) = atlas.pixels.get(ay * atlas.size[0] + ax) else {
                            continue;
                        };
                        let x = (left_top.x + tx as f32).round();
                        let y = (left_top.y + ty as f32).round();
                        if x < 0.0 || y < 0.0 || x as usize >= width || y as usize >= height {
                            continue;
                        }
                        let cell = &mut coverage[y as usize * width + x as usize];
                        *cell = cell.max(alpha);
                    }
                }
            }
        }

        Self {
            width,
            height,
            coverage,
            color: text.color,
        }
    }

    fn sample(&self, local: Vec2) -> Option<Rgba<u8>> {
        let (x, y) = (local.x as usize, local.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        let alpha = self.coverage[y * self.width + x];
        if alpha <= 0.0 {
            return None;
        }
        let [r, g, b, a] = self.color.to_srgba_unmultiplied();
        Some(Rgba([r, g, b, (a as f32 * alpha.min(1.0)).round() as u8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{factory, ShapeStyle, TextStyle};

    fn canvas() -> CanvasConfig {
        CanvasConfig {
            width: 200.0,
            height: 100.0,
            ..CanvasConfig::default()
        }
    }

    fn red_square_style() -> ShapeStyle {
        ShapeStyle {
            fill: Color32::RED,
            stroke: Color32::BLUE,
            stroke_width: 2.0,
        }
    }

    #[test]
    fn test_empty_document_is_background() {
        let bitmap = RasterSurface.rasterize(&Document::new(), &canvas()).unwrap();
        assert_eq!(bitmap.dimensions(), (200, 100));
        assert_eq!(*bitmap.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_rectangle_fill_and_stroke() {
        let rect = factory::create_shape(
            ShapeVariant::Rectangle,
            Pos2::new(100.0, 50.0),
            Vec2::new(40.0, 40.0),
            &red_square_style(),
        );
        let doc = Document::new().with_appended(rect);
        let bitmap = RasterSurface.rasterize(&doc, &canvas()).unwrap();

        assert_eq!(*bitmap.get_pixel(100, 50), Rgba([255, 0, 0, 255]));
        assert_eq!(*bitmap.get_pixel(80, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*bitmap.get_pixel(20, 50), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_circle_leaves_corners_empty() {
        let circle = factory::create_shape(
            ShapeVariant::Circle,
            Pos2::new(100.0, 50.0),
            Vec2::new(60.0, 60.0),
            &red_square_style(),
        );
        let doc = Document::new().with_appended(circle);
        let bitmap = RasterSurface.rasterize(&doc, &canvas()).unwrap();

        assert_eq!(*bitmap.get_pixel(100, 50), Rgba([255, 0, 0, 255]));
        assert_eq!(*bitmap.get_pixel(72, 22), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_rotation_moves_pixels() {
        let mut bar = factory::create_shape(
            ShapeVariant::Rectangle,
            Pos2::new(100.0, 50.0),
            Vec2::new(80.0, 10.0),
            &red_square_style(),
        );
        bar.rotation = 90.0;
        let doc = Document::new().with_appended(bar);
        let bitmap = RasterSurface.rasterize(&doc, &canvas()).unwrap();

        // Rotated a quarter turn the bar now stands upright
        assert_eq!(*bitmap.get_pixel(130, 50), Rgba([255, 255, 255, 255]));
        assert_ne!(*bitmap.get_pixel(100, 20), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_text_paints_glyphs() {
        let text = factory::create_text(
            Pos2::new(100.0, 50.0),
            Vec2::new(100.0, 24.0),
            &TextStyle::default(),
        );
        let doc = Document::new().with_appended(text);
        let bitmap = RasterSurface.rasterize(&doc, &canvas()).unwrap();

        let inked = bitmap.pixels().filter(|px| px.0[0] < 128).count();
        assert!(inked > 0);
    }

    #[test]
    fn test_export_encodes_png() {
        let exported = RasterSurface.export(&Document::new(), &canvas()).unwrap();
        assert!(exported.file_name.starts_with("canvas-"));
        assert!(exported.file_name.ends_with(".png"));
        let decoded = image::load_from_memory(&exported.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }

    #[test]
    fn test_zero_canvas_is_rejected() {
        let canvas = CanvasConfig {
            width: 0.0,
            ..CanvasConfig::default()
        };
        let result = RasterSurface.export(&Document::new(), &canvas);
        assert!(matches!(result, Err(ExportError::InvalidCanvas { .. })));
    }
}
