use egui::emath::Rot2;
use egui::epaint::TextShape;
use egui::{Color32, Context, FontFamily, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::config::CanvasConfig;
use crate::document::Document;
use crate::element::{
    rotate_about, CanvasObject, ImageData, Payload, ShapeData, ShapeVariant, TextAlign, TextData,
};
use crate::texture_manager::TextureManager;

const ELLIPSE_SEGMENTS: usize = 48;
const SELECTION_COLOR: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
const PLACEHOLDER_COLOR: Color32 = Color32::from_gray(200);

/// Maps document space onto a screen rectangle, preserving aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    /// Screen position of the document origin
    pub origin: Pos2,
    /// Screen points per document unit
    pub scale: f32,
}

impl CanvasView {
    /// Largest view of `canvas_size` that fits and is centered in `available`
    pub fn fit(available: Rect, canvas_size: Vec2) -> Self {
        let scale = (available.width() / canvas_size.x)
            .min(available.height() / canvas_size.y)
            .max(f32::EPSILON);
        let origin = available.center() - canvas_size * scale / 2.0;
        Self { origin, scale }
    }

    pub fn to_screen(&self, pos: Pos2) -> Pos2 {
        self.origin + pos.to_vec2() * self.scale
    }

    pub fn to_document(&self, pos: Pos2) -> Pos2 {
        ((pos - self.origin) / self.scale).to_pos2()
    }

    pub fn canvas_rect(&self, canvas: &CanvasConfig) -> Rect {
        Rect::from_min_size(self.origin, canvas.size() * self.scale)
    }
}

/// Draws documents with an egui painter
#[derive(Default)]
pub struct DocumentRenderer {
    textures: TextureManager,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint background, objects in paint order, and the selection outline
    pub fn paint(
        &mut self,
        ctx: &Context,
        painter: &Painter,
        view: CanvasView,
        document: &Document,
        canvas: &CanvasConfig,
    ) {
        self.textures.begin_frame();
        let canvas_rect = view.canvas_rect(canvas);
        painter.rect_filled(canvas_rect, 0.0, canvas.background);

        let painter = painter.with_clip_rect(canvas_rect);
        for obj in document.objects() {
            match &obj.payload {
                Payload::Shape(shape) => paint_shape(&painter, view, obj, shape),
                Payload::Text(text) => paint_text(&painter, view, obj, text),
                Payload::Image(image) => self.paint_image(ctx, &painter, view, obj, image),
            }
        }

        if let Some(selected) = document.selected() {
            let outline = selected.corners().map(|corner| view.to_screen(corner));
            painter.add(Shape::closed_line(
                outline.to_vec(),
                Stroke::new(1.5, SELECTION_COLOR),
            ));
        }
    }

    /// Forget textures for objects that are gone from `document`
    pub fn prune_textures(&mut self, document: &Document) {
        self.textures.retain(|id| document.contains(id));
    }

    fn paint_image(
        &mut self,
        ctx: &Context,
        painter: &Painter,
        view: CanvasView,
        obj: &CanvasObject,
        image: &ImageData,
    ) {
        match self.textures.get_or_create(ctx, obj.id(), image) {
            Ok(texture_id) => {
                let rect = Rect::from_min_size(view.to_screen(obj.position), obj.size() * view.scale);
                let mut mesh = Mesh::with_texture(texture_id);
                mesh.add_rect_with_uv(
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
                mesh.rotate(Rot2::from_angle(obj.rotation.to_radians()), rect.center());
                painter.add(Shape::mesh(mesh));
            }
            Err(err) => {
                log::trace!("Drawing placeholder for image {}: {}", obj.id(), err);
                let corners = obj.corners().map(|corner| view.to_screen(corner));
                painter.add(Shape::convex_polygon(
                    corners.to_vec(),
                    PLACEHOLDER_COLOR,
                    Stroke::new(1.0, Color32::from_gray(100)),
                ));
            }
        }
    }
}

/// Outline of a shape in document space, rotation applied
fn shape_points(obj: &CanvasObject, variant: ShapeVariant) -> Vec<Pos2> {
    let rect = obj.rect();
    let local = match variant {
        ShapeVariant::Rectangle => vec![
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ],
        ShapeVariant::Circle => {
            let radius = rect.size() / 2.0;
            (0..ELLIPSE_SEGMENTS)
                .map(|i| {
                    let angle = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
                    rect.center() + Vec2::new(angle.cos() * radius.x, angle.sin() * radius.y)
                })
                .collect()
        }
        ShapeVariant::Triangle => vec![rect.center_top(), rect.right_bottom(), rect.left_bottom()],
        ShapeVariant::Line => vec![rect.left_center(), rect.right_center()],
    };
    local
        .into_iter()
        .map(|point| rotate_about(point, rect.center(), obj.rotation))
        .collect()
}

fn paint_shape(painter: &Painter, view: CanvasView, obj: &CanvasObject, shape: &ShapeData) {
    let points: Vec<Pos2> = shape_points(obj, shape.variant)
        .into_iter()
        .map(|point| view.to_screen(point))
        .collect();
    let stroke = Stroke::new(shape.stroke_width * view.scale, shape.stroke);

    match shape.variant {
        ShapeVariant::Line => {
            let line_stroke = Stroke::new(shape.stroke_width.max(1.0) * view.scale, shape.stroke);
            painter.line_segment([points[0], points[1]], line_stroke);
        }
        _ => {
            painter.add(Shape::convex_polygon(points, shape.fill, stroke));
        }
    }
}

fn paint_text(painter: &Painter, view: CanvasView, obj: &CanvasObject, text: &TextData) {
    let family = if text.is_monospace() {
        FontFamily::Monospace
    } else {
        FontFamily::Proportional
    };
    let galley = painter.layout_no_wrap(
        text.content.clone(),
        FontId::new(text.font_size * view.scale, family),
        text.color,
    );

    let text_width = galley.size().x / view.scale;
    let shift = match text.align {
        TextAlign::Left => 0.0,
        TextAlign::Center => ((obj.size().x - text_width) / 2.0).max(0.0),
        TextAlign::Right => (obj.size().x - text_width).max(0.0),
    };
    let anchor = rotate_about(
        obj.position + Vec2::new(shift, 0.0),
        obj.center(),
        obj.rotation,
    );

    let shape = TextShape::new(view.to_screen(anchor), galley, text.color)
        .with_angle(obj.rotation.to_radians());
    painter.add(shape);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{factory, ShapeStyle, TextStyle};

    #[test]
    fn test_view_fits_and_centers() {
        let available = Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 600.0));
        let view = CanvasView::fit(available, Vec2::new(800.0, 600.0));
        assert_eq!(view.scale, 1.0);
        assert_eq!(view.origin, Pos2::new(100.0, 0.0));
    }

    #[test]
    fn test_view_round_trip() {
        let view = CanvasView {
            origin: Pos2::new(30.0, 40.0),
            scale: 0.5,
        };
        let doc_pos = Pos2::new(200.0, 100.0);
        let screen = view.to_screen(doc_pos);
        assert_eq!(screen, Pos2::new(130.0, 90.0));
        assert_eq!(view.to_document(screen), doc_pos);
    }

    #[test]
    fn test_rotated_triangle_points() {
        let mut tri = factory::create_shape(
            ShapeVariant::Triangle,
            Pos2::new(50.0, 50.0),
            Vec2::new(20.0, 20.0),
            &ShapeStyle::default(),
        );
        tri.rotation = 180.0;
        let points = shape_points(&tri, ShapeVariant::Triangle);
        // Upside down, the apex sits at the bottom centre
        assert!((points[0].x - 50.0).abs() < 0.001);
        assert!((points[0].y - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_paint_document() {
        let ctx = Context::default();
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let painter = Painter::new(ctx.clone(), egui::LayerId::background(), rect);
        let canvas = CanvasConfig::default();

        let doc = Document::new()
            .with_appended(factory::create_shape(
                ShapeVariant::Circle,
                canvas.center(),
                Vec2::splat(100.0),
                &ShapeStyle::default(),
            ))
            .with_appended(factory::create_text(
                canvas.center(),
                Vec2::new(100.0, 24.0),
                &TextStyle::default(),
            ));

        let _ = ctx.run(Default::default(), |ctx| {
            let mut renderer = DocumentRenderer::new();
            let painter = painter.clone();
            renderer.paint(ctx, &painter, CanvasView::fit(rect, canvas.size()), &doc, &canvas);
        });
    }
}
