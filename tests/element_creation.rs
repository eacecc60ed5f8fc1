use canvas_studio::element::{
    factory, ImageSource, ObjectKind, Payload, ShapeStyle, ShapeVariant, TextStyle,
    DUPLICATE_OFFSET, SHAPE_BOX_SIZE, TEXT_BOX_SIZE,
};
use egui::{Color32, Pos2, Vec2};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_text_creation() {
    let style = TextStyle {
        font_size: 32.0,
        color: Color32::RED,
        ..Default::default()
    };
    let text = factory::create_text(Pos2::new(400.0, 300.0), TEXT_BOX_SIZE, &style);

    assert_eq!(text.kind(), ObjectKind::Text);
    assert_eq!(text.center(), Pos2::new(400.0, 300.0));
    assert_eq!(text.size(), Vec2::new(100.0, 24.0));
    assert_eq!(text.rotation, 0.0);

    let data = text.as_text().expect("text payload");
    assert_eq!(data.content, "New Text");
    assert_eq!(data.font_size, 32.0);
    assert_eq!(data.color, Color32::RED);
    assert_eq!(data.font_family, "Arial");
}

#[test]
fn test_text_font_size_is_clamped_at_creation() {
    let small = TextStyle {
        font_size: 1.0,
        ..Default::default()
    };
    let large = TextStyle {
        font_size: 500.0,
        ..Default::default()
    };
    let center = Pos2::new(50.0, 50.0);

    let small = factory::create_text(center, TEXT_BOX_SIZE, &small);
    let large = factory::create_text(center, TEXT_BOX_SIZE, &large);
    assert_eq!(small.as_text().unwrap().font_size, 8.0);
    assert_eq!(large.as_text().unwrap().font_size, 72.0);
}

#[test]
fn test_shape_creation_for_every_variant() {
    let style = ShapeStyle::default();
    for variant in ShapeVariant::ALL {
        let shape = factory::create_shape(variant, Pos2::new(400.0, 300.0), SHAPE_BOX_SIZE, &style);
        assert_eq!(shape.kind(), ObjectKind::Shape);
        assert_eq!(shape.rect().min, Pos2::new(350.0, 250.0));

        let data = shape.as_shape().expect("shape payload");
        assert_eq!(data.variant, variant);
        assert_eq!(data.fill, Color32::from_rgb(0x3b, 0x82, 0xf6));
        assert_eq!(data.stroke, Color32::from_rgb(0x1e, 0x40, 0xaf));
        assert_eq!(data.stroke_width, 2.0);
    }
}

#[test]
fn test_shape_variant_parsing() {
    assert_eq!("Rectangle".parse::<ShapeVariant>(), Ok(ShapeVariant::Rectangle));
    assert_eq!("line".parse::<ShapeVariant>(), Ok(ShapeVariant::Line));
    assert!("hexagon".parse::<ShapeVariant>().is_err());
}

#[test]
fn test_image_is_scaled_to_fit() {
    let source = ImageSource::Url("https://example.com/photo.png".to_owned());
    let image = factory::create_image(
        Pos2::new(400.0, 300.0),
        [1000, 500],
        Vec2::new(400.0, 300.0),
        source,
    );

    assert_eq!(image.kind(), ObjectKind::Image);
    assert_eq!(image.size(), Vec2::new(400.0, 200.0));
    assert_eq!(image.center(), Pos2::new(400.0, 300.0));
    assert_eq!(image.as_image().unwrap().natural_size, [1000, 500]);
}

#[test]
fn test_small_image_keeps_natural_size() {
    let image = factory::create_image(
        Pos2::new(400.0, 300.0),
        [64, 32],
        Vec2::new(400.0, 300.0),
        ImageSource::Embedded(Arc::new(vec![0u8; 4])),
    );
    assert_eq!(image.size(), Vec2::new(64.0, 32.0));
}

#[test]
fn test_ids_are_unique() {
    let style = ShapeStyle::default();
    let ids: HashSet<_> = (0..100)
        .map(|_| factory::create_shape(ShapeVariant::Circle, Pos2::ZERO, SHAPE_BOX_SIZE, &style).id())
        .collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn test_duplicate_gets_fresh_id_and_offset() {
    let original = factory::create_text(Pos2::new(100.0, 100.0), TEXT_BOX_SIZE, &TextStyle::default());
    let copy = original.duplicate(DUPLICATE_OFFSET);

    assert_ne!(copy.id(), original.id());
    assert_eq!(copy.position, original.position + Vec2::new(20.0, 20.0));
    assert_eq!(copy.payload, original.payload);
}

#[test]
fn test_rotated_hit_test() {
    let mut line = factory::create_shape(
        ShapeVariant::Rectangle,
        Pos2::new(100.0, 100.0),
        Vec2::new(100.0, 10.0),
        &ShapeStyle::default(),
    );
    assert!(line.hit_test(Pos2::new(140.0, 100.0)));
    assert!(!line.hit_test(Pos2::new(100.0, 140.0)));

    line.rotation = 90.0;
    assert!(!line.hit_test(Pos2::new(140.0, 100.0)));
    assert!(line.hit_test(Pos2::new(100.0, 140.0)));
}

#[test]
fn test_payload_serializes_with_kind_tag() {
    let shape = factory::create_shape(
        ShapeVariant::Triangle,
        Pos2::ZERO,
        SHAPE_BOX_SIZE,
        &ShapeStyle::default(),
    );
    let json = serde_json::to_value(&shape.payload).unwrap();
    assert_eq!(json["kind"], "shape");

    let restored: Payload = serde_json::from_value(json).unwrap();
    assert_eq!(restored, shape.payload);
}
