use proptest::prelude::*;
use sketchkit_scene::model::{
    CommonProps, EllipseProps, LineProps, PathProps, RectangleProps, TextAlign, TextProps,
};
use sketchkit_scene::{
    decode, encode_scene, replay, CanvasProperties, Color, EncodeOptions, LiveKind, LiveProps,
    MemoryScene, PathCommand, Point, SceneDocument, SceneEngine, ShapeBody, ShapeDescriptor,
    ShapeKind, Tool, ToolController,
};

fn whole() -> impl Strategy<Value = f64> {
    (-2000i32..2000).prop_map(f64::from)
}

fn positive() -> impl Strategy<Value = f64> {
    (1i32..500).prop_map(f64::from)
}

fn color() -> impl Strategy<Value = Color> {
    any::<[u8; 4]>().prop_map(|[r, g, b, a]| Color { r, g, b, a })
}

fn common() -> impl Strategy<Value = CommonProps> {
    (whole(), whole(), positive(), positive(), 0i32..360, 0u8..=10).prop_map(
        |(left, top, width, height, angle, opacity)| CommonProps {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: f64::from(angle),
            opacity: f64::from(opacity) / 10.0,
            visible: true,
        },
    )
}

fn body() -> impl Strategy<Value = ShapeBody> {
    prop_oneof![
        (color(), proptest::option::of(color()), positive(), positive()).prop_map(
            |(fill, stroke, stroke_width, rx)| ShapeBody::Rectangle(RectangleProps {
                fill,
                stroke,
                stroke_width,
                rx,
                ry: rx,
            })
        ),
        (color(), positive(), positive()).prop_map(|(fill, rx, ry)| {
            ShapeBody::Ellipse(EllipseProps {
                fill,
                stroke: None,
                stroke_width: 1.0,
                rx,
                ry,
            })
        }),
        (color(), positive(), whole(), whole(), whole(), whole()).prop_map(
            |(stroke, stroke_width, x1, y1, x2, y2)| ShapeBody::Line(LineProps {
                stroke,
                stroke_width,
                x1,
                y1,
                x2,
                y2,
            })
        ),
        (color(), prop::collection::vec((whole(), whole()), 1..100)).prop_map(
            |(stroke, points)| {
                let mut path = vec![PathCommand::MoveTo {
                    x: points[0].0,
                    y: points[0].1,
                }];
                path.extend(points[1..].iter().map(|&(x, y)| PathCommand::LineTo { x, y }));
                ShapeBody::FreehandPath(PathProps {
                    stroke,
                    stroke_width: 5.0,
                    path,
                    decimated: false,
                })
            }
        ),
        ("[a-zA-Z0-9 ]{0,24}", color(), 8i32..72, prop_oneof![
            Just(TextAlign::Left),
            Just(TextAlign::Center),
            Just(TextAlign::Right),
            Just(TextAlign::Justify)
        ])
            .prop_map(|(text, fill, size, text_align)| ShapeBody::TextBox(TextProps {
                text,
                font_family: "Arial".to_string(),
                font_size: f64::from(size),
                font_weight: "bold".to_string(),
                fill,
                text_align,
            })),
    ]
}

fn document() -> impl Strategy<Value = SceneDocument> {
    prop::collection::vec((common(), body()), 0..12).prop_map(|shapes| SceneDocument {
        shapes: shapes
            .into_iter()
            .map(|(common, body)| ShapeDescriptor::new(common, body))
            .collect(),
        ..SceneDocument::default()
    })
}

proptest! {
    #[test]
    fn prop_replay_then_encode_is_identity(doc in document()) {
        let mut scene = MemoryScene::new(doc.canvas_properties.clone());
        let report = replay(&mut scene, &decode(&doc));
        prop_assert_eq!(report.applied.len(), doc.shape_count());

        let encoded = encode_scene(&scene, &EncodeOptions::default());
        prop_assert_eq!(&encoded, &doc);
    }

    #[test]
    fn prop_document_survives_json(doc in document()) {
        let bytes = doc.to_bytes().unwrap();
        let parsed: SceneDocument = serde_json::from_slice(&bytes).unwrap();
        prop_assert_eq!(parsed, doc);
    }
}

#[test]
fn test_tool_rectangle_encodes_with_defaults() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut scene).unwrap();

    let doc = encode_scene(&scene, &EncodeOptions::default());
    let value = doc.to_value().unwrap();
    let shape = &value["shapes"][0];

    assert_eq!(shape["type"], "rectangle");
    assert_eq!(shape["left"], 50.0);
    assert_eq!(shape["top"], 50.0);
    assert_eq!(shape["width"], 100.0);
    assert_eq!(shape["height"], 100.0);
    assert_eq!(shape["fill"], "#ff0000");
    assert_eq!(shape["strokeWidth"], 1.0);
    assert_eq!(shape["scaleX"], 1.0);
    assert_eq!(shape["opacity"], 1.0);
    assert_eq!(shape["visible"], true);
}

#[test]
fn test_tool_ellipse_is_a_circle_descriptor() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Ellipse, &mut scene).unwrap();

    let doc = encode_scene(&scene, &EncodeOptions::default());
    let ShapeBody::Ellipse(ellipse) = &doc.shapes[0].body else {
        panic!("expected ellipse, got {:?}", doc.shapes[0]);
    };
    assert_eq!((ellipse.rx, ellipse.ry), (50.0, 50.0));
    assert_eq!(ellipse.fill.to_hex(), "#0000ff");
}

#[test]
fn test_long_stroke_is_thinned_once() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Pen, &mut scene).unwrap();

    let points: Vec<Point> = (0..250).map(|i| Point::new(f64::from(i), 10.0)).collect();
    scene.draw_stroke(&points).unwrap();

    let options = EncodeOptions::default();
    let first = encode_scene(&scene, &options);
    let ShapeBody::FreehandPath(path) = &first.shapes[0].body else {
        panic!("expected path");
    };
    assert_eq!(path.path.len(), 125);
    assert_eq!(path.path[0], PathCommand::MoveTo { x: 0.0, y: 10.0 });
    assert_eq!(path.stroke.to_hex(), "#ff0000");
    assert_eq!(path.stroke_width, 5.0);
    assert!(path.decimated);

    // Reload and save again: no further loss
    let mut reloaded = MemoryScene::default();
    replay(&mut reloaded, &decode(&first));
    let second = encode_scene(&reloaded, &options);
    assert_eq!(second, first);
}

#[test]
fn test_render_order_is_kept() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    for tool in [Tool::Line, Tool::Rectangle, Tool::Text, Tool::Ellipse] {
        tools.select_tool(tool, &mut scene).unwrap();
    }

    let doc = encode_scene(&scene, &EncodeOptions::default());
    let kinds: Vec<Option<ShapeKind>> = doc.shapes.iter().map(ShapeDescriptor::kind).collect();
    assert_eq!(
        kinds,
        vec![
            Some(ShapeKind::Line),
            Some(ShapeKind::Rectangle),
            Some(ShapeKind::TextBox),
            Some(ShapeKind::Ellipse),
        ]
    );
}

#[test]
fn test_unsupported_instances_keep_their_slot() {
    let mut scene = MemoryScene::default();
    let h = scene.create_native(LiveKind::Other("image".to_string()), LiveProps::default());
    scene.add_instance(h).unwrap();

    let doc = encode_scene(&scene, &EncodeOptions::default());
    assert_eq!(doc.shape_count(), 1);
    assert_eq!(doc.to_value().unwrap()["shapes"][0]["type"], "image");
    assert!(decode(&doc).is_empty());
}

#[test]
fn test_canvas_properties_are_encoded() {
    let canvas = CanvasProperties::new(1024, 768, Color::rgb(0x10, 0x20, 0x30));
    let scene = MemoryScene::new(canvas.clone());
    let doc = encode_scene(&scene, &EncodeOptions::default());
    assert_eq!(doc.canvas_properties, canvas);
    assert_eq!(
        doc.to_value().unwrap()["canvasProperties"]["backgroundColor"],
        "#102030"
    );
}
