use sketchkit_scene::{
    Brush, BrushWidths, CanvasProperties, Color, LiveKind, MemoryScene, Point, SceneEngine, Tool,
    ToolController, ToolEffect,
};

#[test]
fn test_shape_tools_insert_defaults() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();

    let ToolEffect::Inserted(line) = tools.select_tool(Tool::Line, &mut scene).unwrap() else {
        panic!("line tool should insert");
    };
    let props = &scene.instance(line).unwrap().props;
    assert_eq!(
        (props.x1, props.y1, props.x2, props.y2),
        (Some(50.0), Some(50.0), Some(200.0), Some(200.0))
    );
    assert_eq!(props.stroke.as_deref(), Some("green"));
    assert_eq!(props.stroke_width, Some(5.0));

    let ToolEffect::Inserted(text) = tools.select_tool(Tool::Text, &mut scene).unwrap() else {
        panic!("text tool should insert");
    };
    let object = scene.instance(text).unwrap();
    assert_eq!(object.kind, LiveKind::Textbox);
    assert_eq!(object.props.fill.as_deref(), Some("#ff0000"));
    assert_eq!(object.props.width, Some(200.0));
    assert_eq!(scene.active_selection(), Some(text));
    assert_eq!(tools.active(), Tool::Select);
}

#[test]
fn test_pen_uses_current_color() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::new(Color::rgb(0, 0x80, 0xff), BrushWidths::default());

    let effect = tools.select_tool(Tool::Pen, &mut scene).unwrap();
    assert_eq!(
        effect,
        ToolEffect::Drawing(Brush {
            color: "#0080ff".to_string(),
            width: 5.0
        })
    );

    tools.set_color(Color::rgb(0, 0, 0), &mut scene);
    assert_eq!(scene.brush().unwrap().color, "#000000");
}

#[test]
fn test_eraser_follows_background() {
    let mut scene = MemoryScene::new(CanvasProperties::new(800, 500, Color::rgb(0xee, 0xee, 0xee)));
    let mut tools = ToolController::new(
        Color::BLACK,
        BrushWidths {
            pen: 3.0,
            eraser: 40.0,
        },
    );
    tools.select_tool(Tool::Eraser, &mut scene).unwrap();

    let brush = scene.brush().unwrap();
    assert_eq!(brush.color, "#eeeeee");
    assert_eq!(brush.width, 40.0);
}

#[test]
fn test_recolor_uses_stroke_for_paths() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Pen, &mut scene).unwrap();
    let stroke = scene
        .draw_stroke(&[Point::new(0.0, 0.0), Point::new(4.0, 4.0)])
        .unwrap();
    scene.set_active_selection(Some(stroke));

    assert!(tools.set_color(Color::rgb(0, 0xff, 0), &mut scene));
    let props = &scene.instance(stroke).unwrap().props;
    assert_eq!(props.stroke.as_deref(), Some("#00ff00"));
    assert_eq!(props.fill, None);

    tools.select_tool(Tool::Rectangle, &mut scene).unwrap();
    let rect = scene.list_instances()[1].handle;
    scene.set_active_selection(Some(rect));
    tools.set_color(Color::rgb(0, 0, 0xff), &mut scene);
    assert_eq!(
        scene.instance(rect).unwrap().props.fill.as_deref(),
        Some("#0000ff")
    );
}

#[test]
fn test_color_change_without_selection() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    assert!(!tools.set_color(Color::WHITE, &mut scene));
    assert_eq!(tools.color(), Color::WHITE);
}

#[test]
fn test_text_edit_only_applies_to_text() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut scene).unwrap();
    let rect = scene.list_instances()[0].handle;
    scene.set_active_selection(Some(rect));
    assert!(!tools.set_selected_text("nope", &mut scene));

    tools.select_tool(Tool::Text, &mut scene).unwrap();
    assert!(tools.set_selected_text("Heading", &mut scene));
    let text = scene.active_selection().unwrap();
    assert_eq!(
        scene.instance(text).unwrap().props.text.as_deref(),
        Some("Heading")
    );
}

#[test]
fn test_delete_key() {
    let mut scene = MemoryScene::default();
    let mut tools = ToolController::default();
    tools.select_tool(Tool::Rectangle, &mut scene).unwrap();
    assert_eq!(tools.handle_key("Delete", &mut scene), None);

    let rect = scene.list_instances()[0].handle;
    scene.set_active_selection(Some(rect));
    assert_eq!(tools.handle_key("Backspace", &mut scene), None);
    assert_eq!(tools.handle_key("Delete", &mut scene), Some(rect));
    assert!(scene.is_empty());
    assert_eq!(scene.active_selection(), None);
}
