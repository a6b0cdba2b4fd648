//! Integration tests for visad-a3d displays.
//!
//! Each test builds its own engine context, so they run independently.

use std::sync::Arc;
use std::time::Duration;

use visad_a3d::*;

const FRAME: Duration = Duration::from_millis(20);

fn display() -> Display3D {
    let options = Options {
        knots_convert: false,
        ..Options::default()
    };
    Display3D::new(init(options).expect("init failed"), 200, 200).expect("display failed")
}

fn wind(u: f64, v: f64) -> Arc<DataReferenceImpl> {
    Arc::new(DataReferenceImpl::with_data(
        "wind",
        DataTuple::new(vec![
            Real::new(RealType::new("x"), 0.0),
            Real::new(RealType::new("y"), 0.0),
            Real::new(RealType::new("u"), u),
            Real::new(RealType::new("v"), v),
        ]),
    ))
}

fn wind_mappings() -> DisplayMappings {
    DisplayMappings::new()
        .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
        .with(ScalarMap::new(RealType::new("y"), DisplayRealType::YAxis))
        .with(ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1X))
        .with(ScalarMap::new(RealType::new("v"), DisplayRealType::Flow1Y))
}

fn pixel_of(display: &Display3D, point: Vec3) -> Vec2 {
    display
        .camera()
        .world_to_screen(point, 200, 200)
        .expect("point in front of camera")
}

fn switch_which(display: &Display3D, node: NodeId) -> Option<usize> {
    match display.engine().scene().node(node).unwrap().payload() {
        NodePayload::Switch { which } => *which,
        _ => None,
    }
}

fn tick_mark(
    _: &FrameContext<'_>,
    p: &Vec3,
) -> std::result::Result<GeometryArray, FrameTransformError> {
    Ok(GeometryArray {
        lines: vec![*p, *p + Vec3::Y],
        ..GeometryArray::default()
    })
}

#[test]
fn test_drag_barb_through_display() {
    let mut display = display();
    let data = wind(0.0, -20.0);
    let id = display.add_barbs(
        data.clone(),
        wind_mappings(),
        RenderStrategy::DirectManipulation(BarbKind::Wind),
    );
    display.frame(FRAME).unwrap();

    let renderer = display.barbs(id).unwrap();
    assert!(renderer.why_not_direct().is_none());
    let head = renderer.controller().unwrap().barb_ends().unwrap().head;

    // grab the head keeping speed fixed
    let pixel = pixel_of(&display, head);
    let diagnostics = display
        .mouse_press(PointerButton::Left, pixel, Modifiers::SHIFT)
        .unwrap();
    assert_eq!(display.grabbed(), Some(id));
    assert_eq!(diagnostics.cursor_strings.len(), 2);
    assert!(diagnostics.exceptions.is_empty());

    // swing the pole to -X: the wind now blows toward +X
    let pixel = pixel_of(&display, Vec3::new(-1.0, 0.0, 0.0));
    display.mouse_drag(pixel, Modifiers::NONE).unwrap();
    let tuple = data.data().unwrap();
    assert!((tuple.value("u").unwrap() - 20.0).abs() < 1e-2);
    assert!(tuple.value("v").unwrap().abs() < 1e-2);

    let readout = display.renderer().readout();
    assert_eq!(readout.len(), 2);
    assert!(readout[0].starts_with("u = "));
    assert!(readout[1].starts_with("v = "));

    // the next frame rebuilds the glyph from the edited data
    display.frame(FRAME).unwrap();
    let ends = display
        .barbs(id)
        .unwrap()
        .controller()
        .unwrap()
        .barb_ends()
        .unwrap();
    assert!(ends.head.x < ends.tail.x);

    display.mouse_release(PointerButton::Left).unwrap();
    assert_eq!(display.grabbed(), None);
    assert!(!display.barbs(id).unwrap().controller().unwrap().is_dragging());
}

#[test]
fn test_press_away_from_glyph_does_not_grab() {
    let mut display = display();
    let data = wind(0.0, -20.0);
    let id = display.add_barbs(
        data.clone(),
        wind_mappings(),
        RenderStrategy::DirectManipulation(BarbKind::Wind),
    );
    display.frame(FRAME).unwrap();

    let pixel = pixel_of(&display, Vec3::new(-0.8, -0.8, 0.0));
    display
        .mouse_press(PointerButton::Left, pixel, Modifiers::NONE)
        .unwrap();
    assert_eq!(display.grabbed(), None);
    display
        .mouse_drag(pixel_of(&display, Vec3::new(-1.0, 0.0, 0.0)), Modifiers::NONE)
        .unwrap();
    assert_eq!(data.data().unwrap().value("v").unwrap(), -20.0);
    display.mouse_release(PointerButton::Left).unwrap();

    // a press a few pixels off the head still grabs it
    let head = display.barbs(id).unwrap().controller().unwrap().barb_ends().unwrap().head;
    let near = pixel_of(&display, head) + Vec2::new(3.0, 0.0);
    display
        .mouse_press(PointerButton::Left, near, Modifiers::NONE)
        .unwrap();
    assert_eq!(display.grabbed(), Some(id));
}

#[test]
fn test_default_strategy_is_not_grabbed() {
    let mut display = display();
    let id = display.add_barbs(wind(3.0, 4.0), wind_mappings(), RenderStrategy::Default);
    display.frame(FRAME).unwrap();
    assert!(display.barbs(id).unwrap().node().is_some());

    let pixel = pixel_of(&display, Vec3::ZERO);
    display
        .mouse_press(PointerButton::Left, pixel, Modifiers::NONE)
        .unwrap();
    assert_eq!(display.grabbed(), None);

    display.remove_barbs(id).unwrap();
    assert!(display.barbs(id).is_none());
    assert!(display.remove_barbs(id).is_err());
}

#[test]
fn test_right_drag_orbits_camera() {
    let mut display = display();
    let before = display.camera().view_z();
    display
        .mouse_press(PointerButton::Right, Vec2::new(100.0, 100.0), Modifiers::NONE)
        .unwrap();
    display
        .mouse_drag(Vec2::new(150.0, 100.0), Modifiers::NONE)
        .unwrap();
    display.mouse_release(PointerButton::Right).unwrap();
    assert!(display.camera().view_z().distance(before) > 0.1);
}

#[test]
fn test_animation_frames_advance() {
    let mut display = display();
    let id = display.add_shadow(ShadowKind::FunctionOrSet(AnimationMode::Animation), "loop");
    let samples: Vec<(f64, Vec3)> = (0..3)
        .map(|i| (f64::from(i), Vec3::new(i as f32, 0.0, 0.0)))
        .collect();
    let diagnostics = display.transform(id, &samples, &tick_mark).unwrap();
    assert!(diagnostics.is_empty());

    let switch = display.shadow(id).unwrap().node().unwrap();
    assert_eq!(display.animation(id).unwrap().frame_count(), 3);
    assert_eq!(switch_which(&display, switch), Some(0));

    let control = display.animation_mut(id).unwrap();
    control.set_step(Duration::from_millis(100));
    control.set_running(true);
    display.frame(Duration::from_millis(100)).unwrap();
    assert_eq!(switch_which(&display, switch), Some(1));

    // a second pass over the same times keeps the frame nodes
    let frame_nodes = |display: &Display3D| -> Vec<NodeId> {
        let recycler = display.shadow(id).unwrap().recycler().unwrap();
        recycler.frames().iter().map(|f| f.node).collect()
    };
    let before = frame_nodes(&display);
    display.transform(id, &samples, &tick_mark).unwrap();
    assert_eq!(frame_nodes(&display), before);
    assert_eq!(switch_which(&display, switch), Some(1));

    display.remove_shadow(id).unwrap();
    assert!(!display.engine().scene().contains(switch));
}

#[test]
fn test_trajectory_from_options() {
    let options = Options {
        trajectory: true,
        ..Options::default()
    };
    let mut display = Display3D::new(init(options).unwrap(), 200, 200).unwrap();
    let time = RealType::new("time");
    let mappings = DisplayMappings::new().with(ScalarMap::new(time.clone(), DisplayRealType::Animation));
    let kind = ShadowKind::for_function(&time, &mappings, display.engine().options());
    assert_eq!(kind, ShadowKind::FunctionOrSet(AnimationMode::Trajectory));

    let id = display.add_shadow(kind, "path");
    let samples: Vec<(f64, Vec3)> = (0..4)
        .map(|i| (f64::from(i), Vec3::new(i as f32, 0.0, 0.0)))
        .collect();
    display
        .transform(id, &samples, &TrajectoryBuilder::default())
        .unwrap();

    let switch = display.shadow(id).unwrap().node().unwrap();
    assert_eq!(display.animation(id).unwrap().frame_count(), 4);
    let last = display.engine().scene().child(switch, 3).unwrap();
    let geometry = display.engine().scene().node(last).unwrap().geometry().unwrap().clone();
    // degenerate start plus three segments
    assert_eq!(geometry.lines.len(), 8);
    assert_eq!(geometry.lines[7], Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn test_scene_tasks_from_other_threads() {
    let mut display = display();
    let handle = display.engine().handle();
    let worker = std::thread::spawn(move || {
        handle
            .submit(|scene| {
                let node = scene.create_node("annotation", NodePayload::Group);
                let root = scene.root();
                scene.attach_child(root, node).unwrap();
            })
            .unwrap();
    });
    worker.join().unwrap();

    let root = display.engine().scene().root();
    let before = display.engine().scene().num_children(root).unwrap();
    let stats = display.frame(FRAME).unwrap();
    assert_eq!(stats.tasks_applied, 1);
    assert_eq!(display.engine().scene().num_children(root).unwrap(), before + 1);
}
