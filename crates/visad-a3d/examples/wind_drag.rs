//! Headless demo: drag a wind barb and play a short animation.
//!
//! Run with `RUST_LOG=debug` to see the drag and recycle tracing.

use std::sync::Arc;
use std::time::Duration;

use visad_a3d::*;

fn marker(_: &FrameContext<'_>, p: &Vec3) -> std::result::Result<GeometryArray, FrameTransformError> {
    Ok(GeometryArray {
        lines: vec![*p, *p + Vec3::Y * 0.1],
        color: [0.2, 0.8, 1.0, 1.0],
        ..GeometryArray::default()
    })
}

fn main() -> Result<()> {
    let options = Options {
        no_numbers: false,
        num_dec_places: 1,
        ..Options::default()
    };
    let mut display = Display3D::new(init(options)?, 800, 800)?;

    let station = Arc::new(DataReferenceImpl::with_data(
        "station",
        DataTuple::new(vec![
            Real::new(RealType::new("x"), 0.0),
            Real::new(RealType::new("y"), 0.0),
            Real::new(RealType::with_unit("u", Unit::meters_per_second()), 3.0),
            Real::new(RealType::with_unit("v", Unit::meters_per_second()), 4.0),
        ]),
    ));
    let mappings = DisplayMappings::new()
        .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
        .with(ScalarMap::new(RealType::new("y"), DisplayRealType::YAxis))
        .with(
            ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1X)
                .with_override_unit(Unit::knots()),
        )
        .with(
            ScalarMap::new(RealType::new("v"), DisplayRealType::Flow1Y)
                .with_override_unit(Unit::knots()),
        );
    let barb = display.add_barbs(
        station.clone(),
        mappings,
        RenderStrategy::DirectManipulation(BarbKind::Wind),
    );
    display.frame(Duration::from_millis(20))?;

    let Some(head) = display
        .barbs(barb)
        .and_then(BarbRenderer::controller)
        .and_then(|c| c.barb_ends())
        .map(|ends| ends.head)
    else {
        println!("barb is not draggable");
        return Ok(());
    };

    // press on the glyph head, then sweep the cursor around the station
    let mut targets = vec![head];
    for step in 1..=8 {
        let angle = std::f32::consts::FRAC_PI_4 * step as f32;
        targets.push(Vec3::new(angle.cos(), angle.sin(), 0.0) * 0.5);
    }
    for (i, target) in targets.iter().enumerate() {
        let Some(pixel) = display.camera().world_to_screen(*target, 800, 800) else {
            continue;
        };
        let diagnostics = if i == 0 {
            display.mouse_press(PointerButton::Left, pixel, Modifiers::NONE)?
        } else {
            display.mouse_drag(pixel, Modifiers::NONE)?
        };
        display.frame(Duration::from_millis(20))?;
        println!("{}", diagnostics.cursor_strings.join(", "));
    }
    display.mouse_release(PointerButton::Left)?;

    let animation = display.add_shadow(ShadowKind::FunctionOrSet(AnimationMode::Animation), "markers");
    let samples: Vec<(f64, Vec3)> = (0..10)
        .map(|i| (f64::from(i), Vec3::new(i as f32 * 0.1 - 0.5, -0.5, 0.0)))
        .collect();
    display.transform(animation, &samples, &marker)?;
    if let Some(control) = display.animation_mut(animation) {
        control.set_running(true);
    }
    for _ in 0..100 {
        display.frame(Duration::from_millis(20))?;
    }
    if let Some(control) = display.animation(animation) {
        println!("animation at frame {} of {}", control.current(), control.frame_count());
    }

    shutdown(display.into_engine());
    Ok(())
}
