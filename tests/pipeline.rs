use fractal_canvas::{
    Animation, C, Color, CommandLog, DrawCommand, FbmParams, FractalError, FractalKind, KochShape,
    NoiseField, PixelSurface, Rect, RenderRequest, Renderer, Style, TickStatus, escape_iterations,
    koch, sierpinski,
};

fn request(kind: FractalKind, level: u32, animation: Animation) -> RenderRequest {
    RenderRequest {
        kind,
        level,
        area: Rect::new(48.0, 48.0, 624.0, 624.0),
        style: Style::default(),
        animation,
    }
}

fn lines(log: &CommandLog) -> Vec<(f64, f64, f64, f64)> {
    log.drawn()
        .map(|c| match c {
            DrawCommand::Line { a, b, .. } => (a.x, a.y, b.x, b.y),
            other => panic!("expected a line, got {other:?}"),
        })
        .collect()
}

#[test]
fn koch_snowflake_depth_zero_is_the_base_triangle() {
    let segments = koch::generate(KochShape::Snowflake, 0).unwrap();
    assert_eq!(segments.len(), 3);
    assert!((koch::total_length(&segments) - 3.0).abs() < 1e-12);

    let mut renderer = Renderer::default();
    let mut log = CommandLog::new();
    let summary = renderer
        .render(&request(FractalKind::KochSnowflake, 0, Animation::default()), &mut log)
        .unwrap();
    assert_eq!(summary.elements, 3);
    assert_eq!(lines(&log).len(), 3);
}

#[test]
fn koch_snowflake_depth_three() {
    let segments = koch::generate(KochShape::Snowflake, 3).unwrap();
    assert_eq!(segments.len(), 192);
    let expected = 3.0 * (4.0f64 / 3.0).powi(3);
    assert!((koch::total_length(&segments) - expected).abs() < 1e-9);
    assert!((koch::total_length(&segments) - 7.111).abs() < 1e-3);
}

#[test]
fn sierpinski_depth_two_fills_nine_triangles() {
    assert_eq!(sierpinski::generate(sierpinski::base_triangle(), 2).unwrap().len(), 9);
    let mut renderer = Renderer::default();
    let mut log = CommandLog::new();
    renderer
        .render(&request(FractalKind::Sierpinski, 2, Animation::default()), &mut log)
        .unwrap();
    let fills = log.drawn().filter(|c| matches!(c, DrawCommand::FillPolygon { .. })).count();
    assert_eq!(fills, 9);
}

#[test]
fn mandelbrot_origin_never_escapes() {
    assert_eq!(escape_iterations(C::new(0.0, 0.0), 100), 100);
}

#[test]
fn noise_field_is_reproducible() {
    let params = FbmParams { octaves: 1, seed: 1234, ..Default::default() };
    let a = NoiseField::generate(64, 48, params).unwrap();
    let b = NoiseField::generate(64, 48, params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn animated_and_instant_renders_draw_the_same_sequence() {
    for kind in [FractalKind::KochSnowflake, FractalKind::FractalTree, FractalKind::PythagorasTree] {
        let mut instant = CommandLog::new();
        Renderer::default()
            .render(&request(kind, 5, Animation { enabled: false, speed: 5 }), &mut instant)
            .unwrap();

        for speed in [1, 4, 10] {
            let mut renderer = Renderer::default();
            let mut animated = CommandLog::new();
            let summary = renderer
                .render(&request(kind, 5, Animation { enabled: true, speed }), &mut animated)
                .unwrap();
            assert!(summary.first_tick.is_none());
            let mut ticks = 0;
            loop {
                let report = renderer.tick(&mut animated);
                ticks += 1;
                if report.status == TickStatus::Done {
                    break;
                }
                assert_eq!(report.status, TickStatus::Pending);
            }
            assert!(ticks > 1, "{kind} at speed {speed} finished in one tick");
            assert_eq!(animated.commands, instant.commands, "{kind} at speed {speed}");
        }
    }
}

#[test]
fn rerender_cancels_the_previous_sequence() {
    let mut renderer = Renderer::default();
    let mut log = CommandLog::new();
    let slow = Animation { enabled: true, speed: 0 };
    let first = renderer.render(&request(FractalKind::KochSnowflake, 6, slow), &mut log).unwrap();
    renderer.tick(&mut log);

    let second = renderer.render(&request(FractalKind::Sierpinski, 3, slow), &mut log).unwrap();
    let before = log.len();
    assert_eq!(renderer.tick_token(first.token, &mut log).status, TickStatus::Cancelled);
    assert_eq!(log.len(), before);

    // the new render starts with its own clear
    assert!(matches!(log.commands[before - 1], DrawCommand::Clear { .. }));
    renderer.finish(&mut log);
    let after_clear = &log.commands[before..];
    assert_eq!(after_clear.len(), second.elements);
    assert!(after_clear.iter().all(|c| matches!(c, DrawCommand::FillPolygon { .. })));
}

#[test]
fn base_case_is_reported_once_for_trees() {
    let mut renderer = Renderer::default();
    let mut log = CommandLog::new();
    renderer
        .render(&request(FractalKind::FractalTree, 6, Animation { enabled: true, speed: 3 }), &mut log)
        .unwrap();
    let mut reached = 0;
    loop {
        let report = renderer.tick(&mut log);
        if report.base_reached {
            reached += 1;
            // pre-order: the first leaf follows the leftmost branch of 6 parents
            assert!(report.cursor >= 7);
        }
        if report.status == TickStatus::Done {
            break;
        }
    }
    assert_eq!(reached, 1);
}

#[test]
fn out_of_range_levels_fail_fast() {
    let mut renderer = Renderer::default();
    let mut log = CommandLog::new();
    let err = renderer
        .render(&request(FractalKind::NoiseTerrain, 9, Animation::default()), &mut log)
        .unwrap_err();
    assert!(matches!(err, FractalError::InvalidParameter(_)));
    assert!(log.is_empty());
}

#[test]
fn pixel_surface_shows_rendered_fractals() {
    let bg = Style::default().background_color;
    for kind in FractalKind::ALL {
        let mut surface = PixelSurface::new(160, 160, Color::WHITE).unwrap();
        let mut renderer = Renderer::default();
        let req = RenderRequest {
            kind,
            level: kind.default_level().min(kind.level_range().1),
            area: Rect::new(0.0, 0.0, 160.0, 160.0),
            style: Style::default(),
            animation: Animation::default(),
        };
        renderer.render(&req, &mut surface).unwrap();
        let pixels = surface.buffer().pixels();
        assert!(pixels.iter().all(|&p| p != Color::WHITE.0 || kind.is_raster()), "{kind} left uncleared pixels");
        assert!(pixels.iter().any(|&p| p != bg.0), "{kind} drew nothing");
    }
}
