//! Canvas recording and replay against the software pipeline.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec4};
use strata_core::{Color, Rect};
use strata_geometry::{Convexity, FillRule, GradientStop, Paint, PathBuilder, PathEffect, Pixmap, Shader};
use strata_render::{Canvas, CanvasConfig, ClipOp, Glyph, GlyphSource};
use strata_test_utils::{CountingGlyphSource, MockPipeline, PipelineCall, fixtures};

fn setup() -> (Arc<MockPipeline>, Canvas) {
    let mock = Arc::new(MockPipeline::new());
    let canvas = Canvas::new(mock.clone(), CanvasConfig::new(100, 100));
    (mock, canvas)
}

fn red() -> Vec4 {
    Color::RED.to_vec4()
}

fn blue() -> Vec4 {
    Color::BLUE.to_vec4()
}

#[test]
fn test_empty_frame_issues_no_calls() {
    let (mock, mut canvas) = setup();
    canvas.save();
    canvas.translate(10.0, 10.0);
    canvas.restore();
    canvas.flush().unwrap();
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_flush_protocol_order() {
    let (mock, mut canvas) = setup();
    canvas.draw_rect(Rect::from_xywh(10.0, 10.0, 20.0, 20.0), &Paint::fill(Color::RED));
    let vertices = canvas.mesh().vertices().len();
    let indices = canvas.mesh().indices().len();
    canvas.flush().unwrap();

    let calls = mock.calls();
    assert_eq!(calls[0], PipelineCall::Bind);
    assert_eq!(
        calls[1],
        PipelineCall::SetViewProjection(CanvasConfig::new(100, 100).view_projection())
    );
    assert_eq!(calls[2], PipelineCall::UploadVertexBuffer { count: vertices });
    assert_eq!(calls[3], PipelineCall::UploadIndexBuffer { count: indices });
    assert_eq!(calls.last(), Some(&PipelineCall::Unbind));
    assert_eq!(mock.count_binds(), 1);
    assert_eq!(mock.count_uploads(), 2);
    assert_eq!(mock.count_draws(), 1);

    // the frame is reset
    assert!(canvas.mesh().is_empty());
    assert_eq!(canvas.pending_ops(), 0);
    assert_eq!(mock.color_at(15, 15), Some(red()));
    assert_eq!(mock.color_at(35, 35), None);
}

#[test]
fn test_save_restore_matrix_round_trip() {
    let (_mock, mut canvas) = setup();
    canvas.translate(3.0, 4.0);
    let before = canvas.total_matrix();

    let count = canvas.save();
    canvas.rotate(33.0);
    canvas.scale(2.0, 0.5);
    canvas.skew(0.25, 0.0);
    canvas.save();
    canvas.rotate_about(45.0, 10.0, 10.0);
    canvas.restore_to_count(count);

    assert_eq!(canvas.total_matrix(), before);
    canvas.reset_matrix();
    assert_eq!(canvas.total_matrix(), Mat4::IDENTITY);
}

#[test]
fn test_nested_clips_leave_no_stencil_bits() {
    let (mock, mut canvas) = setup();
    canvas.save();
    canvas.clip_rect(Rect::from_xywh(10.0, 10.0, 40.0, 40.0), ClipOp::Intersect);
    canvas.save();
    canvas.clip_path(
        &fixtures::star(Vec2::new(40.0, 40.0), 30.0, 12.0, 5),
        ClipOp::Intersect,
    );
    canvas.draw_paint(&Paint::fill(Color::RED));
    canvas.restore();
    canvas.restore();
    canvas.flush().unwrap();

    assert!(mock.stencil_is_clear());
}

#[test]
fn test_restore_reinstates_outer_clip() {
    let (mock, mut canvas) = setup();
    canvas.save();
    canvas.clip_rect(Rect::from_xywh(10.0, 10.0, 40.0, 40.0), ClipOp::Intersect);
    canvas.save();
    canvas.clip_rect(Rect::from_xywh(30.0, 30.0, 40.0, 40.0), ClipOp::Intersect);
    canvas.draw_paint(&Paint::fill(Color::RED));
    canvas.restore();
    canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 20.0, 20.0), &Paint::fill(Color::BLUE));
    canvas.flush().unwrap();

    // intersection of both clips
    assert_eq!(mock.color_at(35, 35), Some(red()));
    assert_eq!(mock.color_at(60, 60), None);
    assert_eq!(mock.color_at(15, 35), None);
    // outer clip only
    assert_eq!(mock.color_at(15, 15), Some(blue()));
    assert_eq!(mock.color_at(5, 5), None);
    assert!(mock.stencil_is_clear());
}

#[test]
fn test_difference_clip() {
    let (mock, mut canvas) = setup();
    canvas.clip_rect(Rect::from_xywh(20.0, 20.0, 40.0, 40.0), ClipOp::Difference);
    canvas.draw_paint(&Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert_eq!(mock.color_at(10, 10), Some(red()));
    assert_eq!(mock.color_at(30, 30), None);
    assert_eq!(mock.color_at(70, 70), Some(red()));
}

#[test]
fn test_nested_difference_clip() {
    let (mock, mut canvas) = setup();
    canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0), ClipOp::Intersect);
    canvas.clip_rect(Rect::from_xywh(20.0, 20.0, 20.0, 20.0), ClipOp::Difference);
    canvas.draw_paint(&Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert_eq!(mock.color_at(10, 10), Some(red()));
    assert_eq!(mock.color_at(30, 30), None);
    assert_eq!(mock.color_at(60, 60), None);
}

#[test]
fn test_clips_do_not_survive_flush() {
    let (mock, mut canvas) = setup();
    canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), ClipOp::Intersect);
    canvas.flush().unwrap();
    assert!(mock.stencil_is_clear());

    canvas.draw_paint(&Paint::fill(Color::RED));
    canvas.flush().unwrap();
    assert_eq!(mock.colored_pixels(), 100 * 100);
}

#[test]
fn test_clipped_stencil_fill() {
    let (mock, mut canvas) = setup();
    canvas.clip_rect(Rect::from_xywh(0.0, 0.0, 50.0, 100.0), ClipOp::Intersect);
    canvas.draw_path(
        &fixtures::star(Vec2::new(50.0, 50.0), 40.0, 15.0, 5),
        &Paint::fill(Color::RED),
    );
    canvas.flush().unwrap();

    assert_eq!(mock.color_at(40, 50), Some(red()));
    assert_eq!(mock.color_at(60, 50), None);
    assert!(mock.stencil_is_clear());
}

#[test]
fn test_convex_and_stencil_fill_cover_same_pixels() {
    let pentagon: Vec<Vec2> = (0..5)
        .map(|i| {
            let angle = i as f32 / 5.0 * std::f32::consts::TAU + 0.3;
            Vec2::new(50.3, 49.7) + Vec2::new(angle.cos(), angle.sin()) * 37.1
        })
        .collect();
    let convex = fixtures::polygon(&pentagon);
    assert!(convex.is_convex());
    let general = convex.clone().with_convexity(Convexity::Concave);

    let coverage = |path| {
        let (mock, mut canvas) = setup();
        canvas.draw_path(&path, &Paint::fill(Color::RED));
        canvas.flush().unwrap();
        assert!(mock.stencil_is_clear());
        mock.coverage()
    };

    let fast = coverage(convex);
    let stenciled = coverage(general);
    assert!(fast.iter().any(|&hit| hit));
    assert_eq!(fast, stenciled);
}

#[test]
fn test_fill_rules() {
    let draw = |rule| {
        let (mock, mut canvas) = setup();
        canvas.draw_path(&fixtures::nested_squares(rule), &Paint::fill(Color::RED));
        canvas.flush().unwrap();
        assert!(mock.stencil_is_clear());
        (mock.color_at(20, 20), mock.color_at(50, 50))
    };

    assert_eq!(draw(FillRule::NonZero), (Some(red()), Some(red())));
    assert_eq!(draw(FillRule::EvenOdd), (Some(red()), None));
}

#[test]
fn test_figure_eight_fills_both_lobes() {
    let (mock, mut canvas) = setup();
    canvas.draw_path(&fixtures::figure_eight(), &Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert_eq!(mock.color_at(10, 50), Some(red()));
    assert_eq!(mock.color_at(90, 50), Some(red()));
    assert_eq!(mock.color_at(50, 10), None);
    assert_eq!(mock.color_at(50, 90), None);
}

#[test]
fn test_stroked_path_blends_once() {
    let (mock, mut canvas) = setup();
    let paint = Paint::stroke(Color::RED, 6.0);
    canvas.draw_path(&fixtures::figure_eight(), &paint);
    canvas.flush().unwrap();

    // stroke pieces overlap at the crossing, the cover still colors it
    assert_eq!(mock.color_at(50, 50), Some(red()));
    assert_eq!(mock.color_at(25, 50), None);
    assert!(mock.stencil_is_clear());
}

#[test]
fn test_rect_stroke_respects_miter_limit() {
    let (mock, mut canvas) = setup();
    let rect = Rect::from_ltrb(20.0, 20.0, 60.0, 60.0);
    let beveled = Paint::stroke(Color::RED, 10.0).with_miter_limit(1.0);

    canvas.draw_path(&fixtures::rect(rect), &beveled);
    canvas.flush().unwrap();
    assert_eq!(mock.color_at(16, 16), None);
    assert_eq!(mock.color_at(40, 17), Some(red()));

    mock.clear_surface();
    canvas.draw_rect(rect, &beveled);
    canvas.flush().unwrap();
    assert_eq!(mock.color_at(16, 16), None);
    assert_eq!(mock.color_at(40, 17), Some(red()));

    mock.clear_surface();
    canvas.draw_rect(rect, &Paint::stroke(Color::RED, 10.0));
    canvas.flush().unwrap();
    assert_eq!(mock.color_at(17, 16), Some(red()));
}

#[test]
fn test_fringe_fades_outside_fill() {
    let mock = Arc::new(MockPipeline::new());
    let config = CanvasConfig::new(100, 100).with_anti_alias(false);
    let mut canvas = Canvas::new(mock.clone(), config);
    let rect = fixtures::rect(Rect::from_ltrb(20.0, 20.0, 60.0, 60.0));

    canvas.draw_path(&rect, &Paint::fill(Color::RED).with_anti_alias(true));
    canvas.flush().unwrap();

    let edge = mock.color_at(19, 40).unwrap();
    assert_eq!(edge.truncate(), red().truncate());
    assert!(edge.w > 0.0 && edge.w < 1.0, "{edge}");
    assert_eq!(mock.color_at(18, 40), None);
    // the inner half of the band is under the cover
    assert_eq!(mock.color_at(20, 40), Some(red()));
    assert_eq!(mock.color_at(40, 40), Some(red()));
    assert!(mock.stencil_is_clear());

    mock.clear_surface();
    canvas.draw_path(&rect, &Paint::fill(Color::RED));
    canvas.flush().unwrap();
    assert_eq!(mock.color_at(19, 40), None);
    assert_eq!(mock.color_at(20, 40), Some(red()));
}

#[test]
fn test_dashed_stroke_leaves_gaps() {
    let (mock, mut canvas) = setup();
    let mut builder = PathBuilder::new();
    builder.move_to(Vec2::new(0.0, 50.0)).line_to(Vec2::new(100.0, 50.0));
    let line = builder.build();
    let paint = Paint::stroke(Color::RED, 4.0)
        .with_path_effect(PathEffect::dash(&[10.0, 10.0], 0.0).unwrap());
    canvas.draw_path(&line, &paint);
    canvas.flush().unwrap();

    for x in [5, 25, 45, 65, 85] {
        assert_eq!(mock.color_at(x, 50), Some(red()), "dash at {x}");
    }
    for x in [15, 35, 55, 75, 95] {
        assert_eq!(mock.color_at(x, 50), None, "gap at {x}");
    }
    assert!(mock.stencil_is_clear());
}

#[test]
fn test_global_alpha_is_per_frame() {
    let (mock, mut canvas) = setup();
    canvas.set_global_alpha(0.25);
    canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), &Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert!(mock.calls().contains(&PipelineCall::SetGlobalAlpha(0.25)));
    assert_eq!(mock.color_at(5, 5), Some(Vec4::new(1.0, 0.0, 0.0, 0.25)));
    assert_eq!(canvas.global_alpha(), 1.0);
}

#[test]
fn test_gradient_uniforms() {
    let (mock, mut canvas) = setup();
    let shader = Shader::linear_gradient(
        Vec2::ZERO,
        Vec2::new(100.0, 0.0),
        vec![
            GradientStop::new(0.0, Color::RED),
            GradientStop::new(1.0, Color::BLUE),
        ],
    );
    let paint = Paint::default().with_shader(shader);
    canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 100.0, 10.0), &paint);
    canvas.flush().unwrap();

    let calls = mock.calls();
    assert!(calls.contains(&PipelineCall::SetColorMode(strata_render::ColorMode::LinearGradient)));
    assert!(calls.contains(&PipelineCall::SetGradientBounds(Vec4::new(0.0, 0.0, 100.0, 0.0))));
    assert!(calls.contains(&PipelineCall::SetGradientCountInfo {
        colors: 2,
        positions: 2
    }));
    assert!(calls.contains(&PipelineCall::SetGradientPositions(vec![0.0, 1.0])));
}

#[test]
fn test_image_textures_are_cached_and_released() {
    let (mock, mut canvas) = setup();
    let pixmap = Arc::new(Pixmap::filled(4, 4, [255, 255, 255, 255]).unwrap());
    let paint = Paint::default().with_shader(Shader::Image(pixmap.clone()));

    for _ in 0..2 {
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), &paint);
        canvas.draw_rect(Rect::from_xywh(20.0, 0.0, 10.0, 10.0), &paint);
        canvas.flush().unwrap();
    }

    assert_eq!(mock.count_texture_creates(), 1);
    assert_eq!(mock.live_textures(), 1);
    assert_eq!(canvas.cached_textures(), 1);
    assert!(mock.calls().contains(&PipelineCall::SetGradientBounds(Vec4::new(
        20.0, 0.0, 30.0, 10.0
    ))));

    drop(canvas);
    assert_eq!(mock.live_textures(), 0);
}

#[test]
fn test_failed_texture_skips_only_that_draw() {
    let (mock, mut canvas) = setup();
    mock.fail_textures(true);
    let pixmap = Arc::new(Pixmap::filled(4, 4, [0, 0, 0, 255]).unwrap());
    canvas.draw_rect(
        Rect::from_xywh(0.0, 0.0, 10.0, 10.0),
        &Paint::default().with_shader(Shader::Image(pixmap)),
    );
    canvas.draw_rect(Rect::from_xywh(20.0, 0.0, 10.0, 10.0), &Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert_eq!(mock.color_at(5, 5), None);
    assert_eq!(mock.color_at(25, 5), Some(red()));
    assert_eq!(canvas.cached_textures(), 0);
}

#[test]
fn test_glyph_outlines_are_cached() {
    let (mock, mut canvas) = setup();
    let counting = Arc::new(CountingGlyphSource::new(10.0));
    let source: Arc<dyn GlyphSource> = counting.clone();
    let glyphs = [
        Glyph::new(1, Vec2::new(10.0, 30.0)),
        Glyph::new(2, Vec2::new(30.0, 30.0)),
        Glyph::new(1, Vec2::new(50.0, 30.0)),
        Glyph::new(0, Vec2::new(70.0, 30.0)),
    ];

    canvas.draw_glyphs(&glyphs, &source, &Paint::fill(Color::RED));
    assert_eq!(canvas.pending_ops(), 3);
    canvas.flush().unwrap();
    canvas.draw_glyphs(&glyphs, &source, &Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert_eq!(counting.lookups(), 3);
    assert_eq!(canvas.cached_glyphs(), 3);
    assert_eq!(mock.color_at(15, 25), Some(red()));
    assert_eq!(mock.color_at(55, 25), Some(red()));
    assert_eq!(mock.color_at(75, 25), None);
    assert_eq!(mock.color_at(15, 35), None);
}

#[test]
fn test_layer_composites_with_alpha() {
    let (mock, mut canvas) = setup();
    for _ in 0..2 {
        canvas.save_layer(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), 0.5);
        canvas.draw_rect(Rect::from_xywh(10.0, 10.0, 10.0, 10.0), &Paint::fill(Color::RED));
        canvas.restore();
        canvas.flush().unwrap();
    }

    assert_eq!(mock.count_render_target_creates(), 1);
    assert_eq!(mock.count_render_target_binds(), 2);
    assert_eq!(mock.color_at(15, 15), Some(Vec4::new(1.0, 0.0, 0.0, 0.5)));
    assert_eq!(mock.color_at(50, 50), None);
    assert_eq!(canvas.cached_render_targets(), 1);

    drop(canvas);
    assert_eq!(mock.live_render_targets(), 0);
}

#[test]
fn test_layer_without_target_draws_inline() {
    let (mock, mut canvas) = setup();
    mock.fail_render_targets(true);
    canvas.save_layer(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), 0.5);
    canvas.draw_rect(Rect::from_xywh(10.0, 10.0, 10.0, 10.0), &Paint::fill(Color::RED));
    canvas.flush().unwrap();

    assert_eq!(mock.count_render_target_binds(), 0);
    assert_eq!(mock.color_at(15, 15), Some(red()));
}

#[test]
fn test_update_viewport_changes_projection() {
    let (mock, mut canvas) = setup();
    canvas.update_viewport(50, 50);
    canvas.draw_paint(&Paint::fill(Color::RED));
    canvas.flush().unwrap();

    let expected = Mat4::orthographic_rh(0.0, 50.0, 50.0, 0.0, -1.0, 1.0);
    assert!(mock.calls().contains(&PipelineCall::SetViewProjection(expected)));
    // the 50x50 canvas is stretched over the 100x100 surface
    assert_eq!(mock.colored_pixels(), 100 * 100);
}
