//! State-machine tests for the batching renderer, driven through the
//! recording headless backend.

use crate::backend::{FilterMode, HeadlessBackend, RenderBackend, TextureHandle, WrapMode};

use super::batch::{pack_rgba, BatchRenderer};
use super::error::RenderError;
use super::staging::{VERTEX_STRIDE_BYTES, VERTEX_STRIDE_WORDS, VERTICES_PER_QUAD};

fn renderer(capacity: u32) -> BatchRenderer<HeadlessBackend> {
    BatchRenderer::with_capacity(HeadlessBackend::new(640, 480), capacity).unwrap()
}

fn make_texture(renderer: &mut BatchRenderer<HeadlessBackend>) -> TextureHandle {
    renderer
        .backend_mut()
        .create_texture(WrapMode::ClampToEdge, FilterMode::Nearest)
        .unwrap()
}

fn draw_sprite(renderer: &mut BatchRenderer<HeadlessBackend>, texture: TextureHandle) {
    renderer.draw(
        texture, -16.0, 0.0, 32.0, 32.0, 0.0, 100.0, 100.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0,
    );
}

#[test]
fn full_batch_flushes_on_next_draw() {
    let mut r = renderer(4);
    let tex = make_texture(&mut r);

    // The staging buffer may legally fill to exactly `capacity` quads.
    for _ in 0..4 {
        draw_sprite(&mut r, tex);
    }
    assert_eq!(r.backend().stats().draw_calls, 0);
    assert_eq!(r.pending_quads(), 4);

    // The (capacity+1)-th draw forces the implicit flush before staging.
    draw_sprite(&mut r, tex);
    let submissions = r.backend().submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].index_count, 24);
    assert_eq!(r.pending_quads(), 1);
}

#[test]
fn capacity_draws_then_flush_is_one_submission() {
    let mut r = renderer(4);
    let tex = make_texture(&mut r);
    for _ in 0..4 {
        draw_sprite(&mut r, tex);
    }
    r.flush();

    let submissions = r.backend().submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].index_count, 24);
    assert_eq!(submissions[0].texture, Some(tex));
    assert_eq!(r.pending_quads(), 0);
}

#[test]
fn alternating_textures_flush_every_draw() {
    let mut r = renderer(16);
    let tex_a = make_texture(&mut r);
    let tex_b = make_texture(&mut r);

    for i in 0..6 {
        let tex = if i % 2 == 0 { tex_a } else { tex_b };
        draw_sprite(&mut r, tex);
    }
    r.flush();

    // Every call after the first saw a texture change, so submission count
    // equals call count, one quad each.
    let submissions = r.backend().submissions();
    assert_eq!(submissions.len(), 6);
    for (i, submission) in submissions.iter().enumerate() {
        assert_eq!(submission.index_count, 6);
        let expected = if i % 2 == 0 { tex_a } else { tex_b };
        assert_eq!(submission.texture, Some(expected));
    }
}

#[test]
fn flush_with_empty_batch_is_a_noop() {
    let mut r = renderer(8);
    let baseline = r.backend().stats();

    r.flush();
    r.flush();

    let stats = r.backend().stats();
    assert_eq!(stats.buffer_uploads, baseline.buffer_uploads);
    assert_eq!(stats.draw_calls, 0);
}

#[test]
fn capacity_two_scenario_totals_eighteen_indices() {
    let mut r = renderer(2);
    let tex = make_texture(&mut r);

    draw_sprite(&mut r, tex);
    draw_sprite(&mut r, tex);
    assert_eq!(r.backend().stats().draw_calls, 0);

    // Third draw does not fit: implicit flush of the 2 staged quads first.
    draw_sprite(&mut r, tex);
    let submissions = r.backend().submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].index_count, 12);
    assert_eq!(submissions[0].texture, Some(tex));
    assert_eq!(r.pending_quads(), 1);

    r.flush();
    let submissions = r.backend().submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[1].index_count, 6);
    let total: u32 = submissions.iter().map(|s| s.index_count).sum();
    assert_eq!(total, 18);
}

#[test]
fn draw_color_reaches_every_vertex_slot() {
    let mut r = renderer(8);
    let tex = make_texture(&mut r);

    r.set_draw_color(0.5, 0.25, 1.0, 1.0);
    let packed = r.draw_color();
    assert_eq!(packed, pack_rgba(0.5, 0.25, 1.0, 1.0));

    draw_sprite(&mut r, tex);
    draw_sprite(&mut r, tex);

    for quad in 0..2 {
        for vertex in 0..VERTICES_PER_QUAD {
            let w = (quad * VERTICES_PER_QUAD + vertex) * VERTEX_STRIDE_WORDS + 9;
            assert_eq!(r.staging().word_at(w), packed, "quad {quad} vertex {vertex}");
        }
    }
}

#[test]
fn default_draw_color_is_opaque_white() {
    let r = renderer(1);
    assert_eq!(r.draw_color(), 0xFFFF_FFFF);
    assert_eq!(pack_rgba(0.0, 0.0, 0.0, 0.0), 0);
}

#[test]
fn index_buffer_holds_fixed_quad_pattern() {
    let mut r = renderer(5);
    let tex = make_texture(&mut r);

    let check = |r: &BatchRenderer<HeadlessBackend>| {
        let bytes = r.backend().buffer_bytes(r.index_buffer()).unwrap();
        let indices: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(indices.len(), 30);
        for i in 0..5u16 {
            let base = i * 4;
            assert_eq!(
                &indices[(i as usize) * 6..(i as usize) * 6 + 6],
                &[base, base + 1, base + 2, base, base + 3, base + 1]
            );
        }
    };

    check(&r);

    // Draw traffic never rewrites the index buffer.
    for _ in 0..7 {
        draw_sprite(&mut r, tex);
    }
    r.flush();
    check(&r);
}

#[test]
fn texture_binding_is_retained_across_flush() {
    let mut r = renderer(8);
    let tex = make_texture(&mut r);

    draw_sprite(&mut r, tex);
    r.flush();
    draw_sprite(&mut r, tex);
    r.flush();

    let stats = r.backend().stats();
    assert_eq!(stats.texture_binds, 1);
    assert_eq!(stats.draw_calls, 2);
}

#[test]
fn flush_uploads_exactly_the_staged_bytes() {
    let mut r = renderer(8);
    let tex = make_texture(&mut r);

    r.draw(tex, -8.0, 0.0, 16.0, 16.0, 0.5, 10.0, 20.0, 1.0, 1.0, 0.0, 0.0, 0.5, 0.5);
    r.draw(tex, -4.0, 0.0, 8.0, 8.0, -0.5, 30.0, 40.0, 2.0, 2.0, 0.5, 0.5, 1.0, 1.0);
    r.flush();

    let staged_len = 2 * VERTICES_PER_QUAD * VERTEX_STRIDE_BYTES;
    let uploaded = r.backend().buffer_bytes(r.vertex_buffer()).unwrap();
    assert_eq!(&uploaded[..staged_len], r.staging().bytes(2));
}

#[test]
fn quad_geometry_follows_fixed_corner_uv_pairing() {
    let mut r = renderer(4);
    let tex = make_texture(&mut r);

    let (x, y, w, h) = (-16.0f32, 0.0f32, 32.0f32, 48.0f32);
    let (u0, v0, u1, v1) = (0.1f32, 0.2f32, 0.6f32, 0.9f32);
    r.draw(tex, x, y, w, h, 0.3, 120.0, 90.0, 1.0, 2.0, u0, v0, u1, v1);

    let expected_corners = [[x, y], [x + w, y + h], [x, y + h], [x + w, y]];
    let expected_uvs = [[u0, v0], [u1, v1], [u0, v1], [u1, v0]];
    for vertex in 0..VERTICES_PER_QUAD {
        let base = vertex * VERTEX_STRIDE_WORDS;
        assert_eq!(r.staging().float_at(base), 0.3);
        assert_eq!(r.staging().float_at(base + 1), 120.0);
        assert_eq!(r.staging().float_at(base + 2), 90.0);
        assert_eq!(r.staging().float_at(base + 3), 1.0);
        assert_eq!(r.staging().float_at(base + 4), 2.0);
        assert_eq!(r.staging().float_at(base + 5), expected_corners[vertex][0]);
        assert_eq!(r.staging().float_at(base + 6), expected_corners[vertex][1]);
        assert_eq!(r.staging().float_at(base + 7), expected_uvs[vertex][0]);
        assert_eq!(r.staging().float_at(base + 8), expected_uvs[vertex][1]);
    }
}

#[test]
fn clear_issues_no_draw_work() {
    let mut r = renderer(4);
    r.set_clear_color(0.227, 0.227, 0.227);
    r.clear();

    let stats = r.backend().stats();
    assert_eq!(stats.clears, 1);
    assert_eq!(stats.draw_calls, 0);
}

#[test]
fn resize_updates_the_screen_uniform() {
    let mut r = renderer(4);

    // Construction set the screen uniform from the viewport and the sampler
    // to unit 0.
    let log = r.backend().uniform_vec2_log();
    assert_eq!(log.len(), 1);
    let (screen, initial) = log[0];
    assert_eq!(initial, [640.0, 480.0]);
    assert_eq!(r.backend().uniform_i32_log().len(), 1);

    r.resize(1024, 768);
    let log = r.backend().uniform_vec2_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1], (screen, [1024.0, 768.0]));
}

#[test]
fn index_buffer_allocation_failure_releases_program() {
    let mut backend = HeadlessBackend::new(640, 480);
    backend.fail_buffer_allocation_after(0);

    let Err(err) = BatchRenderer::with_capacity(&mut backend, 4) else {
        panic!("expected allocation failure");
    };
    assert!(matches!(err, RenderError::Allocation(_)));

    let stats = backend.stats();
    assert_eq!(stats.shaders_created, stats.shaders_deleted);
    assert_eq!(stats.programs_created, 1);
    assert_eq!(stats.programs_deleted, 1);
    assert_eq!(stats.buffers_created, 0);
}

#[test]
fn vertex_buffer_allocation_failure_releases_program_and_index_buffer() {
    let mut backend = HeadlessBackend::new(640, 480);
    backend.fail_buffer_allocation_after(1);

    let Err(err) = BatchRenderer::with_capacity(&mut backend, 4) else {
        panic!("expected allocation failure");
    };
    assert!(matches!(err, RenderError::Allocation(_)));

    let stats = backend.stats();
    assert_eq!(stats.shaders_created, stats.shaders_deleted);
    assert_eq!(stats.programs_created, stats.programs_deleted);
    assert_eq!(stats.buffers_created, 1);
    assert_eq!(stats.buffers_deleted, 1);
}

#[test]
#[should_panic(expected = "capacity must be in")]
fn zero_capacity_is_a_programming_error() {
    let _ = BatchRenderer::with_capacity(HeadlessBackend::new(64, 64), 0);
}
