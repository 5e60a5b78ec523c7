//! Bunnymark: sprite batching stress demo.
//!
//! Spawns waves of sprites under toy physics (gravity plus wall and floor
//! bounces) and draws the whole population through the batching renderer
//! every frame, running headless against the recording backend. The run
//! summary shows how many GPU submissions the batcher needed for the
//! workload.

mod config;
mod sprite;

use nalgebra::Vector2;
use rand::Rng;
use sprite_engine::assets::ImageData;
use sprite_engine::backend::{FilterMode, HeadlessBackend, WrapMode};
use sprite_engine::config::Config;
use sprite_engine::render::BatchRenderer;

use config::DemoConfig;
use sprite::{Atlas, Sprite, FRAMES};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("bunnymark failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DemoConfig::load_or_default("bunnymark.toml")?;
    log::info!(
        "bunnymark: {}x{}, {} frames, spawning {} sprites/frame for {} frames",
        config.window_width,
        config.window_height,
        config.frames,
        config.spawn_amount,
        config.spawn_frames
    );

    let backend = HeadlessBackend::new(config.window_width, config.window_height);
    let mut renderer = BatchRenderer::new(backend)?;

    let image = match &config.texture_path {
        Some(path) => ImageData::from_file(path)?,
        None => ImageData::solid_color(32, 128, [255, 255, 255, 255]),
    };
    let texture =
        image.upload_to(renderer.backend_mut(), WrapMode::ClampToEdge, FilterMode::Nearest)?;
    let atlas = Atlas {
        texture,
        width: image.width as f32,
        height: image.height as f32,
    };

    renderer.set_clear_color(0.227, 0.227, 0.227);

    let bounds = Vector2::new(config.window_width as f32, config.window_height as f32);
    let spawn_point = Vector2::new(bounds.x / 2.0, bounds.y / 4.0);
    let mut rng = rand::thread_rng();
    let mut sprites: Vec<Sprite> = Vec::new();
    let mut current_frame = 0usize;

    spawn(&mut sprites, config.start_count, spawn_point, &atlas, FRAMES[current_frame], &mut rng);

    for frame_number in 0..config.frames {
        if frame_number < config.spawn_frames && sprites.len() < config.max_sprites {
            current_frame = (current_frame + 1) % FRAMES.len();
            spawn(
                &mut sprites,
                config.spawn_amount,
                spawn_point,
                &atlas,
                FRAMES[current_frame],
                &mut rng,
            );
        }

        for s in &mut sprites {
            s.update(config.gravity, bounds, &mut rng);
        }

        renderer.clear();
        for s in &sprites {
            renderer.draw(
                s.texture,
                -s.half_width,
                0.0,
                s.width,
                s.height,
                s.rotation,
                s.position.x,
                s.position.y,
                1.0,
                1.0,
                s.u0,
                s.v0,
                s.u1,
                s.v1,
            );
        }
        renderer.flush();

        if frame_number % 120 == 0 {
            log::info!("frame {frame_number}: {} sprites", sprites.len());
        }
    }

    let stats = renderer.backend().stats();
    log::info!(
        "done: {} sprites over {} frames, {} draw submissions, {} buffer uploads",
        sprites.len(),
        config.frames,
        stats.draw_calls,
        stats.buffer_uploads
    );
    Ok(())
}

fn spawn(
    sprites: &mut Vec<Sprite>,
    amount: usize,
    at: Vector2<f32>,
    atlas: &Atlas,
    frame: [f32; 4],
    rng: &mut impl Rng,
) {
    for _ in 0..amount {
        let mut s = Sprite::new(at, atlas, frame);
        s.velocity = Vector2::new(rng.gen::<f32>() * 10.0, rng.gen::<f32>() * 10.0 - 5.0);
        s.rotation = rng.gen::<f32>() - 0.5;
        sprites.push(s);
    }
}
