//! Demo sprite state and toy physics.

use nalgebra::Vector2;
use rand::Rng;
use sprite_engine::TextureHandle;

/// Animation frames of the sprite atlas: x, y, width, height in pixels.
pub const FRAMES: [[f32; 4]; 4] = [
    [0.0, 0.0, 32.0, 32.0],
    [0.0, 32.0, 32.0, 32.0],
    [0.0, 64.0, 32.0, 32.0],
    [0.0, 96.0, 32.0, 32.0],
];

/// The uploaded sprite atlas and its pixel dimensions.
#[derive(Debug, Clone, Copy)]
pub struct Atlas {
    pub texture: TextureHandle,
    pub width: f32,
    pub height: f32,
}

/// One bouncing sprite.
#[derive(Debug)]
pub struct Sprite {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub half_width: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub texture: TextureHandle,
}

impl Sprite {
    pub fn new(position: Vector2<f32>, atlas: &Atlas, frame: [f32; 4]) -> Self {
        let [fx, fy, fw, fh] = frame;
        let u0 = fx / atlas.width;
        let v0 = fy / atlas.height;
        Self {
            position,
            velocity: Vector2::zeros(),
            rotation: 0.0,
            width: fw,
            height: fh,
            half_width: fw / 2.0,
            u0,
            v0,
            u1: u0 + fw / atlas.width,
            v1: v0 + fh / atlas.height,
            texture: atlas.texture,
        }
    }

    /// Integrate one frame: gravity, then wall/floor/ceiling bounces.
    pub fn update(&mut self, gravity: f32, bounds: Vector2<f32>, rng: &mut impl Rng) {
        self.position += self.velocity;
        self.velocity.y += gravity;

        if self.position.x > bounds.x {
            self.velocity.x *= -1.0;
            self.position.x = bounds.x;
        } else if self.position.x < 0.0 {
            self.velocity.x *= -1.0;
            self.position.x = 0.0;
        }

        if self.position.y > bounds.y {
            self.velocity.y *= -0.85;
            self.position.y = bounds.y;
            self.rotation = (rng.gen::<f32>() - 0.5) * 0.2;
            if rng.gen::<f32>() > 0.5 {
                self.velocity.y -= rng.gen::<f32>() * 6.0;
            }
        } else if self.position.y < 0.0 {
            self.velocity.y = 0.0;
            self.position.y = 0.0;
        }
    }
}
