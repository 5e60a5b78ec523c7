//! Demo configuration.

use serde::{Deserialize, Serialize};
use sprite_engine::config::Config;

/// Settings for a bunnymark run, loadable from `bunnymark.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Viewport width in pixels.
    pub window_width: u32,
    /// Viewport height in pixels.
    pub window_height: u32,
    /// Downward acceleration per frame.
    pub gravity: f32,
    /// Sprites spawned before the first frame.
    pub start_count: usize,
    /// Sprites added per spawning frame.
    pub spawn_amount: usize,
    /// Hard cap on the sprite population.
    pub max_sprites: usize,
    /// Total frames to simulate.
    pub frames: u32,
    /// Leading frames during which spawning is active (stands in for the
    /// original demo's held-down mouse button).
    pub spawn_frames: u32,
    /// Optional path to a sprite atlas image; a solid placeholder is used
    /// when absent.
    pub texture_path: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            gravity: 0.85,
            start_count: 3,
            spawn_amount: 10,
            max_sprites: 200_000,
            frames: 600,
            spawn_frames: 300,
            texture_path: None,
        }
    }
}

impl Config for DemoConfig {}
