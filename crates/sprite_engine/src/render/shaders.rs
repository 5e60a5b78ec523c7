//! Built-in sprite shader sources.
//!
//! The vertex stage rebuilds the sprite transform per vertex: the local
//! corner position is scaled, rotated, then moved to the translation pivot,
//! and finally mapped from pixel coordinates (origin top-left) to clip space
//! using the `screen` uniform. Attribute declaration order matches the
//! 40-byte interleaved vertex layout written by the staging buffer.

/// Default sprite vertex shader.
pub const SPRITE_VERTEX_SHADER: &str = "
precision mediump float;
attribute float rotation;
attribute vec2 translation;
attribute vec2 scaling;
attribute vec2 position;
attribute vec2 uvs;
attribute vec4 color;
uniform vec2 screen;
varying vec2 v_uv;
varying vec4 v_color;
void main() {
    float c = cos(rotation);
    float s = sin(rotation);
    vec2 scaled = position * scaling;
    vec2 rotated = vec2(scaled.x * c - scaled.y * s, scaled.x * s + scaled.y * c);
    vec2 pixel = rotated + translation;
    vec2 clip = (pixel / screen) * 2.0 - 1.0;
    gl_Position = vec4(clip.x, -clip.y, 0.0, 1.0);
    v_uv = uvs;
    v_color = color;
}
";

/// Default sprite fragment shader.
pub const SPRITE_FRAGMENT_SHADER: &str = "
precision mediump float;
varying vec2 v_uv;
varying vec4 v_color;
uniform sampler2D sampler;
void main() {
    gl_FragColor = texture2D(sampler, v_uv) * v_color;
}
";
