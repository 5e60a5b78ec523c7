//! The batching renderer: accumulates sprite draws into as few GPU
//! submissions as possible.
//!
//! Callers submit one [`BatchRenderer::draw`] per sprite per frame. Each draw
//! writes four vertices into the staging buffer; staged quads are flushed as
//! a single indexed draw call when the bound texture changes, when the
//! staging buffer is full and another quad arrives, or when the frame driver
//! calls [`BatchRenderer::flush`] at end of frame.

use crate::backend::{
    AttributeKind, BufferHandle, BufferKind, BufferUsage, RenderBackend, TextureHandle,
    VertexAttribute,
};

use super::error::RenderResult;
use super::program::ShaderProgram;
use super::shaders::{SPRITE_FRAGMENT_SHADER, SPRITE_VERTEX_SHADER};
use super::staging::{
    QuadAttributes, StagingBuffer, INDICES_PER_QUAD, MAX_BATCH_QUADS, VERTEX_STRIDE_BYTES,
    VERTICES_PER_QUAD,
};

/// Pack four color channels in [0, 1] into one RGBA word.
///
/// Byte order matches the vertex color attribute: r, g, b, a ascending in
/// memory on little-endian targets.
pub fn pack_rgba(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    to_byte(r) | to_byte(g) << 8 | to_byte(b) << 16 | to_byte(a) << 24
}

/// Immediate-mode 2D sprite renderer over a pluggable backend.
///
/// Owns the backend, the GPU vertex/index buffers, the shader program, and
/// all batching state (write cursor, current texture, colors). Single
/// threaded by contract: the frame driver calls `clear`, a sequence of
/// `draw`s, then `flush`, once per frame, all on the thread owning the
/// backend.
pub struct BatchRenderer<B: RenderBackend> {
    backend: B,
    program: ShaderProgram,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    staging: StagingBuffer,
    /// Quads staged since the last flush.
    count: u32,
    /// Retained across flushes so a frame starting with the same texture
    /// does not rebind it.
    current_texture: Option<TextureHandle>,
    clear_color: [f32; 3],
    draw_color: u32,
}

impl<B: RenderBackend> BatchRenderer<B> {
    /// Construct a renderer with the maximum batch capacity (10922 quads,
    /// the most addressable with 16-bit indices).
    pub fn new(backend: B) -> RenderResult<Self> {
        Self::with_capacity(backend, MAX_BATCH_QUADS)
    }

    /// Construct a renderer with an explicit batch capacity in quads.
    ///
    /// # Panics
    /// If `capacity_quads` is zero or exceeds [`MAX_BATCH_QUADS`].
    pub fn with_capacity(mut backend: B, capacity_quads: u32) -> RenderResult<Self> {
        assert!(
            (1..=MAX_BATCH_QUADS).contains(&capacity_quads),
            "capacity must be in 1..={MAX_BATCH_QUADS}, got {capacity_quads}"
        );

        let program =
            ShaderProgram::compile(&mut backend, SPRITE_VERTEX_SHADER, SPRITE_FRAGMENT_SHADER)?;

        // Static index buffer, built once: quad i occupies vertex base 4i and
        // its two triangles are (v0, v1, v2) and (v0, v3, v1).
        let indices = quad_indices(capacity_quads);
        let index_bytes: &[u8] = bytemuck::cast_slice(&indices);
        let index_buffer =
            match backend.create_buffer(BufferKind::Index, index_bytes.len(), BufferUsage::Static) {
                Ok(buffer) => buffer,
                Err(err) => {
                    backend.delete_program(program.handle());
                    return Err(err);
                }
            };
        backend.upload_bytes(index_buffer, 0, index_bytes);

        let vertex_bytes = capacity_quads as usize * VERTICES_PER_QUAD * VERTEX_STRIDE_BYTES;
        let vertex_buffer =
            match backend.create_buffer(BufferKind::Vertex, vertex_bytes, BufferUsage::Dynamic) {
                Ok(buffer) => buffer,
                Err(err) => {
                    backend.delete_buffer(index_buffer);
                    backend.delete_program(program.handle());
                    return Err(err);
                }
            };

        backend.use_program(program.handle());
        let layout = vertex_layout(&program);
        backend.set_vertex_layout(vertex_buffer, &layout);

        let (width, height) = backend.viewport_size();
        if let Some(screen) = program.uniform("screen") {
            backend.set_uniform_vec2(screen.location, width as f32, height as f32);
        }
        if let Some(sampler) = program.uniform("sampler") {
            backend.set_uniform_i32(sampler.location, 0);
        }

        log::info!(
            "sprite renderer ready: {capacity_quads} quads per batch, {width}x{height} viewport"
        );

        Ok(Self {
            backend,
            program,
            vertex_buffer,
            index_buffer,
            staging: StagingBuffer::new(capacity_quads),
            count: 0,
            current_texture: None,
            clear_color: [0.0, 0.0, 0.0],
            draw_color: pack_rgba(1.0, 1.0, 1.0, 1.0),
        })
    }

    /// Store the clear color. No GPU call happens until [`Self::clear`].
    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32) {
        self.clear_color = [r, g, b];
    }

    /// Clear the framebuffer with the stored color at full opacity.
    pub fn clear(&mut self) {
        let [r, g, b] = self.clear_color;
        self.backend.clear_screen([r, g, b, 1.0]);
    }

    /// Set the tint applied to every subsequent [`Self::draw`] call.
    ///
    /// The default is opaque white (no tint).
    pub fn set_draw_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.draw_color = pack_rgba(r, g, b, a);
    }

    /// Packed form of the current draw color.
    pub fn draw_color(&self) -> u32 {
        self.draw_color
    }

    /// Submit one sprite.
    ///
    /// `x`/`y`/`width`/`height` give the local quad rectangle, rotated by
    /// `rotation` around the origin after scaling by `scale_x`/`scale_y`,
    /// then placed at the `pivot_x`/`pivot_y` pivot in pixels. `u0,v0`..`u1,v1`
    /// select the texture sub-rectangle.
    ///
    /// If `texture` differs from the currently bound one, or the staging
    /// buffer is full, the pending batch is flushed first; the quad itself is
    /// always staged.
    pub fn draw(
        &mut self,
        texture: TextureHandle,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation: f32,
        pivot_x: f32,
        pivot_y: f32,
        scale_x: f32,
        scale_y: f32,
        u0: f32,
        v0: f32,
        u1: f32,
        v1: f32,
    ) {
        if self.current_texture != Some(texture) {
            self.flush();
            self.current_texture = Some(texture);
            self.backend.bind_texture(texture);
        } else if self.count == self.staging.capacity_quads() {
            self.flush();
        }

        // Corner/UV correspondence is fixed: top-left, bottom-right,
        // bottom-left, top-right. Swapping it mirrors the texture.
        let quad = QuadAttributes {
            rotation,
            translation: [pivot_x, pivot_y],
            scale: [scale_x, scale_y],
            corners: [
                [x, y],
                [x + width, y + height],
                [x, y + height],
                [x + width, y],
            ],
            uvs: [[u0, v0], [u1, v1], [u0, v1], [u1, v0]],
            color: self.draw_color,
        };
        self.staging.write_quad(self.count, &quad);
        self.count += 1;
    }

    /// Upload the staged quads and issue one indexed draw call, then reset
    /// the write cursor. No-op when nothing is staged.
    pub fn flush(&mut self) {
        if self.count == 0 {
            return;
        }
        let bytes = self.staging.bytes(self.count);
        self.backend.upload_bytes(self.vertex_buffer, 0, bytes);
        self.backend.draw_indexed(self.count * INDICES_PER_QUAD as u32);
        self.count = 0;
    }

    /// Update the screen-size uniform after the drawable was resized.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(screen) = self.program.uniform("screen") {
            self.backend.set_uniform_vec2(screen.location, width as f32, height as f32);
        }
    }

    /// Quads staged since the last flush.
    pub fn pending_quads(&self) -> u32 {
        self.count
    }

    pub fn capacity_quads(&self) -> u32 {
        self.staging.capacity_quads()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The staging buffer, for inspecting staged bytes.
    pub fn staging(&self) -> &StagingBuffer {
        &self.staging
    }

    /// Handle of the static quad index buffer.
    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }

    /// Handle of the dynamic vertex buffer.
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }
}

impl<B: RenderBackend> Drop for BatchRenderer<B> {
    fn drop(&mut self) {
        self.backend.delete_buffer(self.vertex_buffer);
        self.backend.delete_buffer(self.index_buffer);
        self.backend.delete_program(self.program.handle());
    }
}

/// Index pattern for `capacity` quads: (4i, 4i+1, 4i+2, 4i, 4i+3, 4i+1).
fn quad_indices(capacity_quads: u32) -> Vec<u16> {
    let mut indices = Vec::with_capacity(capacity_quads as usize * INDICES_PER_QUAD);
    for i in 0..capacity_quads {
        let base = (i * VERTICES_PER_QUAD as u32) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 3, base + 1]);
    }
    indices
}

/// Resolve the interleaved 40-byte vertex layout against the program's
/// active attributes. Attributes the program does not expose are omitted.
fn vertex_layout(program: &ShaderProgram) -> Vec<VertexAttribute> {
    const FIELDS: [(&str, u8, AttributeKind, usize); 6] = [
        ("rotation", 1, AttributeKind::Float, 0),
        ("translation", 2, AttributeKind::Float, 4),
        ("scaling", 2, AttributeKind::Float, 12),
        ("position", 2, AttributeKind::Float, 20),
        ("uvs", 2, AttributeKind::Float, 28),
        ("color", 4, AttributeKind::UnsignedByte, 36),
    ];
    FIELDS
        .iter()
        .filter_map(|&(name, components, kind, offset)| {
            program.attribute(name).map(|info| VertexAttribute {
                location: info.location,
                components,
                kind,
                stride: VERTEX_STRIDE_BYTES,
                offset,
            })
        })
        .collect()
}
