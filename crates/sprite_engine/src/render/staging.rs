//! CPU-side staging buffer mirroring the GPU vertex buffer layout.

/// Bytes per vertex: 1 rotation float + four vec2 floats + one packed color word.
pub const VERTEX_STRIDE_BYTES: usize = 40;
/// 32-bit words per vertex.
pub const VERTEX_STRIDE_WORDS: usize = VERTEX_STRIDE_BYTES / 4;
/// Vertices per sprite quad.
pub const VERTICES_PER_QUAD: usize = 4;
/// Indices per sprite quad (two triangles).
pub const INDICES_PER_QUAD: usize = 6;
/// Largest batch addressable with 16-bit indices: floor(2^16 / 6).
pub const MAX_BATCH_QUADS: u32 = (1 << 16) / INDICES_PER_QUAD as u32;

/// Attributes of one staged quad.
///
/// `rotation`, `translation`, `scale`, and `color` are shared by all four
/// vertices; `corners` and `uvs` differ per corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadAttributes {
    pub rotation: f32,
    pub translation: [f32; 2],
    pub scale: [f32; 2],
    pub corners: [[f32; 2]; 4],
    pub uvs: [[f32; 2]; 4],
    /// Packed RGBA color word, written verbatim into each vertex.
    pub color: u32,
}

/// CPU mirror of the GPU vertex buffer.
///
/// The arena is stored as `u32` words. Float attributes are written through
/// `f32::to_bits`, the packed color word verbatim, so both "views" alias the
/// same backing bytes without unsafe casts; [`StagingBuffer::bytes`] exposes
/// the byte image uploaded to the GPU.
#[derive(Debug)]
pub struct StagingBuffer {
    words: Vec<u32>,
    capacity_quads: u32,
}

impl StagingBuffer {
    pub fn new(capacity_quads: u32) -> Self {
        let words = vec![0u32; capacity_quads as usize * VERTICES_PER_QUAD * VERTEX_STRIDE_WORDS];
        Self { words, capacity_quads }
    }

    pub fn capacity_quads(&self) -> u32 {
        self.capacity_quads
    }

    /// Stage one quad at `index`.
    ///
    /// # Panics
    /// If `index >= capacity_quads`. Writing past the staged region would
    /// corrupt adjacent quads, so this is a programming error, not a
    /// recoverable condition.
    pub fn write_quad(&mut self, index: u32, quad: &QuadAttributes) {
        assert!(
            index < self.capacity_quads,
            "quad index {index} out of range (capacity {})",
            self.capacity_quads
        );
        let mut w = index as usize * VERTICES_PER_QUAD * VERTEX_STRIDE_WORDS;
        for corner in 0..VERTICES_PER_QUAD {
            self.words[w] = quad.rotation.to_bits();
            self.words[w + 1] = quad.translation[0].to_bits();
            self.words[w + 2] = quad.translation[1].to_bits();
            self.words[w + 3] = quad.scale[0].to_bits();
            self.words[w + 4] = quad.scale[1].to_bits();
            self.words[w + 5] = quad.corners[corner][0].to_bits();
            self.words[w + 6] = quad.corners[corner][1].to_bits();
            self.words[w + 7] = quad.uvs[corner][0].to_bits();
            self.words[w + 8] = quad.uvs[corner][1].to_bits();
            self.words[w + 9] = quad.color;
            w += VERTEX_STRIDE_WORDS;
        }
    }

    /// Byte image of the first `quads` staged quads, ready for upload.
    pub fn bytes(&self, quads: u32) -> &[u8] {
        let words = quads as usize * VERTICES_PER_QUAD * VERTEX_STRIDE_WORDS;
        bytemuck::cast_slice(&self.words[..words])
    }

    /// Read back a staged float by word index.
    pub fn float_at(&self, word_index: usize) -> f32 {
        f32::from_bits(self.words[word_index])
    }

    /// Read back a staged word by word index.
    pub fn word_at(&self, word_index: usize) -> u32 {
        self.words[word_index]
    }
}
