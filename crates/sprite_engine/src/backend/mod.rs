//! Render backend abstraction.
//!
//! This module defines the `RenderBackend` trait that graphics backends must
//! implement. The batching renderer talks to the GPU exclusively through this
//! interface, so it can run against a native graphics API or against the
//! in-memory [`HeadlessBackend`] used for tests and headless runs.
//!
//! Backends manage their own object tables and hand out opaque handles. The
//! renderer owns the lifecycle of the objects it creates and releases them
//! through the same interface.

use crate::render::RenderResult;

pub mod headless;

pub use headless::{BackendStats, DrawSubmission, HeadlessBackend};

/// Opaque handle to a per-stage shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Opaque handle to a 2D texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a resolved uniform location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub u32);

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// What a buffer stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// 16-bit element indices.
    Index,
    /// Interleaved vertex attributes.
    Vertex,
}

/// How often a buffer's contents change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once at creation, read many times.
    Static,
    /// Rewritten every frame.
    Dynamic,
}

/// Texture coordinate wrapping, applied to both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

/// Texture sampling filter, applied to both minification and magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Metadata for one active vertex attribute of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    /// Declared name in the shader source.
    pub name: String,
    /// Declared GLSL type, e.g. `vec2`.
    pub glsl_type: String,
    /// Array size (1 for non-arrays).
    pub size: u32,
    /// Resolved attribute slot.
    pub location: u32,
}

/// Metadata for one active uniform of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    /// Declared name in the shader source.
    pub name: String,
    /// Declared GLSL type, e.g. `sampler2D`.
    pub glsl_type: String,
    /// Array size (1 for non-arrays).
    pub size: u32,
    /// Resolved uniform location.
    pub location: UniformHandle,
}

/// Component type of a vertex attribute in buffer memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Float,
    /// Unsigned byte, normalized to [0, 1] on fetch.
    UnsignedByte,
}

/// One entry of an interleaved vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute slot resolved from the program.
    pub location: u32,
    /// Number of components (1..=4).
    pub components: u8,
    pub kind: AttributeKind,
    /// Byte stride between consecutive vertices.
    pub stride: usize,
    /// Byte offset of this attribute within a vertex.
    pub offset: usize,
}

/// Interface the batching renderer requires from a graphics backend.
///
/// Shader compile and program link report status booleans plus a diagnostic
/// log rather than `Result`s; turning a false status into a typed error is the
/// program builder's job, which also guarantees that intermediate objects are
/// released on every path.
///
/// Steady-state operations (`upload_bytes`, `bind_texture`, `draw_indexed`,
/// `clear_screen`) are infallible by contract: once a handle exists, using it
/// is assumed to succeed. Only object creation can fail.
pub trait RenderBackend {
    // Shader objects.
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderHandle;
    /// Compile a shader, returning the compile status.
    fn compile_shader(&mut self, shader: ShaderHandle) -> bool;
    /// Diagnostic log of the last compile of `shader`.
    fn shader_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&mut self, shader: ShaderHandle);

    // Programs.
    fn create_program(&mut self) -> ProgramHandle;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    /// Link the attached stages, returning the link status.
    fn link_program(&mut self, program: ProgramHandle) -> bool;
    /// Diagnostic log of the last link of `program`.
    fn program_log(&self, program: ProgramHandle) -> String;
    fn delete_program(&mut self, program: ProgramHandle);
    fn use_program(&mut self, program: ProgramHandle);
    /// Active attributes of a linked program, in backend enumeration order.
    fn active_attributes(&self, program: ProgramHandle) -> Vec<AttributeInfo>;
    /// Active uniforms of a linked program, in backend enumeration order.
    fn active_uniforms(&self, program: ProgramHandle) -> Vec<UniformInfo>;
    fn set_uniform_vec2(&mut self, uniform: UniformHandle, x: f32, y: f32);
    fn set_uniform_i32(&mut self, uniform: UniformHandle, value: i32);

    // Buffers.
    /// Allocate a buffer of `byte_size` bytes.
    ///
    /// Storage contents are unspecified until written; callers must fully
    /// populate a region before drawing from it.
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        byte_size: usize,
        usage: BufferUsage,
    ) -> RenderResult<BufferHandle>;
    /// Copy `bytes` into `buffer` starting at `byte_offset`.
    fn upload_bytes(&mut self, buffer: BufferHandle, byte_offset: usize, bytes: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferHandle);
    /// Describe the interleaved layout the vertex buffer feeds to the program.
    fn set_vertex_layout(&mut self, buffer: BufferHandle, attributes: &[VertexAttribute]);

    // Textures. Creation reserves the object and sets sampling parameters;
    // pixel upload is a separate step.
    fn create_texture(&mut self, wrap: WrapMode, filter: FilterMode) -> RenderResult<TextureHandle>;
    fn upload_texture_rgba(&mut self, texture: TextureHandle, width: u32, height: u32, pixels: &[u8]);
    fn bind_texture(&mut self, texture: TextureHandle);
    fn delete_texture(&mut self, texture: TextureHandle);

    // Frame operations.
    fn clear_screen(&mut self, color: [f32; 4]);
    /// Issue one indexed draw over the first `index_count` indices of the
    /// bound index buffer.
    fn draw_indexed(&mut self, index_count: u32);
    /// Current drawable size in pixels.
    fn viewport_size(&self) -> (u32, u32);
}

// A renderer can borrow its backend instead of owning it; the caller keeps
// the backend either way, including when construction fails partway.
impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderHandle {
        (**self).create_shader(stage, source)
    }

    fn compile_shader(&mut self, shader: ShaderHandle) -> bool {
        (**self).compile_shader(shader)
    }

    fn shader_log(&self, shader: ShaderHandle) -> String {
        (**self).shader_log(shader)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        (**self).delete_shader(shader);
    }

    fn create_program(&mut self) -> ProgramHandle {
        (**self).create_program()
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        (**self).attach_shader(program, shader);
    }

    fn link_program(&mut self, program: ProgramHandle) -> bool {
        (**self).link_program(program)
    }

    fn program_log(&self, program: ProgramHandle) -> String {
        (**self).program_log(program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        (**self).delete_program(program);
    }

    fn use_program(&mut self, program: ProgramHandle) {
        (**self).use_program(program);
    }

    fn active_attributes(&self, program: ProgramHandle) -> Vec<AttributeInfo> {
        (**self).active_attributes(program)
    }

    fn active_uniforms(&self, program: ProgramHandle) -> Vec<UniformInfo> {
        (**self).active_uniforms(program)
    }

    fn set_uniform_vec2(&mut self, uniform: UniformHandle, x: f32, y: f32) {
        (**self).set_uniform_vec2(uniform, x, y);
    }

    fn set_uniform_i32(&mut self, uniform: UniformHandle, value: i32) {
        (**self).set_uniform_i32(uniform, value);
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        byte_size: usize,
        usage: BufferUsage,
    ) -> RenderResult<BufferHandle> {
        (**self).create_buffer(kind, byte_size, usage)
    }

    fn upload_bytes(&mut self, buffer: BufferHandle, byte_offset: usize, bytes: &[u8]) {
        (**self).upload_bytes(buffer, byte_offset, bytes);
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        (**self).delete_buffer(buffer);
    }

    fn set_vertex_layout(&mut self, buffer: BufferHandle, attributes: &[VertexAttribute]) {
        (**self).set_vertex_layout(buffer, attributes);
    }

    fn create_texture(&mut self, wrap: WrapMode, filter: FilterMode) -> RenderResult<TextureHandle> {
        (**self).create_texture(wrap, filter)
    }

    fn upload_texture_rgba(&mut self, texture: TextureHandle, width: u32, height: u32, pixels: &[u8]) {
        (**self).upload_texture_rgba(texture, width, height, pixels);
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        (**self).bind_texture(texture);
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        (**self).delete_texture(texture);
    }

    fn clear_screen(&mut self, color: [f32; 4]) {
        (**self).clear_screen(color);
    }

    fn draw_indexed(&mut self, index_count: u32) {
        (**self).draw_indexed(index_count);
    }

    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }
}
