//! In-memory render backend for tests and headless runs.
//!
//! `HeadlessBackend` implements the full [`RenderBackend`] interface without
//! touching a GPU. Object state lives in hash maps, buffer and texture bytes
//! are stored in plain vectors, and every call is reflected in counters and a
//! submitted-draw log so callers can assert on exactly what a renderer did.
//!
//! Three deterministic failure levers exist for exercising error paths:
//! a shader source containing `#error` fails compilation with that line as
//! its log, [`HeadlessBackend::fail_next_link`] forces the next program link
//! to report failure, and [`HeadlessBackend::fail_buffer_allocation_after`]
//! makes a chosen upcoming buffer allocation fail.

use std::collections::HashMap;

use crate::render::{RenderError, RenderResult};

use super::{
    AttributeInfo, BufferHandle, BufferKind, BufferUsage, FilterMode, ProgramHandle, RenderBackend,
    ShaderHandle, ShaderStage, TextureHandle, UniformHandle, UniformInfo, VertexAttribute, WrapMode,
};

/// Counters for every object-lifecycle and submission call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub shaders_created: usize,
    pub shaders_deleted: usize,
    pub programs_created: usize,
    pub programs_deleted: usize,
    pub buffers_created: usize,
    pub buffers_deleted: usize,
    pub textures_created: usize,
    pub textures_deleted: usize,
    pub texture_binds: usize,
    pub buffer_uploads: usize,
    pub clears: usize,
    pub draw_calls: usize,
}

/// One recorded indexed draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSubmission {
    pub index_count: u32,
    /// Texture bound at submission time.
    pub texture: Option<TextureHandle>,
    /// Program in use at submission time.
    pub program: Option<ProgramHandle>,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: Option<bool>,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<ShaderHandle>,
    linked: Option<bool>,
    log: String,
    attributes: Vec<AttributeInfo>,
    uniforms: Vec<UniformInfo>,
}

#[derive(Debug)]
struct BufferObject {
    #[allow(dead_code)]
    kind: BufferKind,
    #[allow(dead_code)]
    usage: BufferUsage,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct TextureObject {
    #[allow(dead_code)]
    wrap: WrapMode,
    #[allow(dead_code)]
    filter: FilterMode,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Recording backend with in-memory object storage.
#[derive(Debug)]
pub struct HeadlessBackend {
    viewport: (u32, u32),
    next_id: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    buffers: HashMap<u32, BufferObject>,
    textures: HashMap<u32, TextureObject>,
    bound_texture: Option<TextureHandle>,
    active_program: Option<ProgramHandle>,
    fail_next_link: bool,
    /// Countdown to a forced buffer-allocation failure.
    fail_buffer_after: Option<usize>,
    stats: BackendStats,
    submissions: Vec<DrawSubmission>,
    uniform_vec2_log: Vec<(UniformHandle, [f32; 2])>,
    uniform_i32_log: Vec<(UniformHandle, i32)>,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width, height),
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            bound_texture: None,
            active_program: None,
            fail_next_link: false,
            fail_buffer_after: None,
            stats: BackendStats::default(),
            submissions: Vec::new(),
            uniform_vec2_log: Vec::new(),
            uniform_i32_log: Vec::new(),
        }
    }

    /// Force the next `link_program` call to report failure.
    pub fn fail_next_link(&mut self) {
        self.fail_next_link = true;
    }

    /// Force an upcoming `create_buffer` call to fail: `calls` allocations
    /// succeed first, then the next one reports an allocation error.
    pub fn fail_buffer_allocation_after(&mut self, calls: usize) {
        self.fail_buffer_after = Some(calls);
    }

    pub fn stats(&self) -> BackendStats {
        self.stats
    }

    /// All indexed draws submitted so far, in order.
    pub fn submissions(&self) -> &[DrawSubmission] {
        &self.submissions
    }

    /// Current contents of a buffer, if it exists.
    pub fn buffer_bytes(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(|b| b.bytes.as_slice())
    }

    /// Dimensions of a texture after its last pixel upload.
    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture.0).map(|t| (t.width, t.height))
    }

    pub fn bound_texture(&self) -> Option<TextureHandle> {
        self.bound_texture
    }

    /// All `set_uniform_vec2` calls so far, in order.
    pub fn uniform_vec2_log(&self) -> &[(UniformHandle, [f32; 2])] {
        &self.uniform_vec2_log
    }

    /// All `set_uniform_i32` calls so far, in order.
    pub fn uniform_i32_log(&self) -> &[(UniformHandle, i32)] {
        &self.uniform_i32_log
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderHandle {
        let id = self.next_id();
        self.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: source.to_owned(),
                compiled: None,
                log: String::new(),
            },
        );
        self.stats.shaders_created += 1;
        ShaderHandle(id)
    }

    fn compile_shader(&mut self, shader: ShaderHandle) -> bool {
        let obj = self
            .shaders
            .get_mut(&shader.0)
            .unwrap_or_else(|| panic!("compile of unknown shader {shader:?}"));
        // A `#error` directive is the deterministic failure lever.
        if let Some(line) = obj.source.lines().find(|l| l.trim_start().starts_with("#error")) {
            obj.compiled = Some(false);
            obj.log = format!("{} shader: {}", obj.stage, line.trim());
            log::debug!("headless: shader {} failed to compile", shader.0);
            false
        } else {
            obj.compiled = Some(true);
            obj.log.clear();
            true
        }
    }

    fn shader_log(&self, shader: ShaderHandle) -> String {
        self.shaders.get(&shader.0).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader.0);
        self.stats.shaders_deleted += 1;
    }

    fn create_program(&mut self) -> ProgramHandle {
        let id = self.next_id();
        self.programs.insert(id, ProgramObject::default());
        self.stats.programs_created += 1;
        ProgramHandle(id)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        let obj = self
            .programs
            .get_mut(&program.0)
            .unwrap_or_else(|| panic!("attach to unknown program {program:?}"));
        obj.attached.push(shader);
    }

    fn link_program(&mut self, program: ProgramHandle) -> bool {
        if self.fail_next_link {
            self.fail_next_link = false;
            let obj = self.programs.get_mut(&program.0).expect("link of unknown program");
            obj.linked = Some(false);
            obj.log = "link forced to fail".to_owned();
            return false;
        }

        // Collect stage sources first; a valid program needs one compiled
        // vertex stage and one compiled fragment stage.
        let mut vertex_src = None;
        let mut fragment_src = None;
        {
            let obj = self.programs.get(&program.0).expect("link of unknown program");
            for handle in &obj.attached {
                if let Some(shader) = self.shaders.get(&handle.0) {
                    if shader.compiled != Some(true) {
                        continue;
                    }
                    match shader.stage {
                        ShaderStage::Vertex => vertex_src = Some(shader.source.clone()),
                        ShaderStage::Fragment => fragment_src = Some(shader.source.clone()),
                    }
                }
            }
        }

        let (Some(vs), Some(fs)) = (vertex_src, fragment_src) else {
            let obj = self.programs.get_mut(&program.0).expect("link of unknown program");
            obj.linked = Some(false);
            obj.log = "program requires a compiled vertex and fragment stage".to_owned();
            return false;
        };

        let mut attributes: Vec<AttributeInfo> = Vec::new();
        let mut uniforms: Vec<UniformInfo> = Vec::new();
        for source in [&vs, &fs] {
            for (qualifier, glsl_type, name, size) in scan_declarations(source) {
                match qualifier.as_str() {
                    "attribute" => {
                        if attributes.iter().any(|a| a.name == name) {
                            continue;
                        }
                        let location = attributes.len() as u32;
                        attributes.push(AttributeInfo { name, glsl_type, size, location });
                    }
                    "uniform" => {
                        if uniforms.iter().any(|u| u.name == name) {
                            continue;
                        }
                        let location = UniformHandle(self.next_id());
                        uniforms.push(UniformInfo { name, glsl_type, size, location });
                    }
                    _ => {}
                }
            }
        }

        let obj = self.programs.get_mut(&program.0).expect("link of unknown program");
        obj.attributes = attributes;
        obj.uniforms = uniforms;
        obj.linked = Some(true);
        obj.log.clear();
        true
    }

    fn program_log(&self, program: ProgramHandle) -> String {
        self.programs.get(&program.0).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program.0);
        self.stats.programs_deleted += 1;
        if self.active_program == Some(program) {
            self.active_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.active_program = Some(program);
    }

    fn active_attributes(&self, program: ProgramHandle) -> Vec<AttributeInfo> {
        self.programs
            .get(&program.0)
            .filter(|p| p.linked == Some(true))
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn active_uniforms(&self, program: ProgramHandle) -> Vec<UniformInfo> {
        self.programs
            .get(&program.0)
            .filter(|p| p.linked == Some(true))
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn set_uniform_vec2(&mut self, uniform: UniformHandle, x: f32, y: f32) {
        self.uniform_vec2_log.push((uniform, [x, y]));
    }

    fn set_uniform_i32(&mut self, uniform: UniformHandle, value: i32) {
        self.uniform_i32_log.push((uniform, value));
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        byte_size: usize,
        usage: BufferUsage,
    ) -> RenderResult<BufferHandle> {
        if byte_size == 0 {
            return Err(RenderError::Allocation(format!(
                "refusing zero-size {kind:?} buffer"
            )));
        }
        if let Some(remaining) = self.fail_buffer_after {
            if remaining == 0 {
                self.fail_buffer_after = None;
                return Err(RenderError::Allocation(format!(
                    "{kind:?} buffer allocation forced to fail"
                )));
            }
            self.fail_buffer_after = Some(remaining - 1);
        }
        let id = self.next_id();
        self.buffers.insert(
            id,
            BufferObject {
                kind,
                usage,
                bytes: vec![0; byte_size],
            },
        );
        self.stats.buffers_created += 1;
        log::debug!("headless: created {kind:?} buffer {id} ({byte_size} bytes, {usage:?})");
        Ok(BufferHandle(id))
    }

    fn upload_bytes(&mut self, buffer: BufferHandle, byte_offset: usize, bytes: &[u8]) {
        let obj = self
            .buffers
            .get_mut(&buffer.0)
            .unwrap_or_else(|| panic!("upload to unknown buffer {buffer:?}"));
        let end = byte_offset + bytes.len();
        assert!(
            end <= obj.bytes.len(),
            "upload of {} bytes at offset {byte_offset} overruns buffer of {} bytes",
            bytes.len(),
            obj.bytes.len()
        );
        obj.bytes[byte_offset..end].copy_from_slice(bytes);
        self.stats.buffer_uploads += 1;
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer.0);
        self.stats.buffers_deleted += 1;
    }

    fn set_vertex_layout(&mut self, _buffer: BufferHandle, _attributes: &[VertexAttribute]) {}

    fn create_texture(&mut self, wrap: WrapMode, filter: FilterMode) -> RenderResult<TextureHandle> {
        let id = self.next_id();
        self.textures.insert(
            id,
            TextureObject {
                wrap,
                filter,
                width: 0,
                height: 0,
                pixels: Vec::new(),
            },
        );
        self.stats.textures_created += 1;
        Ok(TextureHandle(id))
    }

    fn upload_texture_rgba(&mut self, texture: TextureHandle, width: u32, height: u32, pixels: &[u8]) {
        let obj = self
            .textures
            .get_mut(&texture.0)
            .unwrap_or_else(|| panic!("upload to unknown texture {texture:?}"));
        assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "pixel data does not match {width}x{height} RGBA"
        );
        obj.width = width;
        obj.height = height;
        obj.pixels = pixels.to_vec();
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.bound_texture = Some(texture);
        self.stats.texture_binds += 1;
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
        self.stats.textures_deleted += 1;
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn clear_screen(&mut self, _color: [f32; 4]) {
        self.stats.clears += 1;
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.submissions.push(DrawSubmission {
            index_count,
            texture: self.bound_texture,
            program: self.active_program,
        });
        self.stats.draw_calls += 1;
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }
}

/// Scan GLSL source for `attribute`/`uniform` declarations.
///
/// Returns (qualifier, type, name, array size) per declaration. This is a
/// line-based approximation, not a parser; it is good enough for the shader
/// sources this engine feeds it.
fn scan_declarations(source: &str) -> Vec<(String, String, String, u32)> {
    let mut out = Vec::new();
    for line in source.lines() {
        let line = line.trim().trim_end_matches(';');
        let mut tokens = line.split_whitespace();
        let Some(qualifier) = tokens.next() else { continue };
        if qualifier != "attribute" && qualifier != "uniform" {
            continue;
        }
        // Skip an optional precision qualifier.
        let glsl_type = match tokens.next() {
            Some("lowp" | "mediump" | "highp") => match tokens.next() {
                Some(t) => t,
                None => continue,
            },
            Some(t) => t,
            None => continue,
        };
        let Some(raw_name) = tokens.next() else { continue };
        let (name, size) = match raw_name.split_once('[') {
            Some((n, rest)) => {
                let count = rest.trim_end_matches(']').parse::<u32>().unwrap_or(1);
                (n, count)
            }
            None => (raw_name, 1),
        };
        out.push((qualifier.to_owned(), glsl_type.to_owned(), name.to_owned(), size));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_scan_finds_attributes_and_uniforms() {
        let source = "
            precision mediump float;
            attribute vec2 position;
            attribute float rotation;
            uniform highp vec2 screen;
            uniform sampler2D sampler;
            varying vec2 v_uv;
        ";
        let decls = scan_declarations(source);
        assert_eq!(decls.len(), 4);
        assert!(decls.contains(&("attribute".into(), "vec2".into(), "position".into(), 1)));
        assert!(decls.contains(&("uniform".into(), "vec2".into(), "screen".into(), 1)));
        assert!(decls.contains(&("uniform".into(), "sampler2D".into(), "sampler".into(), 1)));
    }

    #[test]
    fn declaration_scan_reads_array_sizes() {
        let decls = scan_declarations("uniform vec4 frames[4];");
        assert_eq!(decls, vec![("uniform".into(), "vec4".into(), "frames".into(), 4)]);
    }

    #[test]
    fn zero_size_buffer_is_refused() {
        let mut backend = HeadlessBackend::new(64, 64);
        let result = backend.create_buffer(BufferKind::Vertex, 0, BufferUsage::Dynamic);
        assert!(matches!(result, Err(RenderError::Allocation(_))));
        assert_eq!(backend.stats().buffers_created, 0);
    }

    #[test]
    fn forced_allocation_failure_counts_down() {
        let mut backend = HeadlessBackend::new(64, 64);
        backend.fail_buffer_allocation_after(1);
        assert!(backend.create_buffer(BufferKind::Index, 8, BufferUsage::Static).is_ok());
        let result = backend.create_buffer(BufferKind::Vertex, 8, BufferUsage::Dynamic);
        assert!(matches!(result, Err(RenderError::Allocation(_))));
        // The lever is one-shot.
        assert!(backend.create_buffer(BufferKind::Vertex, 8, BufferUsage::Dynamic).is_ok());
        assert_eq!(backend.stats().buffers_created, 2);
    }

    #[test]
    fn buffer_contents_round_trip() {
        let mut backend = HeadlessBackend::new(64, 64);
        let buffer = backend
            .create_buffer(BufferKind::Vertex, 8, BufferUsage::Dynamic)
            .unwrap();
        backend.upload_bytes(buffer, 2, &[1, 2, 3]);
        assert_eq!(backend.buffer_bytes(buffer), Some(&[0, 0, 1, 2, 3, 0, 0, 0][..]));
    }

    #[test]
    fn draw_records_bound_texture() {
        let mut backend = HeadlessBackend::new(64, 64);
        let texture = backend
            .create_texture(WrapMode::ClampToEdge, FilterMode::Nearest)
            .unwrap();
        backend.bind_texture(texture);
        backend.draw_indexed(12);
        assert_eq!(
            backend.submissions(),
            &[DrawSubmission {
                index_count: 12,
                texture: Some(texture),
                program: None,
            }]
        );
    }

    #[test]
    fn link_requires_both_stages() {
        let mut backend = HeadlessBackend::new(64, 64);
        let vs = backend.create_shader(ShaderStage::Vertex, "void main() {}");
        assert!(backend.compile_shader(vs));
        let program = backend.create_program();
        backend.attach_shader(program, vs);
        assert!(!backend.link_program(program));
        assert!(!backend.program_log(program).is_empty());
    }
}
