//! Shader program compilation and binding resolution.

use crate::backend::{AttributeInfo, ProgramHandle, RenderBackend, ShaderHandle, ShaderStage, UniformInfo};

use super::error::{RenderError, RenderResult};

/// A linked shader program plus its resolved attribute/uniform bindings.
///
/// The program handle is owned by whoever constructed this value; the
/// batching renderer releases it on teardown. `ShaderProgram` itself holds no
/// backend reference and performs no cleanup on drop.
#[derive(Debug)]
pub struct ShaderProgram {
    handle: ProgramHandle,
    attributes: Vec<AttributeInfo>,
    uniforms: Vec<UniformInfo>,
}

impl ShaderProgram {
    /// Compile both stages and link them into a program.
    ///
    /// Intermediate per-stage objects are always released: after a successful
    /// link, and on every failure path before the error propagates, so a
    /// failed construction leaves no shader or program object behind.
    pub fn compile(
        backend: &mut impl RenderBackend,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<Self> {
        let vs = compile_stage(backend, ShaderStage::Vertex, vertex_source)?;
        let fs = match compile_stage(backend, ShaderStage::Fragment, fragment_source) {
            Ok(fs) => fs,
            Err(err) => {
                backend.delete_shader(vs);
                return Err(err);
            }
        };

        let program = backend.create_program();
        backend.attach_shader(program, vs);
        backend.attach_shader(program, fs);
        let linked = backend.link_program(program);
        backend.delete_shader(vs);
        backend.delete_shader(fs);
        if !linked {
            let log = backend.program_log(program);
            backend.delete_program(program);
            return Err(RenderError::ProgramLink { log });
        }

        let attributes = backend.active_attributes(program);
        let uniforms = backend.active_uniforms(program);
        log::debug!(
            "linked program {:?}: {} attributes, {} uniforms",
            program,
            attributes.len(),
            uniforms.len()
        );

        Ok(Self { handle: program, attributes, uniforms })
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Active attributes in backend enumeration order.
    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    /// Active uniforms in backend enumeration order.
    pub fn uniforms(&self) -> &[UniformInfo] {
        &self.uniforms
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

fn compile_stage(
    backend: &mut impl RenderBackend,
    stage: ShaderStage,
    source: &str,
) -> RenderResult<ShaderHandle> {
    let shader = backend.create_shader(stage, source);
    if backend.compile_shader(shader) {
        Ok(shader)
    } else {
        let log = backend.shader_log(shader);
        backend.delete_shader(shader);
        Err(RenderError::ShaderCompile { stage, log })
    }
}
