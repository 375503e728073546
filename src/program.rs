use std::ffi::CString;

use gl::types::*;
use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::context::{GlContext, GlMarker};
use crate::error::{ObjectError, check};
use crate::{has_handle, transmutable_u32};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex = gl::VERTEX_SHADER,
    TessControl = gl::TESS_CONTROL_SHADER,
    TessEvaluation = gl::TESS_EVALUATION_SHADER,
    Geometry = gl::GEOMETRY_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
    Compute = gl::COMPUTE_SHADER,
}
transmutable_u32!(ShaderStage);

/// A linked shader program built from per-stage GLSL sources.
///
/// Construction compiles and attaches every stage in order, then links.
/// Compile and link failures surface the driver's info log through
/// [`ObjectError`]; no program handle is leaked on any failure path.
pub struct ShaderProgram {
    handle: GLuint,
    debug_label: String,
    _marker: GlMarker,
}
has_handle!(ShaderProgram);

impl ShaderProgram {
    pub fn new(ctx: &GlContext, sources: &[(ShaderStage, &str)]) -> Result<Self, ObjectError> {
        validate_sources(sources)?;

        let handle = unsafe { gl::CreateProgram() };
        let attach_and_link = || {
            for &(stage, source) in sources {
                compile_and_attach(handle, stage, source)?;
            }
            link(handle)
        };
        if let Err(err) = attach_and_link() {
            unsafe { gl::DeleteProgram(handle) };
            return Err(err);
        }

        Ok(Self {
            handle,
            debug_label: String::new(),
            _marker: ctx.marker(),
        })
    }

    pub fn use_program(&self) {
        unsafe { gl::UseProgram(self.handle) };
    }

    /// Resolved location of a named uniform, `-1` if absent. A `-1` location
    /// is accepted by every `glProgramUniform*` call as a no-op, which is
    /// exactly how the setters below treat unknown names.
    pub fn uniform_location(&self, name: &str) -> GLint {
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl::GetUniformLocation(self.handle, name.as_ptr()) }
    }

    /// Associate a vertex shader input with an attribute index. Only takes
    /// effect on the next [`relink`](Self::relink).
    pub fn bind_attrib_location(&self, location: GLuint, name: &str) {
        let Ok(name) = CString::new(name) else {
            return;
        };
        unsafe { gl::BindAttribLocation(self.handle, location, name.as_ptr()) };
    }

    /// Associate a fragment shader output with a color index. Only takes
    /// effect on the next [`relink`](Self::relink); ignored for outputs with
    /// a static location in the shader.
    pub fn bind_frag_data_location(&self, location: GLuint, name: &str) {
        let Ok(name) = CString::new(name) else {
            return;
        };
        unsafe { gl::BindFragDataLocation(self.handle, location, name.as_ptr()) };
    }

    /// Re-link after changing attribute or frag-data bindings. On failure the
    /// previous executable is invalidated by the driver.
    pub fn relink(&self) -> Result<(), ObjectError> {
        link(self.handle)
    }

    pub fn set_uniform_f32(&self, name: &str, v: f32) {
        unsafe { gl::ProgramUniform1f(self.handle, self.uniform_location(name), v) };
    }

    pub fn set_uniform_i32(&self, name: &str, v: i32) {
        unsafe { gl::ProgramUniform1i(self.handle, self.uniform_location(name), v) };
    }

    pub fn set_uniform_u32(&self, name: &str, v: u32) {
        unsafe { gl::ProgramUniform1ui(self.handle, self.uniform_location(name), v) };
    }

    pub fn set_uniform_vec2(&self, name: &str, v: Vec2) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform2fv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_vec3(&self, name: &str, v: Vec3) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform3fv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_vec4(&self, name: &str, v: Vec4) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform4fv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_ivec2(&self, name: &str, v: IVec2) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform2iv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_ivec3(&self, name: &str, v: IVec3) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform3iv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_ivec4(&self, name: &str, v: IVec4) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform4iv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_uvec2(&self, name: &str, v: UVec2) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform2uiv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_uvec3(&self, name: &str, v: UVec3) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform3uiv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_uvec4(&self, name: &str, v: UVec4) {
        let loc = self.uniform_location(name);
        unsafe { gl::ProgramUniform4uiv(self.handle, loc, 1, v.to_array().as_ptr()) };
    }

    pub fn set_uniform_mat2(&self, name: &str, m: Mat2) {
        let loc = self.uniform_location(name);
        unsafe {
            gl::ProgramUniformMatrix2fv(self.handle, loc, 1, gl::FALSE, m.to_cols_array().as_ptr())
        };
    }

    pub fn set_uniform_mat3(&self, name: &str, m: Mat3) {
        let loc = self.uniform_location(name);
        unsafe {
            gl::ProgramUniformMatrix3fv(self.handle, loc, 1, gl::FALSE, m.to_cols_array().as_ptr())
        };
    }

    pub fn set_uniform_mat4(&self, name: &str, m: Mat4) {
        let loc = self.uniform_location(name);
        unsafe {
            gl::ProgramUniformMatrix4fv(self.handle, loc, 1, gl::FALSE, m.to_cols_array().as_ptr())
        };
    }

    /// Active uniforms as (name, resolved location) pairs.
    pub fn active_uniforms(&self) -> Vec<(String, GLint)> {
        self.active_resources(
            gl::ACTIVE_UNIFORMS,
            gl::ACTIVE_UNIFORM_MAX_LENGTH,
            |handle, index, buf_len, written, name| unsafe {
                let mut size = 0;
                let mut type_ = 0;
                gl::GetActiveUniform(handle, index, buf_len, written, &mut size, &mut type_, name);
                gl::GetUniformLocation(handle, name)
            },
        )
    }

    /// Active vertex attributes as (name, resolved location) pairs.
    pub fn active_attributes(&self) -> Vec<(String, GLint)> {
        self.active_resources(
            gl::ACTIVE_ATTRIBUTES,
            gl::ACTIVE_ATTRIBUTE_MAX_LENGTH,
            |handle, index, buf_len, written, name| unsafe {
                let mut size = 0;
                let mut type_ = 0;
                gl::GetActiveAttrib(handle, index, buf_len, written, &mut size, &mut type_, name);
                gl::GetAttribLocation(handle, name)
            },
        )
    }

    fn active_resources(
        &self,
        count_pname: GLenum,
        max_len_pname: GLenum,
        query: impl Fn(GLuint, GLuint, GLsizei, *mut GLsizei, *mut GLchar) -> GLint,
    ) -> Vec<(String, GLint)> {
        let mut count = 0;
        let mut max_len = 0;
        unsafe {
            gl::GetProgramiv(self.handle, count_pname, &mut count);
            gl::GetProgramiv(self.handle, max_len_pname, &mut max_len);
        }

        let mut out = Vec::with_capacity(count.max(0) as usize);
        for index in 0..count.max(0) as GLuint {
            let mut name = vec![0u8; max_len.max(1) as usize];
            let mut written = 0;
            let location = query(
                self.handle,
                index,
                max_len.max(1),
                &mut written,
                name.as_mut_ptr().cast(),
            );
            name.truncate(written.max(0) as usize);
            out.push((String::from_utf8_lossy(&name).into_owned(), location));
        }
        out
    }

    /// Write the active uniform listing to the diagnostic stream.
    pub fn log_active_uniforms(&self) {
        for (name, location) in self.active_uniforms() {
            log::info!("{location} - {name}");
        }
    }

    /// Write the active attribute listing to the diagnostic stream.
    pub fn log_active_attributes(&self) {
        for (name, location) in self.active_attributes() {
            log::info!("{location} - {name}");
        }
    }

    pub fn set_debug_label(&mut self, label: impl Into<String>) {
        self.debug_label = label.into();
        if cfg!(debug_assertions) {
            unsafe {
                gl::ObjectLabel(
                    gl::PROGRAM,
                    self.handle,
                    self.debug_label.len() as GLsizei,
                    self.debug_label.as_ptr().cast(),
                )
            };
        }
    }

    pub fn debug_label(&self) -> &str {
        &self.debug_label
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.handle) };
    }
}

/// Rejects empty sources up front so no driver call is issued for a stage
/// without source text.
fn validate_sources(sources: &[(ShaderStage, &str)]) -> Result<(), ObjectError> {
    for &(stage, source) in sources {
        if source.is_empty() {
            return Err(ObjectError::EmptyShaderSource { stage });
        }
    }
    Ok(())
}

fn compile_and_attach(
    program: GLuint,
    stage: ShaderStage,
    source: &str,
) -> Result<(), ObjectError> {
    let shader = unsafe { gl::CreateShader(stage.to_u32()) };
    let ptr = source.as_ptr().cast::<GLchar>();
    let len = source.len() as GLint;
    unsafe {
        gl::ShaderSource(shader, 1, &ptr, &len);
        gl::CompileShader(shader);
    }

    let mut status = gl::FALSE as GLint;
    unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
    if status == gl::FALSE as GLint {
        let log = shader_info_log(shader);
        unsafe { gl::DeleteShader(shader) };
        return Err(ObjectError::ShaderCompile { stage, log });
    }

    unsafe {
        gl::AttachShader(program, shader);
        // Flag for deletion now; the driver defers it until the program is
        // deleted and the shader detached.
        gl::DeleteShader(shader);
    }
    Ok(())
}

fn link(program: GLuint) -> Result<(), ObjectError> {
    unsafe { gl::LinkProgram(program) };

    let mut status = gl::FALSE as GLint;
    unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
    if status == gl::FALSE as GLint {
        return Err(ObjectError::ProgramLink {
            log: program_info_log(program),
        });
    }
    check("ShaderProgram::link")
}

fn shader_info_log(handle: GLuint) -> String {
    let mut log_len = 0;
    unsafe { gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len) };
    if log_len <= 0 {
        return String::new();
    }

    let mut log = vec![0u8; log_len as usize];
    let mut written = 0;
    unsafe { gl::GetShaderInfoLog(handle, log_len, &mut written, log.as_mut_ptr().cast()) };
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).into_owned()
}

fn program_info_log(handle: GLuint) -> String {
    let mut log_len = 0;
    unsafe { gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len) };
    if log_len <= 0 {
        return String::new();
    }

    let mut log = vec![0u8; log_len as usize];
    let mut written = 0;
    unsafe { gl::GetProgramInfoLog(handle, log_len, &mut written, log.as_mut_ptr().cast()) };
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_source_is_rejected_before_any_driver_call() {
        let sources = [
            (ShaderStage::Vertex, "void main() {}"),
            (ShaderStage::Fragment, ""),
        ];
        match validate_sources(&sources) {
            Err(ObjectError::EmptyShaderSource { stage }) => {
                assert_eq!(stage, ShaderStage::Fragment)
            }
            other => panic!("expected EmptyShaderSource, got {other:?}"),
        }
    }

    #[test]
    fn non_empty_sources_pass_validation() {
        let sources = [
            (ShaderStage::Vertex, "void main() {}"),
            (ShaderStage::Fragment, "void main() {}"),
        ];
        assert!(validate_sources(&sources).is_ok());
    }

    #[test]
    fn stage_enum_maps_to_gl_constants() {
        assert_eq!(ShaderStage::Vertex.to_u32(), gl::VERTEX_SHADER);
        assert_eq!(ShaderStage::TessControl.to_u32(), gl::TESS_CONTROL_SHADER);
        assert_eq!(ShaderStage::Compute.to_u32(), gl::COMPUTE_SHADER);
    }
}
