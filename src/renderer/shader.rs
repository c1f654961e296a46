use gl::types::*;
use std::collections::HashMap;
use std::ffi::CString;
use std::ptr;

use crate::renderer::gpu::{Gpu, ProgramId, Uniform, UniformLocation};

pub struct ShaderProgram {
    pub id: GLuint,
}

impl ShaderProgram {
    pub fn from_sources(vert_src: &str, frag_src: &str) -> Result<Self, String> {
        unsafe {
            let vert = compile_shader(vert_src, gl::VERTEX_SHADER)?;
            let frag = match compile_shader(frag_src, gl::FRAGMENT_SHADER) {
                Ok(frag) => frag,
                Err(e) => {
                    gl::DeleteShader(vert);
                    return Err(e);
                }
            };

            let program = gl::CreateProgram();
            gl::AttachShader(program, vert);
            gl::AttachShader(program, frag);
            gl::LinkProgram(program);

            let mut success = 0;
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
            if success == 0 {
                let mut len = 0;
                gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
                let mut buf = vec![0u8; len.max(1) as usize];
                gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut _);
                buf.pop(); // remove null terminator
                let msg = String::from_utf8_lossy(&buf).to_string();
                gl::DeleteProgram(program);
                gl::DeleteShader(vert);
                gl::DeleteShader(frag);
                return Err(format!("Shader link error: {msg}"));
            }

            gl::DeleteShader(vert);
            gl::DeleteShader(frag);

            Ok(Self { id: program })
        }
    }

    pub fn handle(&self) -> ProgramId {
        ProgramId(self.id)
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

unsafe fn compile_shader(src: &str, shader_type: GLenum) -> Result<GLuint, String> {
    let kind = if shader_type == gl::VERTEX_SHADER {
        "vertex"
    } else {
        "fragment"
    };
    let c_src = CString::new(src).map_err(|_| format!("{kind} shader source contains NUL"))?;
    let shader = gl::CreateShader(shader_type);
    gl::ShaderSource(shader, 1, &c_src.as_ptr(), ptr::null());
    gl::CompileShader(shader);

    let mut success = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
    if success == 0 {
        let mut len = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];
        gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut _);
        buf.pop();
        let msg = String::from_utf8_lossy(&buf).to_string();
        gl::DeleteShader(shader);
        return Err(format!("{kind} shader compile error: {msg}"));
    }
    Ok(shader)
}

/// Uniform locations of one linked program, looked up by name at most once.
/// Names the linker dropped are remembered as absent and their writes are
/// skipped.
pub struct UniformCache {
    program: ProgramId,
    locations: HashMap<&'static str, Option<UniformLocation>>,
}

impl UniformCache {
    pub fn new(program: ProgramId) -> Self {
        Self {
            program,
            locations: HashMap::new(),
        }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn location(&mut self, gpu: &mut dyn Gpu, name: &'static str) -> Option<UniformLocation> {
        let program = self.program;
        *self.locations.entry(name).or_insert_with(|| {
            let location = gpu.uniform_location(program, name);
            if location.is_none() {
                log::debug!("uniform '{name}' not active in program {}", program.0);
            }
            location
        })
    }

    /// Writes `value` if the program has `name`. Returns whether it did.
    pub fn set(&mut self, gpu: &mut dyn Gpu, name: &'static str, value: Uniform) -> bool {
        match self.location(gpu, name) {
            Some(location) => {
                gpu.set_uniform(location, value);
                true
            }
            None => false,
        }
    }
}
