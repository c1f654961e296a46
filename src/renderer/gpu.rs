use gl::types::*;
use glam::{Mat4, Vec2, Vec3};
use std::ffi::CString;
use std::mem;
use std::ptr;

use crate::renderer::mesh::MeshData;
use crate::scene::light::CubeFace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub GLuint);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub GLuint);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferId(pub GLuint);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferId(pub GLuint);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub GLint);

/// Vertex array plus the buffers backing it. Attribute locations are fixed:
/// 0 = position, 1 = texcoords, 2 = normal.
#[derive(Debug, PartialEq, Eq)]
pub struct GpuMesh {
    pub vao: GLuint,
    pub buffers: [GLuint; 4],
    pub count: i32,
    pub indexed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthTarget {
    Texture2d,
    CubeMap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthAttachment {
    Texture2d(TextureId),
    CubeFace(TextureId, CubeFace),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureBinding {
    Texture1d(TextureId),
    Texture2d(TextureId),
    CubeMap(TextureId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// Every graphics call the shadow pipeline issues. `GlGpu` talks to the
/// current OpenGL context; tests substitute a recorder.
pub trait Gpu {
    fn create_depth_texture(&mut self, target: DepthTarget, size: i32) -> TextureId;
    fn create_color_texture(&mut self, width: u32, height: u32, rgb: &[u8]) -> TextureId;
    fn create_distribution_texture(&mut self) -> TextureId;
    /// Replaces the contents of a 1D RG32F lookup texture.
    fn upload_distribution(&mut self, texture: TextureId, points: &[Vec2]);
    fn delete_texture(&mut self, texture: TextureId);

    fn create_depth_framebuffer(&mut self) -> FramebufferId;
    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);
    /// `None` binds the default framebuffer.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);
    /// Attaches `attachment` as the depth attachment of the bound framebuffer
    /// and reports whether the framebuffer is complete.
    fn attach_depth(&mut self, attachment: DepthAttachment) -> bool;
    fn viewport(&mut self, width: i32, height: i32);
    fn clear_depth(&mut self);
    fn clear_color_and_depth(&mut self, color: Vec3);

    fn use_program(&mut self, program: ProgramId);
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn set_uniform(&mut self, location: UniformLocation, value: Uniform);
    fn bind_texture(&mut self, unit: u32, binding: TextureBinding);

    /// Creates a uniform buffer of `size` bytes bound to the program's
    /// `block` uniform block. `None` when the block is not in the program.
    fn create_uniform_buffer(&mut self, program: ProgramId, block: &str, size: usize)
        -> Option<BufferId>;
    fn upload_uniform_buffer(&mut self, buffer: BufferId, bytes: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);

    fn upload_mesh(&mut self, data: &MeshData) -> GpuMesh;
    fn draw_mesh(&mut self, mesh: &GpuMesh);
    fn delete_mesh(&mut self, mesh: GpuMesh);
    fn draw_fullscreen_quad(&mut self);
}

/// `Gpu` over the `gl` bindings. Requires a current context with loaded
/// function pointers.
pub struct GlGpu {
    quad_vao: GLuint,
}

impl GlGpu {
    pub fn init() -> Self {
        let mut quad_vao = 0;
        unsafe {
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            gl::Enable(gl::CULL_FACE);
            gl::Enable(gl::TEXTURE_CUBE_MAP_SEAMLESS);
            // Core profile refuses attribute-less draws without a bound VAO.
            gl::GenVertexArrays(1, &mut quad_vao);
        }
        Self { quad_vao }
    }

    /// Logs and drains the GL error queue.
    pub fn check_errors(&self) {
        loop {
            let error = unsafe { gl::GetError() };
            if error == gl::NO_ERROR {
                break;
            }
            log::warn!("GL error 0x{error:04X}");
        }
    }
}

impl Drop for GlGpu {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.quad_vao);
        }
    }
}

impl Gpu for GlGpu {
    fn create_depth_texture(&mut self, target: DepthTarget, size: i32) -> TextureId {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            match target {
                DepthTarget::Texture2d => {
                    gl::BindTexture(gl::TEXTURE_2D, texture);
                    gl::TexImage2D(
                        gl::TEXTURE_2D,
                        0,
                        gl::DEPTH_COMPONENT24 as GLint,
                        size,
                        size,
                        0,
                        gl::DEPTH_COMPONENT,
                        gl::FLOAT,
                        ptr::null(),
                    );
                    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
                    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
                    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
                    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
                    gl::BindTexture(gl::TEXTURE_2D, 0);
                }
                DepthTarget::CubeMap => {
                    gl::BindTexture(gl::TEXTURE_CUBE_MAP, texture);
                    for face in CubeFace::ALL {
                        gl::TexImage2D(
                            face.gl_target(),
                            0,
                            gl::DEPTH_COMPONENT32 as GLint,
                            size,
                            size,
                            0,
                            gl::DEPTH_COMPONENT,
                            gl::FLOAT,
                            ptr::null(),
                        );
                    }
                    let target = gl::TEXTURE_CUBE_MAP;
                    gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
                    gl::TexParameteri(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
                    gl::TexParameteri(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
                    gl::TexParameteri(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
                    gl::TexParameteri(target, gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE as GLint);
                    gl::BindTexture(gl::TEXTURE_CUBE_MAP, 0);
                }
            }
        }
        TextureId(texture)
    }

    fn create_color_texture(&mut self, width: u32, height: u32, rgb: &[u8]) -> TextureId {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            // RGB rows are not 4-byte aligned for odd widths.
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGB as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::RGB,
                gl::UNSIGNED_BYTE,
                rgb.as_ptr() as *const _,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        TextureId(texture)
    }

    fn create_distribution_texture(&mut self) -> TextureId {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
        }
        TextureId(texture)
    }

    fn upload_distribution(&mut self, texture: TextureId, points: &[Vec2]) {
        let data: Vec<f32> = points.iter().flat_map(|p| [p.x, p.y]).collect();
        unsafe {
            gl::BindTexture(gl::TEXTURE_1D, texture.0);
            gl::TexImage1D(
                gl::TEXTURE_1D,
                0,
                gl::RG32F as GLint,
                points.len() as GLsizei,
                0,
                gl::RG,
                gl::FLOAT,
                data.as_ptr() as *const _,
            );
            gl::TexParameteri(gl::TEXTURE_1D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_1D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_1D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
            gl::BindTexture(gl::TEXTURE_1D, 0);
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        unsafe {
            gl::DeleteTextures(1, &texture.0);
        }
    }

    fn create_depth_framebuffer(&mut self) -> FramebufferId {
        let mut framebuffer = 0;
        unsafe {
            gl::GenFramebuffers(1, &mut framebuffer);
            gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
            gl::DrawBuffer(gl::NONE);
            gl::ReadBuffer(gl::NONE);
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
        FramebufferId(framebuffer)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        unsafe {
            gl::DeleteFramebuffers(1, &framebuffer.0);
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer.map_or(0, |f| f.0));
        }
    }

    fn attach_depth(&mut self, attachment: DepthAttachment) -> bool {
        unsafe {
            match attachment {
                DepthAttachment::Texture2d(texture) => {
                    gl::FramebufferTexture(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, texture.0, 0);
                }
                DepthAttachment::CubeFace(texture, face) => {
                    gl::FramebufferTexture2D(
                        gl::FRAMEBUFFER,
                        gl::DEPTH_ATTACHMENT,
                        face.gl_target(),
                        texture.0,
                        0,
                    );
                }
            }
            gl::CheckFramebufferStatus(gl::FRAMEBUFFER) == gl::FRAMEBUFFER_COMPLETE
        }
    }

    fn viewport(&mut self, width: i32, height: i32) {
        unsafe {
            gl::Viewport(0, 0, width, height);
        }
    }

    fn clear_depth(&mut self) {
        unsafe {
            gl::Clear(gl::DEPTH_BUFFER_BIT);
        }
    }

    fn clear_color_and_depth(&mut self, color: Vec3) {
        unsafe {
            gl::ClearColor(color.x, color.y, color.z, 0.0);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        unsafe {
            gl::UseProgram(program.0);
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let cname = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program.0, cname.as_ptr()) };
        (location >= 0).then_some(UniformLocation(location))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: Uniform) {
        let loc = location.0;
        unsafe {
            match value {
                Uniform::Int(v) => gl::Uniform1i(loc, v),
                Uniform::Float(v) => gl::Uniform1f(loc, v),
                Uniform::Vec3(v) => gl::Uniform3f(loc, v.x, v.y, v.z),
                Uniform::Mat4(m) => {
                    gl::UniformMatrix4fv(loc, 1, gl::FALSE, m.to_cols_array().as_ptr())
                }
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, binding: TextureBinding) {
        let (target, texture) = match binding {
            TextureBinding::Texture1d(t) => (gl::TEXTURE_1D, t),
            TextureBinding::Texture2d(t) => (gl::TEXTURE_2D, t),
            TextureBinding::CubeMap(t) => (gl::TEXTURE_CUBE_MAP, t),
        };
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(target, texture.0);
        }
    }

    fn create_uniform_buffer(
        &mut self,
        program: ProgramId,
        block: &str,
        size: usize,
    ) -> Option<BufferId> {
        let cname = CString::new(block).ok()?;
        unsafe {
            let block_index = gl::GetUniformBlockIndex(program.0, cname.as_ptr());
            if block_index == gl::INVALID_INDEX {
                return None;
            }
            gl::UniformBlockBinding(program.0, block_index, 0);
            let mut buffer = 0;
            gl::GenBuffers(1, &mut buffer);
            gl::BindBuffer(gl::UNIFORM_BUFFER, buffer);
            gl::BufferData(gl::UNIFORM_BUFFER, size as GLsizeiptr, ptr::null(), gl::DYNAMIC_DRAW);
            gl::BindBufferBase(gl::UNIFORM_BUFFER, 0, buffer);
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
            Some(BufferId(buffer))
        }
    }

    fn upload_uniform_buffer(&mut self, buffer: BufferId, bytes: &[u8]) {
        unsafe {
            gl::BindBuffer(gl::UNIFORM_BUFFER, buffer.0);
            gl::BufferSubData(
                gl::UNIFORM_BUFFER,
                0,
                bytes.len() as GLsizeiptr,
                bytes.as_ptr() as *const _,
            );
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        unsafe {
            gl::DeleteBuffers(1, &buffer.0);
        }
    }

    fn upload_mesh(&mut self, data: &MeshData) -> GpuMesh {
        let mut vao = 0;
        let mut buffers = [0; 4];
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(4, buffers.as_mut_ptr());
            gl::BindVertexArray(vao);

            upload_attribute(buffers[0], 0, 3, bytemuck::cast_slice(&data.positions));
            upload_attribute(buffers[1], 1, 2, bytemuck::cast_slice(&data.uvs));
            upload_attribute(buffers[2], 2, 3, bytemuck::cast_slice(&data.normals));

            if let Some(indices) = &data.indices {
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, buffers[3]);
                gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    (indices.len() * mem::size_of::<u32>()) as GLsizeiptr,
                    indices.as_ptr() as *const _,
                    gl::STATIC_DRAW,
                );
            }

            gl::BindVertexArray(0);
        }

        GpuMesh {
            vao,
            buffers,
            count: data.draw_count() as i32,
            indexed: data.indices.is_some(),
        }
    }

    fn draw_mesh(&mut self, mesh: &GpuMesh) {
        unsafe {
            gl::BindVertexArray(mesh.vao);
            if mesh.indexed {
                gl::DrawElements(gl::TRIANGLES, mesh.count, gl::UNSIGNED_INT, ptr::null());
            } else {
                gl::DrawArrays(gl::TRIANGLES, 0, mesh.count);
            }
            gl::BindVertexArray(0);
        }
    }

    fn delete_mesh(&mut self, mesh: GpuMesh) {
        unsafe {
            gl::DeleteVertexArrays(1, &mesh.vao);
            gl::DeleteBuffers(4, mesh.buffers.as_ptr());
        }
    }

    fn draw_fullscreen_quad(&mut self) {
        unsafe {
            gl::BindVertexArray(self.quad_vao);
            gl::DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
            gl::BindVertexArray(0);
        }
    }
}

unsafe fn upload_attribute(buffer: GLuint, location: GLuint, components: GLint, floats: &[f32]) {
    gl::BindBuffer(gl::ARRAY_BUFFER, buffer);
    gl::BufferData(
        gl::ARRAY_BUFFER,
        (floats.len() * mem::size_of::<f32>()) as GLsizeiptr,
        floats.as_ptr() as *const _,
        gl::STATIC_DRAW,
    );
    gl::VertexAttribPointer(location, components, gl::FLOAT, gl::FALSE, 0, ptr::null());
    gl::EnableVertexAttribArray(location);
}
