use sdl2::video::{GLContext, GLProfile, Window};
use sdl2::Sdl;

use crate::error::AppError;

pub struct AppWindow {
    _gl_context: GLContext,
    window: Window,
}

impl AppWindow {
    /// Opens a resizable window with a current OpenGL 3.3 core context and
    /// loads the GL entry points.
    pub fn new(sdl: &Sdl, title: &str, width: u32, height: u32) -> Result<Self, AppError> {
        let video = sdl.video().map_err(AppError::Sdl)?;

        let gl_attr = video.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);
        gl_attr.set_double_buffer(true);

        let window = video
            .window(title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| AppError::Sdl(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(AppError::Sdl)?;

        gl::load_with(|s| video.gl_get_proc_address(s) as *const _);

        let (major, minor) = gl_attr.context_version();
        log::info!("OpenGL {major}.{minor} core context, {width}x{height} window");

        Ok(Self {
            _gl_context: gl_context,
            window,
        })
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }

    pub fn size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.size();
        w as f32 / h.max(1) as f32
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.window.set_title(title) {
            log::warn!("could not set window title: {e}");
        }
    }
}
