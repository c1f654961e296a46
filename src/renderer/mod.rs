pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod shader;
pub mod shadow_map;

pub use gpu::GlGpu;
pub use pipeline::{FrameView, RenderPipeline, SceneGeometry};
pub use shader::ShaderProgram;
