use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdl2::keyboard::Scancode;
use sdl2::Sdl;
use std::path::{Path, PathBuf};

use crate::assets::{list_diffuse_maps, load_obj, load_rgb_image};
use crate::camera::{Camera, Navigator};
use crate::config::{DisplayMode, SceneConfig, MEDIA_DIR};
use crate::engine::input::{InputEvent, InputState};
use crate::engine::time::{FpsCounter, FrameTimer};
use crate::engine::window::AppWindow;
use crate::error::{AppError, Result};
use crate::renderer::gpu::{Gpu, TextureId};
use crate::renderer::mesh::create_xz_plane;
use crate::renderer::{FrameView, GlGpu, RenderPipeline, SceneGeometry, ShaderProgram};
use crate::sampling::DistributionTextures;
use crate::scene::{LightKind, LightSet};
use crate::ui::{Tweak, TweakEffect, TweakTarget};

const SHADOW_PASS_VERT: &str = include_str!("../shaders/shadow_pass.vert");
const SHADOW_PASS_FRAG: &str = include_str!("../shaders/shadow_pass.frag");
const FULLSCREEN_VERT: &str = include_str!("../shaders/fullscreen.vert");
const DRAW_SHADOW_MAP_FRAG: &str = include_str!("../shaders/draw_shadow_map.frag");
const COMMON_VERT: &str = include_str!("../shaders/common.vert");
const PCSS_FRAG: &str = include_str!("../shaders/pcss.frag");

const GROUND_SIZE: f32 = 20.0;
const GROUND_UV_REPEAT: f32 = 4.0;
const GROUND_HEIGHT: f32 = -0.25;

const MOVE_SPEED: f32 = 10.0;
const ROTATE_SPEED: f32 = 0.01;
const START_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Running,
    ShuttingDown,
}

struct Programs {
    depth: ShaderProgram,
    debug: ShaderProgram,
    lit: ShaderProgram,
}

impl Programs {
    fn compile() -> Result<Self> {
        let depth = ShaderProgram::from_sources(SHADOW_PASS_VERT, SHADOW_PASS_FRAG)
            .map_err(|e| AppError::Shader(format!("shadow pass: {e}")))?;
        let debug = ShaderProgram::from_sources(FULLSCREEN_VERT, DRAW_SHADOW_MAP_FRAG)
            .map_err(|e| AppError::Shader(format!("shadow map view: {e}")))?;
        let lit = ShaderProgram::from_sources(COMMON_VERT, PCSS_FRAG)
            .map_err(|e| AppError::Shader(format!("lit pass: {e}")))?;
        Ok(Self { depth, debug, lit })
    }
}

pub struct PcssApp {
    gpu: GlGpu,
    programs: Programs,
    pipeline: RenderPipeline,
    lights: LightSet,
    config: SceneConfig,
    distributions: DistributionTextures,
    geometry: SceneGeometry,
    diffuse_maps: Vec<String>,
    rng: StdRng,
    camera: Camera,
    navigator: Navigator,
    state: RunState,
    fps: FpsCounter,
}

impl PcssApp {
    /// Builds every GPU resource. Needs the window's GL context to be current.
    pub fn new(mesh_file: &str, config: SceneConfig) -> Result<Self> {
        let mut gpu = GlGpu::init();
        let programs = Programs::compile()?;

        let mesh = load_obj(&media_path(mesh_file))?;
        let ground = create_xz_plane(GROUND_SIZE, GROUND_SIZE, 1, 1, GROUND_UV_REPEAT);
        let geometry = SceneGeometry {
            object: gpu.upload_mesh(&mesh),
            ground: gpu.upload_mesh(&ground),
            object_texture: replace_diffuse_map(&mut gpu, None, &media_path(&config.mesh_texture)),
            ground_texture: replace_diffuse_map(&mut gpu, None, &media_path(&config.ground_texture)),
            object_model: Mat4::IDENTITY,
            ground_model: Mat4::from_translation(Vec3::new(0.0, GROUND_HEIGHT, 0.0)),
        };

        let diffuse_maps = list_diffuse_maps(Path::new(MEDIA_DIR)).unwrap_or_else(|e| {
            log::warn!("{e}; diffuse map cycling disabled");
            Vec::new()
        });

        let mut rng = StdRng::from_entropy();
        let distributions = DistributionTextures::create(
            &mut gpu,
            &mut rng,
            config.blocker_search_samples,
            config.pcf_samples,
        );

        let pipeline = RenderPipeline::new(
            &mut gpu,
            programs.depth.handle(),
            programs.debug.handle(),
            programs.lit.handle(),
        );

        let mut lights = LightSet::new();
        lights.add(&mut gpu, LightKind::Directional)?;

        log::info!(
            "Scene ready: directional bias {}, point bias {}, {} blocker / {} PCF samples",
            config.directional_bias,
            config.point_bias,
            config.blocker_search_samples,
            config.pcf_samples
        );

        Ok(Self {
            gpu,
            programs,
            pipeline,
            lights,
            config,
            distributions,
            geometry,
            diffuse_maps,
            rng,
            camera: Camera::new(),
            navigator: Navigator::new(MOVE_SPEED, ROTATE_SPEED, START_POSITION),
            state: RunState::Running,
            fps: FpsCounter::default(),
        })
    }

    pub fn run(mut self, sdl: &Sdl, window: &mut AppWindow) -> Result<()> {
        let mut event_pump = sdl.event_pump().map_err(AppError::Sdl)?;
        let mut input = InputState::new();
        let mut timer = FrameTimer::new();

        while self.state == RunState::Running {
            timer.tick();
            input.update(&mut event_pump);
            if input.should_quit() {
                self.state = RunState::ShuttingDown;
                break;
            }
            self.handle_events(&input.events);

            self.render(window);
            self.gpu.check_errors();
            window.swap();

            if self.config.animate_lights {
                self.lights.animate(timer.dt);
            }
            self.navigator.update(timer.dt);

            if let Some(fps) = self.fps.frame(timer.dt) {
                window.set_title(&window_title(fps, self.config.display_mode));
            }
        }

        self.shutdown();
        Ok(())
    }

    fn handle_events(&mut self, events: &[InputEvent]) {
        for event in events {
            match *event {
                InputEvent::KeyPressed { key, alt } => {
                    if !alt {
                        self.navigator.key_down(key);
                    }
                    if key == Scancode::F5 {
                        self.reload_diffuse_maps();
                    } else if let Some(tweak) = Tweak::for_key(key, alt) {
                        let effect = TweakTarget {
                            config: &mut self.config,
                            lights: &mut self.lights,
                            gpu: &mut self.gpu,
                            distributions: &self.distributions,
                            rng: &mut self.rng,
                            diffuse_maps: &self.diffuse_maps,
                        }
                        .apply(tweak);
                        if effect == TweakEffect::ReloadDiffuseMaps {
                            self.reload_diffuse_maps();
                        }
                    }
                }
                InputEvent::KeyReleased { key, alt: false } => self.navigator.key_up(key),
                InputEvent::KeyReleased { alt: true, .. } => {}
                InputEvent::MouseDown(button) => self.navigator.button_down(button),
                InputEvent::MouseUp(button) => self.navigator.button_up(button),
                InputEvent::MouseMoved { x, y } => self.navigator.mouse_move(x, y),
                InputEvent::Wheel(delta) => self.navigator.mouse_wheel(delta),
                InputEvent::Resized { width, height } => {
                    log::debug!("Window resized to {width}x{height}");
                }
            }
        }
    }

    fn render(&mut self, window: &AppWindow) {
        let (width, height) = window.size();
        let aspect = window.aspect_ratio();
        let frame = FrameView {
            view: self.navigator.view_matrix(),
            projection: self.camera.projection_matrix(aspect),
            eye_position: self.navigator.position,
            frustum_size: self.camera.frustum_size(aspect),
            width: width as i32,
            height: height as i32,
        };
        let outcome = self.pipeline.render_frame(
            &mut self.gpu,
            &mut self.lights,
            &self.config,
            &frame,
            &self.geometry,
            &self.distributions,
        );
        log::trace!("frame: {outcome:?}");
    }

    fn reload_diffuse_maps(&mut self) {
        self.geometry.object_texture = replace_diffuse_map(
            &mut self.gpu,
            self.geometry.object_texture,
            &media_path(&self.config.mesh_texture),
        );
        self.geometry.ground_texture = replace_diffuse_map(
            &mut self.gpu,
            self.geometry.ground_texture,
            &media_path(&self.config.ground_texture),
        );
    }

    fn shutdown(self) {
        let Self {
            mut gpu,
            programs,
            pipeline,
            mut lights,
            distributions,
            geometry,
            ..
        } = self;

        lights.release_all(&mut gpu);
        pipeline.release(&mut gpu);
        distributions.release(&mut gpu);
        for texture in [geometry.object_texture, geometry.ground_texture].into_iter().flatten() {
            gpu.delete_texture(texture);
        }
        gpu.delete_mesh(geometry.object);
        gpu.delete_mesh(geometry.ground);
        drop(programs);
        gpu.check_errors();
        log::info!("Released all GPU resources");
    }
}

fn media_path(name: &str) -> PathBuf {
    Path::new(MEDIA_DIR).join(name)
}

/// Loads `path` as a diffuse map. On success the previous texture is freed;
/// on failure it stays in use.
fn replace_diffuse_map(
    gpu: &mut dyn Gpu,
    previous: Option<TextureId>,
    path: &Path,
) -> Option<TextureId> {
    match load_rgb_image(path) {
        Ok(image) => {
            let texture = gpu.create_color_texture(image.width, image.height, &image.pixels);
            if let Some(old) = previous {
                gpu.delete_texture(old);
            }
            log::info!("Loaded {} ({}x{})", path.display(), image.width, image.height);
            Some(texture)
        }
        Err(e) => {
            log::warn!("{e}; keeping the previous diffuse map");
            previous
        }
    }
}

fn window_title(fps: f32, mode: DisplayMode) -> String {
    format!("PCSS @ {fps:.0} fps | {}", mode.label())
}
