//! Per-frame shadow protocol: a depth-only pass per enabled light, then a
//! lit forward pass sampling every shadow map at once.

use glam::{Mat4, Vec3};

use crate::config::{SceneConfig, MAX_LIGHTS, SHADOW_MAP_SIZE};
use crate::renderer::gpu::{
    BufferId, DepthAttachment, FramebufferId, Gpu, GpuMesh, ProgramId, TextureBinding, TextureId,
    Uniform,
};
use crate::renderer::shader::UniformCache;
use crate::renderer::shadow_map::ShadowTexture;
use crate::sampling::DistributionTextures;
use crate::scene::light::{point_projection, CubeFace, LightKind, LightRecord};
use crate::scene::LightSet;

/// Uniform block holding `MAX_LIGHTS` light records.
pub const LIGHT_BLOCK: &str = "LightSources";

/// Camera-side inputs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye_position: Vec3,
    pub frustum_size: f32,
    pub width: i32,
    pub height: i32,
}

/// The two objects of the scene and their diffuse maps.
pub struct SceneGeometry {
    pub object: GpuMesh,
    pub ground: GpuMesh,
    pub object_texture: Option<TextureId>,
    pub ground_texture: Option<TextureId>,
    pub object_model: Mat4,
    pub ground_model: Mat4,
}

/// What the forward pass ended up doing, for the window title and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardOutcome {
    Shaded,
    ShadowMapShown,
    /// Debug view requested but the index has no 2D map to show.
    NothingShown,
}

pub struct RenderPipeline {
    framebuffer: FramebufferId,
    depth_program: ProgramId,
    depth_uniforms: UniformCache,
    debug_program: ProgramId,
    debug_uniforms: UniformCache,
    lit_uniforms: UniformCache,
    light_buffer: Option<BufferId>,
}

impl RenderPipeline {
    pub fn new(
        gpu: &mut dyn Gpu,
        depth_program: ProgramId,
        debug_program: ProgramId,
        lit_program: ProgramId,
    ) -> Self {
        let framebuffer = gpu.create_depth_framebuffer();
        let light_buffer = gpu.create_uniform_buffer(
            lit_program,
            LIGHT_BLOCK,
            MAX_LIGHTS * std::mem::size_of::<LightRecord>(),
        );
        if light_buffer.is_none() {
            log::warn!("lit program has no {LIGHT_BLOCK} block, lights will not be uploaded");
        }
        Self {
            framebuffer,
            depth_program,
            depth_uniforms: UniformCache::new(depth_program),
            debug_program,
            debug_uniforms: UniformCache::new(debug_program),
            lit_uniforms: UniformCache::new(lit_program),
            light_buffer,
        }
    }

    pub fn render_frame(
        &mut self,
        gpu: &mut dyn Gpu,
        lights: &mut LightSet,
        config: &SceneConfig,
        view: &FrameView,
        geometry: &SceneGeometry,
        distributions: &DistributionTextures,
    ) -> ForwardOutcome {
        self.depth_pass(gpu, lights, &geometry.object);
        self.forward_pass(gpu, lights, config, view, geometry, distributions)
    }

    /// Renders the occluder into every enabled light's shadow map. Returns
    /// the number of draws issued.
    pub fn depth_pass(&mut self, gpu: &mut dyn Gpu, lights: &mut LightSet, occluder: &GpuMesh) -> usize {
        let mut draws = 0;
        gpu.bind_framebuffer(Some(self.framebuffer));
        gpu.viewport(SHADOW_MAP_SIZE, SHADOW_MAP_SIZE);

        for (slot, light) in lights.iter_mut().enumerate() {
            if !light.source.enabled {
                continue;
            }
            match light.shadow_map.texture() {
                ShadowTexture::Texture2d(texture) => {
                    if !gpu.attach_depth(DepthAttachment::Texture2d(texture)) {
                        log::warn!("shadow framebuffer incomplete for light {slot}, skipping");
                        continue;
                    }
                    let view_projection = match light.source.view_projection(None) {
                        Ok(m) => m,
                        Err(e) => {
                            log::warn!("light {slot}: {e}, skipping");
                            continue;
                        }
                    };
                    light.shadow_map.view_projection = view_projection;
                    self.draw_depth(gpu, occluder, view_projection);
                    draws += 1;
                }
                ShadowTexture::CubeMap(texture) => {
                    for face in CubeFace::ALL {
                        if !gpu.attach_depth(DepthAttachment::CubeFace(texture, face)) {
                            log::warn!("shadow framebuffer incomplete for light {slot} face {face:?}, skipping");
                            continue;
                        }
                        // Used for this face only; the lit pass rebuilds cube
                        // lookups from the light position.
                        let view_projection =
                            match light.source.view_projection_for_target(face.gl_target()) {
                                Ok(m) => m,
                                Err(e) => {
                                    log::warn!("light {slot} face {face:?}: {e}, skipping");
                                    continue;
                                }
                            };
                        self.draw_depth(gpu, occluder, view_projection);
                        draws += 1;
                    }
                }
            }
        }
        draws
    }

    fn draw_depth(&mut self, gpu: &mut dyn Gpu, occluder: &GpuMesh, view_projection: Mat4) {
        gpu.clear_depth();
        gpu.use_program(self.depth_program);
        self.depth_uniforms
            .set(gpu, "modelViewProjection", Uniform::Mat4(view_projection));
        gpu.draw_mesh(occluder);
    }

    pub fn forward_pass(
        &mut self,
        gpu: &mut dyn Gpu,
        lights: &mut LightSet,
        config: &SceneConfig,
        view: &FrameView,
        geometry: &SceneGeometry,
        distributions: &DistributionTextures,
    ) -> ForwardOutcome {
        gpu.bind_framebuffer(None);
        gpu.viewport(view.width, view.height);
        gpu.clear_color_and_depth(config.ambient_color);

        if config.draw_shadow_map {
            return self.draw_shadow_map(gpu, lights, config.shadow_map_index);
        }

        let u = &mut self.lit_uniforms;
        let program = u.program();
        gpu.use_program(program);

        u.set(gpu, "eyePosition", Uniform::Vec3(view.eye_position));
        u.set(gpu, "view", Uniform::Mat4(view.view));
        u.set(gpu, "invView", Uniform::Mat4(view.view.inverse()));
        u.set(gpu, "projection", Uniform::Mat4(view.projection));
        u.set(gpu, "lightProjection", Uniform::Mat4(point_projection()));
        u.set(gpu, "model", Uniform::Mat4(geometry.object_model));
        if let Some(texture) = geometry.object_texture {
            bind_diffuse(gpu, u, texture);
        }
        u.set(gpu, "ambientColor", Uniform::Vec3(config.ambient_color));
        u.set(gpu, "specularColor", Uniform::Vec3(config.specular_color));
        u.set(gpu, "specularity", Uniform::Float(config.specularity));

        if let Some(buffer) = self.light_buffer {
            let records = lights.records();
            gpu.upload_uniform_buffer(buffer, bytemuck::cast_slice(&records[..]));
        }

        u.set(gpu, "directionalLightShadowMapBias", Uniform::Float(config.directional_bias));
        u.set(gpu, "pointLightShadowMapBias", Uniform::Float(config.point_bias));
        u.set(gpu, "frustumSize", Uniform::Float(view.frustum_size));

        // Unit 0 holds the diffuse map; shadow maps follow their slot.
        let mut bound = [None; MAX_LIGHTS];
        for (slot, light) in lights.iter_mut().enumerate().take(MAX_LIGHTS) {
            if light.source.enabled
                && light
                    .shadow_map
                    .bind_for_sampling(gpu, program, slot, slot as u32 + 1)
            {
                bound[slot] = Some(light.source.kind());
            }
        }
        park_idle_samplers(gpu, u, &bound);

        let first_free_unit = lights.len() as u32 + 2;
        if let Some(location) = u.location(gpu, "distribution0") {
            gpu.bind_texture(first_free_unit, TextureBinding::Texture1d(distributions.blocker_search));
            gpu.set_uniform(location, Uniform::Int(first_free_unit as i32));
        }
        if let Some(location) = u.location(gpu, "distribution1") {
            gpu.bind_texture(first_free_unit + 1, TextureBinding::Texture1d(distributions.pcf));
            gpu.set_uniform(location, Uniform::Int(first_free_unit as i32 + 1));
        }
        u.set(gpu, "numBlockerSearchSamples", Uniform::Int(config.blocker_search_samples as i32));
        u.set(gpu, "numPCFSamples", Uniform::Int(config.pcf_samples as i32));
        u.set(gpu, "displayMode", Uniform::Int(config.display_mode.as_uniform()));
        u.set(gpu, "selectedLightSource", Uniform::Int(config.selected_light as i32));

        gpu.draw_mesh(&geometry.object);

        u.set(gpu, "model", Uniform::Mat4(geometry.ground_model));
        if let Some(texture) = geometry.ground_texture {
            bind_diffuse(gpu, u, texture);
        }
        u.set(gpu, "specularColor", Uniform::Vec3(Vec3::ZERO));
        u.set(gpu, "specularity", Uniform::Float(0.0));

        gpu.draw_mesh(&geometry.ground);

        ForwardOutcome::Shaded
    }

    fn draw_shadow_map(&mut self, gpu: &mut dyn Gpu, lights: &LightSet, index: usize) -> ForwardOutcome {
        let Some(light) = lights.get(index) else {
            return ForwardOutcome::NothingShown;
        };
        let ShadowTexture::Texture2d(texture) = light.shadow_map.texture() else {
            log::debug!("light {index} has a cube map, nothing to show");
            return ForwardOutcome::NothingShown;
        };
        gpu.use_program(self.debug_program);
        gpu.bind_texture(0, TextureBinding::Texture2d(texture));
        self.debug_uniforms.set(gpu, "shadowMap", Uniform::Int(0));
        gpu.draw_fullscreen_quad();
        ForwardOutcome::ShadowMapShown
    }

    pub fn release(self, gpu: &mut dyn Gpu) {
        gpu.delete_framebuffer(self.framebuffer);
        if let Some(buffer) = self.light_buffer {
            gpu.delete_buffer(buffer);
        }
    }
}

const SHADOW_MAP_NAMES: [&str; MAX_LIGHTS] = [
    "shadowMap0", "shadowMap1", "shadowMap2", "shadowMap3",
    "shadowMap4", "shadowMap5", "shadowMap6", "shadowMap7",
];
const SHADOW_CUBE_MAP_NAMES: [&str; MAX_LIGHTS] = [
    "shadowCubeMap0", "shadowCubeMap1", "shadowCubeMap2", "shadowCubeMap3",
    "shadowCubeMap4", "shadowCubeMap5", "shadowCubeMap6", "shadowCubeMap7",
];

/// Units past everything the lit pass binds. Nothing is ever bound to them.
pub const IDLE_2D_UNIT: u32 = MAX_LIGHTS as u32 + 4;
pub const IDLE_CUBE_UNIT: u32 = MAX_LIGHTS as u32 + 5;

/// Samplers of different types must not share a unit, and the program keeps
/// whatever unit a slot had before lights were removed or disabled. Every
/// slot sampler not bound this frame is moved to the idle unit of its type.
fn park_idle_samplers(
    gpu: &mut dyn Gpu,
    uniforms: &mut UniformCache,
    bound: &[Option<LightKind>; MAX_LIGHTS],
) {
    for (slot, kind) in bound.iter().enumerate() {
        if *kind != Some(LightKind::Directional) {
            uniforms.set(gpu, SHADOW_MAP_NAMES[slot], Uniform::Int(IDLE_2D_UNIT as i32));
        }
        if *kind != Some(LightKind::Point) {
            uniforms.set(gpu, SHADOW_CUBE_MAP_NAMES[slot], Uniform::Int(IDLE_CUBE_UNIT as i32));
        }
    }
}

fn bind_diffuse(gpu: &mut dyn Gpu, uniforms: &mut UniformCache, texture: TextureId) {
    if let Some(location) = uniforms.location(gpu, "tex0") {
        gpu.bind_texture(0, TextureBinding::Texture2d(texture));
        gpu.set_uniform(location, Uniform::Int(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayMode;
    use crate::renderer::gpu::recording::{Call, RecordingGpu};
    use crate::renderer::mesh::create_xz_plane;
    use crate::scene::light::point_view_projection;
    use crate::scene::LightKind;
    use bytemuck::Zeroable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DEPTH: ProgramId = ProgramId(1000);
    const DEBUG: ProgramId = ProgramId(1001);
    const LIT: ProgramId = ProgramId(1002);

    struct Fixture {
        gpu: RecordingGpu,
        pipeline: RenderPipeline,
        lights: LightSet,
        config: SceneConfig,
        view: FrameView,
        geometry: SceneGeometry,
        distributions: DistributionTextures,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_gpu(RecordingGpu::new())
        }

        fn with_gpu(mut gpu: RecordingGpu) -> Self {
            let pipeline = RenderPipeline::new(&mut gpu, DEPTH, DEBUG, LIT);
            let plane = create_xz_plane(20.0, 20.0, 1, 1, 4.0);
            let geometry = SceneGeometry {
                object: gpu.upload_mesh(&plane),
                ground: gpu.upload_mesh(&plane),
                object_texture: Some(gpu.create_color_texture(1, 1, &[255, 0, 0])),
                ground_texture: None,
                object_model: Mat4::IDENTITY,
                ground_model: Mat4::from_translation(Vec3::new(0.0, -0.25, 0.0)),
            };
            let mut rng = StdRng::seed_from_u64(5);
            let distributions = DistributionTextures::create(&mut gpu, &mut rng, 16, 16);
            gpu.clear();
            Self {
                gpu,
                pipeline,
                lights: LightSet::new(),
                config: SceneConfig::default(),
                view: FrameView {
                    view: Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y),
                    projection: Mat4::perspective_rh_gl(1.0, 4.0 / 3.0, 0.1, 100.0),
                    eye_position: Vec3::new(0.0, 0.0, 3.0),
                    frustum_size: 1.0,
                    width: 1024,
                    height: 768,
                },
                geometry,
                distributions,
            }
        }

        fn add(&mut self, kind: LightKind) -> usize {
            let slot = self.lights.add(&mut self.gpu, kind).unwrap();
            self.gpu.clear();
            slot
        }

        fn depth_pass(&mut self) -> usize {
            self.pipeline
                .depth_pass(&mut self.gpu, &mut self.lights, &self.geometry.object)
        }

        fn frame(&mut self) -> ForwardOutcome {
            self.pipeline.render_frame(
                &mut self.gpu,
                &mut self.lights,
                &self.config,
                &self.view,
                &self.geometry,
                &self.distributions,
            )
        }

        fn uploaded_records(&self) -> Vec<LightRecord> {
            self.gpu
                .calls
                .iter()
                .find_map(|c| match c {
                    Call::UploadUniformBuffer(_, bytes) => Some(
                        bytes
                            .chunks_exact(std::mem::size_of::<LightRecord>())
                            .map(bytemuck::pod_read_unaligned::<LightRecord>)
                            .collect(),
                    ),
                    _ => None,
                })
                .expect("light buffer upload")
        }
    }

    #[test]
    fn no_enabled_lights_means_no_depth_draws_and_a_zeroed_buffer() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        f.lights.get_mut(0).unwrap().source.enabled = false;

        assert_eq!(f.depth_pass(), 0);
        assert_eq!(f.gpu.draw_count(), 0);
        assert!(!f.gpu.calls.iter().any(|c| matches!(c, Call::AttachDepth(_))));

        f.gpu.clear();
        assert_eq!(f.frame(), ForwardOutcome::Shaded);
        let records = f.uploaded_records();
        assert_eq!(records.len(), MAX_LIGHTS);
        assert!(records.iter().all(|r| *r == LightRecord::zeroed()));
    }

    #[test]
    fn directional_light_draws_once_and_caches_its_matrix() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        assert_eq!(f.depth_pass(), 1);

        let expected = f.lights.get(0).unwrap().source.view_projection(None).unwrap();
        assert_eq!(f.lights.get(0).unwrap().shadow_map.view_projection, expected);
        assert_eq!(
            f.gpu.uniform_writes(DEPTH, "modelViewProjection"),
            vec![Uniform::Mat4(expected)]
        );
        assert_eq!(f.gpu.calls[0], Call::BindFramebuffer(Some(f.pipeline.framebuffer)));
        assert_eq!(f.gpu.calls[1], Call::Viewport(SHADOW_MAP_SIZE, SHADOW_MAP_SIZE));
    }

    #[test]
    fn point_light_renders_six_faces_without_caching() {
        let mut f = Fixture::new();
        f.add(LightKind::Point);
        assert_eq!(f.depth_pass(), 6);

        let attached: Vec<CubeFace> = f
            .gpu
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::AttachDepth(DepthAttachment::CubeFace(_, face)) => Some(*face),
                _ => None,
            })
            .collect();
        assert_eq!(attached, CubeFace::ALL.to_vec());
        assert_eq!(f.lights.get(0).unwrap().shadow_map.view_projection, Mat4::IDENTITY);
        assert_eq!(f.gpu.uniform_writes(DEPTH, "modelViewProjection").len(), 6);
    }

    #[test]
    fn each_cube_face_uses_its_own_view_projection() {
        let mut f = Fixture::new();
        f.add(LightKind::Point);
        let position = f.lights.get(0).unwrap().source.position();
        f.depth_pass();

        let expected: Vec<Uniform> = CubeFace::ALL
            .iter()
            .map(|&face| Uniform::Mat4(point_view_projection(position, face)))
            .collect();
        assert_eq!(f.gpu.uniform_writes(DEPTH, "modelViewProjection"), expected);
    }

    #[test]
    fn incomplete_framebuffer_skips_only_that_light() {
        let mut gpu = RecordingGpu::new();
        // Texture ids are handed out sequentially; find the first light's map.
        let mut probe = LightSet::new();
        probe.add(&mut gpu, LightKind::Directional).unwrap();
        let ShadowTexture::Texture2d(bad) = probe.get(0).unwrap().shadow_map.texture() else {
            unreachable!()
        };
        let mut f = Fixture::with_gpu(gpu);
        f.lights = probe;
        f.gpu.incomplete.push(DepthAttachment::Texture2d(bad));
        f.add(LightKind::Directional);

        assert_eq!(f.depth_pass(), 1);
        assert_eq!(f.lights.get(0).unwrap().shadow_map.view_projection, Mat4::IDENTITY);
        assert_ne!(f.lights.get(1).unwrap().shadow_map.view_projection, Mat4::IDENTITY);
    }

    #[test]
    fn forward_pass_binds_shadow_maps_and_distributions_to_distinct_units() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        f.add(LightKind::Point);
        f.config.display_mode = DisplayMode::SoftShadows;
        f.config.selected_light = 1;
        f.frame();

        let units: Vec<(u32, TextureBinding)> = f
            .gpu
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::BindTexture(unit, binding) => Some((*unit, *binding)),
                _ => None,
            })
            .collect();
        let map = |slot: usize| f.lights.get(slot).unwrap().shadow_map.texture();
        let ShadowTexture::Texture2d(sun) = map(0) else { unreachable!() };
        let ShadowTexture::CubeMap(bulb) = map(1) else { unreachable!() };

        assert!(units.contains(&(1, TextureBinding::Texture2d(sun))));
        assert!(units.contains(&(2, TextureBinding::CubeMap(bulb))));
        assert!(units.contains(&(4, TextureBinding::Texture1d(f.distributions.blocker_search))));
        assert!(units.contains(&(5, TextureBinding::Texture1d(f.distributions.pcf))));
        assert_eq!(f.gpu.uniform_writes(LIT, "displayMode"), vec![Uniform::Int(1)]);
        assert_eq!(f.gpu.uniform_writes(LIT, "selectedLightSource"), vec![Uniform::Int(1)]);
        assert_eq!(f.gpu.uniform_writes(LIT, "shadowMap0"), vec![Uniform::Int(1)]);
        assert_eq!(f.gpu.uniform_writes(LIT, "shadowCubeMap1"), vec![Uniform::Int(2)]);
    }

    #[test]
    fn idle_samplers_never_share_a_unit_with_other_types() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        f.add(LightKind::Point);
        f.add(LightKind::Point);
        f.frame();
        f.lights.remove(&mut f.gpu, 1).unwrap();
        f.gpu.clear();
        f.frame();

        // slot 1 now holds the second point light; slot 2 is empty
        assert_eq!(
            f.gpu.uniform_writes(LIT, "shadowCubeMap0"),
            vec![Uniform::Int(IDLE_CUBE_UNIT as i32)]
        );
        assert_eq!(
            f.gpu.uniform_writes(LIT, "shadowMap1"),
            vec![Uniform::Int(IDLE_2D_UNIT as i32)]
        );
        assert_eq!(f.gpu.uniform_writes(LIT, "shadowCubeMap1"), vec![Uniform::Int(2)]);
        assert_eq!(
            f.gpu.uniform_writes(LIT, "shadowCubeMap2"),
            vec![Uniform::Int(IDLE_CUBE_UNIT as i32)]
        );
        assert_eq!(
            f.gpu.uniform_writes(LIT, "shadowMap7"),
            vec![Uniform::Int(IDLE_2D_UNIT as i32)]
        );
    }

    #[test]
    fn ground_is_drawn_after_the_object_without_specular() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        f.frame();

        let draws: Vec<&Call> = f
            .gpu
            .calls
            .iter()
            .filter(|c| matches!(c, Call::DrawMesh(_)))
            .collect();
        // one depth draw, then object, then ground
        assert_eq!(
            draws,
            vec![
                &Call::DrawMesh(f.geometry.object.vao),
                &Call::DrawMesh(f.geometry.object.vao),
                &Call::DrawMesh(f.geometry.ground.vao),
            ]
        );
        assert_eq!(
            f.gpu.uniform_writes(LIT, "model"),
            vec![
                Uniform::Mat4(Mat4::IDENTITY),
                Uniform::Mat4(f.geometry.ground_model)
            ]
        );
        assert_eq!(
            f.gpu.uniform_writes(LIT, "specularity"),
            vec![Uniform::Float(1.0), Uniform::Float(0.0)]
        );
        assert_eq!(
            f.gpu.uniform_writes(LIT, "specularColor").last(),
            Some(&Uniform::Vec3(Vec3::ZERO))
        );
    }

    #[test]
    fn disabled_lights_are_neither_rendered_nor_bound() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        f.add(LightKind::Directional);
        f.lights.get_mut(0).unwrap().source.enabled = false;
        f.frame();

        assert_eq!(
            f.gpu.uniform_writes(LIT, "shadowMap0"),
            vec![Uniform::Int(IDLE_2D_UNIT as i32)]
        );
        assert_eq!(f.gpu.uniform_writes(LIT, "shadowMap1"), vec![Uniform::Int(2)]);
        let records = f.uploaded_records();
        assert_eq!(records[0], LightRecord::zeroed());
        assert_eq!(records[1].kind, 1);
    }

    #[test]
    fn absent_uniforms_do_not_stop_the_frame() {
        let mut gpu = RecordingGpu::new();
        for name in ["shadowMap0", "distribution0", "frustumSize", "tex0"] {
            gpu.absent_uniforms.insert(name.to_string());
        }
        gpu.missing_light_block = true;
        let mut f = Fixture::with_gpu(gpu);
        f.add(LightKind::Directional);

        assert_eq!(f.frame(), ForwardOutcome::Shaded);
        assert!(!f
            .gpu
            .calls
            .iter()
            .any(|c| matches!(c, Call::UploadUniformBuffer(..))));
        let units: Vec<u32> = f
            .gpu
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::BindTexture(unit, _) => Some(*unit),
                _ => None,
            })
            .collect();
        assert_eq!(units, vec![4]);
    }

    #[test]
    fn shadow_map_debug_view_shows_only_directional_maps() {
        let mut f = Fixture::new();
        f.add(LightKind::Directional);
        f.add(LightKind::Point);
        f.config.draw_shadow_map = true;

        f.config.shadow_map_index = 0;
        assert_eq!(f.frame(), ForwardOutcome::ShadowMapShown);
        assert!(f.gpu.calls.contains(&Call::DrawFullscreenQuad));
        assert!(!f
            .gpu
            .calls
            .iter()
            .any(|c| matches!(c, Call::UploadUniformBuffer(..))));

        for index in [1, 7, 50] {
            f.gpu.clear();
            f.config.shadow_map_index = index;
            assert_eq!(f.frame(), ForwardOutcome::NothingShown);
            assert!(!f.gpu.calls.contains(&Call::DrawFullscreenQuad));
        }
    }

    #[test]
    fn release_frees_framebuffer_and_light_buffer() {
        let mut f = Fixture::new();
        let framebuffer = f.pipeline.framebuffer;
        let buffer = f.pipeline.light_buffer.unwrap();
        f.pipeline.release(&mut f.gpu);
        assert_eq!(
            f.gpu.calls,
            vec![Call::DeleteFramebuffer(framebuffer), Call::DeleteBuffer(buffer)]
        );
    }
}
