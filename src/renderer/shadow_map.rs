use glam::Mat4;

use crate::config::SHADOW_MAP_SIZE;
use crate::renderer::gpu::{DepthTarget, Gpu, ProgramId, TextureBinding, TextureId, Uniform, UniformLocation};
use crate::scene::light::LightKind;

/// The depth target of one light: a 2D map for directional lights, a cube
/// map for point lights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowTexture {
    Texture2d(TextureId),
    CubeMap(TextureId),
}

/// A uniform location resolved lazily for a given (program, slot) pair.
/// Moving the light to another slot or switching programs forces a fresh
/// lookup, since the uniform name embeds the slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CachedLocation {
    #[default]
    Unresolved,
    Resolved {
        program: ProgramId,
        slot: usize,
        location: Option<UniformLocation>,
    },
}

impl CachedLocation {
    pub fn resolve(
        &mut self,
        gpu: &mut dyn Gpu,
        program: ProgramId,
        slot: usize,
        name: impl FnOnce() -> String,
    ) -> Option<UniformLocation> {
        match *self {
            CachedLocation::Resolved {
                program: p,
                slot: s,
                location,
            } if p == program && s == slot => location,
            _ => {
                let location = gpu.uniform_location(program, &name());
                *self = CachedLocation::Resolved {
                    program,
                    slot,
                    location,
                };
                location
            }
        }
    }
}

pub struct ShadowMap {
    texture: ShadowTexture,
    /// Last light-space matrix used for the 2D map. Cube faces are not kept.
    pub view_projection: Mat4,
    sampler_location: CachedLocation,
    view_projection_location: CachedLocation,
}

impl ShadowMap {
    pub fn allocate(gpu: &mut dyn Gpu, kind: LightKind) -> Self {
        let texture = match kind {
            LightKind::Directional => {
                ShadowTexture::Texture2d(gpu.create_depth_texture(DepthTarget::Texture2d, SHADOW_MAP_SIZE))
            }
            LightKind::Point => {
                ShadowTexture::CubeMap(gpu.create_depth_texture(DepthTarget::CubeMap, SHADOW_MAP_SIZE))
            }
        };
        Self {
            texture,
            view_projection: Mat4::IDENTITY,
            sampler_location: CachedLocation::Unresolved,
            view_projection_location: CachedLocation::Unresolved,
        }
    }

    pub fn texture(&self) -> ShadowTexture {
        self.texture
    }

    pub fn release(self, gpu: &mut dyn Gpu) {
        match self.texture {
            ShadowTexture::Texture2d(texture) | ShadowTexture::CubeMap(texture) => {
                gpu.delete_texture(texture)
            }
        }
    }

    /// Binds the map to texture `unit` for the lit pass. Returns false and
    /// binds nothing when the program has no sampler for `slot`.
    pub fn bind_for_sampling(
        &mut self,
        gpu: &mut dyn Gpu,
        program: ProgramId,
        slot: usize,
        unit: u32,
    ) -> bool {
        match self.texture {
            ShadowTexture::Texture2d(texture) => {
                let Some(sampler) = self.sampler_location.resolve(gpu, program, slot, || {
                    format!("shadowMap{slot}")
                }) else {
                    return false;
                };
                gpu.bind_texture(unit, TextureBinding::Texture2d(texture));
                gpu.set_uniform(sampler, Uniform::Int(unit as i32));
                if let Some(matrix) = self.view_projection_location.resolve(gpu, program, slot, || {
                    format!("shadowMapViewProjection{slot}")
                }) {
                    gpu.set_uniform(matrix, Uniform::Mat4(self.view_projection));
                }
            }
            ShadowTexture::CubeMap(texture) => {
                let Some(sampler) = self.sampler_location.resolve(gpu, program, slot, || {
                    format!("shadowCubeMap{slot}")
                }) else {
                    return false;
                };
                gpu.bind_texture(unit, TextureBinding::CubeMap(texture));
                gpu.set_uniform(sampler, Uniform::Int(unit as i32));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::gpu::recording::{Call, RecordingGpu};

    const PROGRAM: ProgramId = ProgramId(100);

    #[test]
    fn allocation_follows_light_kind() {
        let mut gpu = RecordingGpu::new();
        let sun = ShadowMap::allocate(&mut gpu, LightKind::Directional);
        let bulb = ShadowMap::allocate(&mut gpu, LightKind::Point);
        assert!(matches!(sun.texture(), ShadowTexture::Texture2d(_)));
        assert!(matches!(bulb.texture(), ShadowTexture::CubeMap(_)));
        assert!(matches!(
            gpu.calls[..],
            [
                Call::CreateDepthTexture(DepthTarget::Texture2d, _),
                Call::CreateDepthTexture(DepthTarget::CubeMap, _)
            ]
        ));
    }

    #[test]
    fn release_deletes_the_texture() {
        let mut gpu = RecordingGpu::new();
        let map = ShadowMap::allocate(&mut gpu, LightKind::Point);
        let ShadowTexture::CubeMap(texture) = map.texture() else {
            panic!("point light should own a cube map");
        };
        gpu.clear();
        map.release(&mut gpu);
        assert_eq!(gpu.calls, vec![Call::DeleteTexture(texture)]);
    }

    #[test]
    fn directional_binding_sets_sampler_and_matrix() {
        let mut gpu = RecordingGpu::new();
        let mut map = ShadowMap::allocate(&mut gpu, LightKind::Directional);
        map.view_projection = Mat4::from_scale(glam::Vec3::splat(2.0));
        gpu.clear();

        assert!(map.bind_for_sampling(&mut gpu, PROGRAM, 0, 1));
        assert_eq!(gpu.uniform_writes(PROGRAM, "shadowMap0"), vec![Uniform::Int(1)]);
        assert_eq!(
            gpu.uniform_writes(PROGRAM, "shadowMapViewProjection0"),
            vec![Uniform::Mat4(map.view_projection)]
        );
    }

    #[test]
    fn locations_resolve_once_per_program_and_slot() {
        let mut gpu = RecordingGpu::new();
        let mut map = ShadowMap::allocate(&mut gpu, LightKind::Point);
        map.bind_for_sampling(&mut gpu, PROGRAM, 2, 3);
        map.bind_for_sampling(&mut gpu, PROGRAM, 2, 3);
        assert_eq!(gpu.location_lookups, 1);

        // compaction moved the light down one slot
        map.bind_for_sampling(&mut gpu, PROGRAM, 1, 2);
        assert_eq!(gpu.location_lookups, 2);
        assert_eq!(gpu.uniform_writes(PROGRAM, "shadowCubeMap1"), vec![Uniform::Int(2)]);
    }

    #[test]
    fn absent_sampler_skips_the_slot() {
        let mut gpu = RecordingGpu::new();
        gpu.absent_uniforms.insert("shadowMap5".to_string());
        let mut map = ShadowMap::allocate(&mut gpu, LightKind::Directional);
        gpu.clear();
        assert!(!map.bind_for_sampling(&mut gpu, PROGRAM, 5, 6));
        assert!(!map.bind_for_sampling(&mut gpu, PROGRAM, 5, 6));
        assert!(gpu.calls.is_empty());
        assert_eq!(gpu.location_lookups, 1);
    }
}
