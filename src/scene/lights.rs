use bytemuck::Zeroable;

use crate::config::MAX_LIGHTS;
use crate::error::LightError;
use crate::renderer::gpu::Gpu;
use crate::renderer::shadow_map::ShadowMap;
use crate::scene::light::{LightKind, LightRecord, LightSource};

/// A light together with the shadow map it owns. Both are created and
/// destroyed as one unit, so a slot can never point at another light's map.
pub struct Light {
    pub source: LightSource,
    pub shadow_map: ShadowMap,
}

/// Ordered lights. A light's slot is its position in the list; removing a
/// light shifts every later light down one slot.
#[derive(Default)]
pub struct LightSet {
    lights: Vec<Light>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Light> {
        self.lights.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Light> {
        self.lights.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Light> {
        self.lights.iter_mut()
    }

    /// Creates a light with its shadow map and returns its slot. Fails
    /// without touching the GPU once the shader's light capacity is used up.
    pub fn add(&mut self, gpu: &mut dyn Gpu, kind: LightKind) -> Result<usize, LightError> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(LightError::CapacityReached(MAX_LIGHTS));
        }
        let slot = self.lights.len();
        self.lights.push(Light {
            source: LightSource::new(kind),
            shadow_map: ShadowMap::allocate(gpu, kind),
        });
        log::info!("Added {} light at slot {slot}", kind.label());
        Ok(slot)
    }

    /// Removes the light at `slot` and frees its shadow map.
    pub fn remove(&mut self, gpu: &mut dyn Gpu, slot: usize) -> Result<LightSource, LightError> {
        if slot >= self.lights.len() {
            return Err(LightError::NoSuchLight(slot));
        }
        let light = self.lights.remove(slot);
        light.shadow_map.release(gpu);
        log::info!(
            "Removed {} light from slot {slot}, {} left",
            light.source.kind().label(),
            self.lights.len()
        );
        Ok(light.source)
    }

    /// Contents of the fixed-size light buffer: one record per slot, zeros
    /// for disabled lights and unused slots.
    pub fn records(&self) -> [LightRecord; MAX_LIGHTS] {
        let mut records = [LightRecord::zeroed(); MAX_LIGHTS];
        for (record, light) in records.iter_mut().zip(&self.lights) {
            *record = light.source.record();
        }
        records
    }

    /// Steps the automatic motion of every enabled light.
    pub fn animate(&mut self, seconds_per_frame: f32) {
        for light in self.lights.iter_mut().filter(|l| l.source.enabled) {
            light.source.animate(seconds_per_frame);
        }
    }

    /// Frees every shadow map. Used on shutdown.
    pub fn release_all(&mut self, gpu: &mut dyn Gpu) {
        for light in self.lights.drain(..) {
            light.shadow_map.release(gpu);
        }
    }
}
