use glam::Vec3;
use rand::rngs::StdRng;
use sdl2::keyboard::Scancode;

use crate::config::{ColorTarget, SceneConfig, CHANNEL_LABELS, MAX_LIGHTS};
use crate::renderer::gpu::Gpu;
use crate::sampling::DistributionTextures;
use crate::scene::LightSet;

const SAMPLE_STEP: usize = 4;
const BIAS_STEP: f32 = 0.0001;
const SIZE_STEP: f32 = 0.1;
const MIN_LIGHT_SIZE: f32 = 0.1;
const NUDGE: f32 = 0.07;
const COLOR_STEP: f32 = 0.05;
const SPECULAR_STEP: f32 = 0.1;

/// One change to the scene triggered from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tweak {
    CycleDisplayMode,
    ToggleShadowMapView,
    ShadowMapIndex(isize),
    ToggleAnimation,
    ToggleLightKind,
    AddLight,
    RemoveLight,
    SelectNextLight,
    SelectPreviousLight,
    ToggleLightEnabled,
    BlockerSearchSamples(isize),
    PcfSamples(isize),
    DirectionalBias(f32),
    PointBias(f32),
    IncreasePower,
    DecreasePower,
    LightSize(f32),
    MoveLight(Vec3),
    CycleColorTarget,
    CycleColorChannel,
    ColorChannel(f32),
    Specularity(f32),
    SpecularPower(f32),
    CycleMeshTexture,
    CycleGroundTexture,
}

/// What the app still has to do after a tweak was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweakEffect {
    Applied,
    ReloadDiffuseMaps,
}

impl Tweak {
    /// Binding for a key press. With Alt held only light movement applies.
    pub fn for_key(key: Scancode, alt: bool) -> Option<Tweak> {
        if alt {
            let delta = match key {
                Scancode::A | Scancode::Left => Vec3::new(-NUDGE, 0.0, 0.0),
                Scancode::D | Scancode::Right => Vec3::new(NUDGE, 0.0, 0.0),
                Scancode::W | Scancode::Up => Vec3::new(0.0, 0.0, NUDGE),
                Scancode::S | Scancode::Down => Vec3::new(0.0, 0.0, -NUDGE),
                Scancode::Q | Scancode::KpPlus => Vec3::new(0.0, NUDGE, 0.0),
                Scancode::E | Scancode::KpMinus => Vec3::new(0.0, -NUDGE, 0.0),
                _ => return None,
            };
            return Some(Tweak::MoveLight(delta));
        }
        let tweak = match key {
            Scancode::M => Tweak::CycleDisplayMode,
            Scancode::T => Tweak::ToggleShadowMapView,
            Scancode::LeftBracket => Tweak::ShadowMapIndex(-1),
            Scancode::RightBracket => Tweak::ShadowMapIndex(1),
            Scancode::L => Tweak::ToggleAnimation,
            Scancode::K => Tweak::ToggleLightKind,
            Scancode::N => Tweak::AddLight,
            Scancode::Delete => Tweak::RemoveLight,
            Scancode::PageUp => Tweak::SelectNextLight,
            Scancode::PageDown => Tweak::SelectPreviousLight,
            Scancode::E => Tweak::ToggleLightEnabled,
            Scancode::Num1 => Tweak::BlockerSearchSamples(-(SAMPLE_STEP as isize)),
            Scancode::Num2 => Tweak::BlockerSearchSamples(SAMPLE_STEP as isize),
            Scancode::Num3 => Tweak::PcfSamples(-(SAMPLE_STEP as isize)),
            Scancode::Num4 => Tweak::PcfSamples(SAMPLE_STEP as isize),
            Scancode::Num5 => Tweak::DirectionalBias(-BIAS_STEP),
            Scancode::Num6 => Tweak::DirectionalBias(BIAS_STEP),
            Scancode::Num7 => Tweak::PointBias(-BIAS_STEP),
            Scancode::Num8 => Tweak::PointBias(BIAS_STEP),
            Scancode::KpPlus => Tweak::IncreasePower,
            Scancode::KpMinus => Tweak::DecreasePower,
            Scancode::Z => Tweak::LightSize(-SIZE_STEP),
            Scancode::X => Tweak::LightSize(SIZE_STEP),
            Scancode::C => Tweak::CycleColorTarget,
            Scancode::V => Tweak::CycleColorChannel,
            Scancode::G => Tweak::ColorChannel(-COLOR_STEP),
            Scancode::H => Tweak::ColorChannel(COLOR_STEP),
            Scancode::O => Tweak::Specularity(-SPECULAR_STEP),
            Scancode::P => Tweak::Specularity(SPECULAR_STEP),
            Scancode::U => Tweak::SpecularPower(-SPECULAR_STEP),
            Scancode::I => Tweak::SpecularPower(SPECULAR_STEP),
            Scancode::F6 => Tweak::CycleMeshTexture,
            Scancode::F7 => Tweak::CycleGroundTexture,
            _ => return None,
        };
        Some(tweak)
    }
}

/// Everything a tweak may touch, borrowed from the app for one key press.
pub struct TweakTarget<'a> {
    pub config: &'a mut SceneConfig,
    pub lights: &'a mut LightSet,
    pub gpu: &'a mut dyn Gpu,
    pub distributions: &'a DistributionTextures,
    pub rng: &'a mut StdRng,
    /// Candidates for the diffuse-map cycles, by file name.
    pub diffuse_maps: &'a [String],
}

fn step(count: usize, delta: isize) -> usize {
    count.saturating_add_signed(delta)
}

fn step_channel(color: &mut Vec3, channel: usize, delta: f32) {
    color[channel] = (color[channel] + delta).clamp(0.0, 1.0);
}

/// The entry after `current`, or the first one when `current` is unknown.
fn next_diffuse_map(maps: &[String], current: &str) -> Option<String> {
    let next = match maps.iter().position(|m| m == current) {
        Some(i) => (i + 1) % maps.len(),
        None => 0,
    };
    maps.get(next).cloned()
}

impl TweakTarget<'_> {
    pub fn apply(&mut self, tweak: Tweak) -> TweakEffect {
        let config = &mut *self.config;
        match tweak {
            Tweak::CycleDisplayMode => {
                config.display_mode = config.display_mode.next();
                log::info!("Display mode: {}", config.display_mode.label());
            }
            Tweak::ToggleShadowMapView => {
                config.draw_shadow_map = !config.draw_shadow_map;
                log::info!("Draw shadow map: {}", config.draw_shadow_map);
            }
            Tweak::ShadowMapIndex(delta) => {
                config.shadow_map_index = step(config.shadow_map_index, delta).min(MAX_LIGHTS - 1);
                log::info!("Shadow map index: {}", config.shadow_map_index);
            }
            Tweak::ToggleAnimation => {
                config.animate_lights = !config.animate_lights;
                log::info!("Animate lights: {}", config.animate_lights);
            }
            Tweak::ToggleLightKind => {
                config.selected_kind = config.selected_kind.toggled();
                log::info!("Next light kind: {}", config.selected_kind.label());
            }
            Tweak::AddLight => {
                if let Err(e) = self.lights.add(self.gpu, config.selected_kind) {
                    log::warn!("Cannot add light: {e}");
                }
            }
            Tweak::RemoveLight => {
                match self.lights.remove(self.gpu, config.selected_light) {
                    Ok(_) => config.selected_light = 0,
                    Err(e) => log::warn!("Cannot remove light: {e}"),
                }
            }
            Tweak::SelectNextLight => {
                config.selected_light = if self.lights.is_empty() {
                    0
                } else {
                    (config.selected_light + 1) % self.lights.len()
                };
                log::info!("Selected light: {}", config.selected_light);
            }
            Tweak::SelectPreviousLight => {
                config.selected_light = match config.selected_light {
                    0 => self.lights.len().saturating_sub(1),
                    n => n - 1,
                };
                log::info!("Selected light: {}", config.selected_light);
            }
            Tweak::BlockerSearchSamples(delta) => {
                let count = step(config.blocker_search_samples, delta);
                if config.set_blocker_search_samples(count) {
                    self.distributions.regenerate_blocker_search(
                        self.gpu,
                        self.rng,
                        config.blocker_search_samples,
                    );
                    log::info!("Blocker search samples: {}", config.blocker_search_samples);
                }
            }
            Tweak::PcfSamples(delta) => {
                let count = step(config.pcf_samples, delta);
                if config.set_pcf_samples(count) {
                    self.distributions.regenerate_pcf(self.gpu, self.rng, config.pcf_samples);
                    log::info!("PCF samples: {}", config.pcf_samples);
                }
            }
            Tweak::DirectionalBias(delta) => {
                config.directional_bias = (config.directional_bias + delta).max(0.0);
                log::info!("Directional shadow bias: {:.4}", config.directional_bias);
            }
            Tweak::PointBias(delta) => {
                config.point_bias = (config.point_bias + delta).max(0.0);
                log::info!("Point shadow bias: {:.4}", config.point_bias);
            }
            Tweak::CycleColorTarget => {
                config.color_target = config.color_target.next();
                log::info!("Editing {}", config.color_target.label());
            }
            Tweak::CycleColorChannel => {
                config.color_channel = (config.color_channel + 1) % CHANNEL_LABELS.len();
                log::info!("Editing channel {}", CHANNEL_LABELS[config.color_channel]);
            }
            Tweak::ColorChannel(delta) => {
                let channel = config.color_channel;
                let target = config.color_target;
                match target {
                    ColorTarget::Ambient => {
                        step_channel(&mut config.ambient_color, channel, delta);
                        log::info!("Ambient color: {}", config.ambient_color);
                    }
                    ColorTarget::SceneSpecular => {
                        step_channel(&mut config.specular_color, channel, delta);
                        log::info!("Specular color: {}", config.specular_color);
                    }
                    ColorTarget::LightDiffuse | ColorTarget::LightSpecular => {
                        self.apply_to_selected(tweak)
                    }
                }
            }
            Tweak::Specularity(delta) => {
                config.specularity = (config.specularity + delta).max(0.0);
                log::info!("Specularity: {:.1}", config.specularity);
            }
            Tweak::CycleMeshTexture | Tweak::CycleGroundTexture => {
                let slot = match tweak {
                    Tweak::CycleMeshTexture => &mut config.mesh_texture,
                    _ => &mut config.ground_texture,
                };
                let Some(next) = next_diffuse_map(self.diffuse_maps, slot) else {
                    log::warn!("No diffuse maps to choose from");
                    return TweakEffect::Applied;
                };
                log::info!("Diffuse map: {slot} -> {next}");
                *slot = next;
                return TweakEffect::ReloadDiffuseMaps;
            }
            Tweak::ToggleLightEnabled
            | Tweak::IncreasePower
            | Tweak::DecreasePower
            | Tweak::LightSize(_)
            | Tweak::SpecularPower(_)
            | Tweak::MoveLight(_) => self.apply_to_selected(tweak),
        }
        TweakEffect::Applied
    }

    fn apply_to_selected(&mut self, tweak: Tweak) {
        let slot = self.config.selected_light;
        let Some(light) = self.lights.get_mut(slot) else {
            log::debug!("No light in slot {slot}");
            return;
        };
        let source = &mut light.source;
        match tweak {
            Tweak::ToggleLightEnabled => {
                source.enabled = !source.enabled;
                log::info!("Light {slot} enabled: {}", source.enabled);
            }
            Tweak::IncreasePower => {
                source.increase_power();
                log::info!("Light {slot} power: {:.1}", source.diffuse_power);
            }
            Tweak::DecreasePower => {
                source.decrease_power();
                log::info!("Light {slot} power: {:.1}", source.diffuse_power);
            }
            Tweak::LightSize(delta) => {
                source.size = (source.size + delta).max(MIN_LIGHT_SIZE);
                log::info!("Light {slot} size: {:.1}", source.size);
            }
            Tweak::MoveLight(delta) => {
                source.translate(delta);
                log::debug!("Light {slot} at {}", source.position());
            }
            Tweak::SpecularPower(delta) => {
                source.specular_power = (source.specular_power + delta).max(0.0);
                log::info!("Light {slot} specular power: {:.1}", source.specular_power);
            }
            Tweak::ColorChannel(delta) => {
                let channel = self.config.color_channel;
                if self.config.color_target == ColorTarget::LightDiffuse {
                    step_channel(&mut source.diffuse_color, channel, delta);
                    log::info!("Light {slot} diffuse color: {}", source.diffuse_color);
                } else {
                    step_channel(&mut source.specular_color, channel, delta);
                    log::info!("Light {slot} specular color: {}", source.specular_color);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayMode, MAX_NUM_SAMPLES, MIN_NUM_SAMPLES};
    use crate::renderer::gpu::recording::{Call, RecordingGpu};
    use crate::scene::LightKind;
    use rand::SeedableRng;

    struct Fixture {
        gpu: RecordingGpu,
        config: SceneConfig,
        lights: LightSet,
        distributions: DistributionTextures,
        rng: StdRng,
        diffuse_maps: Vec<String>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut gpu = RecordingGpu::new();
            let mut rng = StdRng::seed_from_u64(11);
            let config = SceneConfig::default();
            let distributions = DistributionTextures::create(
                &mut gpu,
                &mut rng,
                config.blocker_search_samples,
                config.pcf_samples,
            );
            let mut lights = LightSet::new();
            lights.add(&mut gpu, LightKind::Directional).unwrap();
            lights.add(&mut gpu, LightKind::Point).unwrap();
            gpu.clear();
            Self {
                gpu,
                config,
                lights,
                distributions,
                rng,
                diffuse_maps: ["brick_floor.jpg", "marble.png", "wood.png"]
                    .map(String::from)
                    .to_vec(),
            }
        }

        fn press(&mut self, key: Scancode, alt: bool) -> TweakEffect {
            let tweak = Tweak::for_key(key, alt).expect("key should be bound");
            TweakTarget {
                config: &mut self.config,
                lights: &mut self.lights,
                gpu: &mut self.gpu,
                distributions: &self.distributions,
                rng: &mut self.rng,
                diffuse_maps: &self.diffuse_maps,
            }
            .apply(tweak)
        }
    }

    #[test]
    fn alt_switches_keys_to_light_movement() {
        assert_eq!(Tweak::for_key(Scancode::E, false), Some(Tweak::ToggleLightEnabled));
        assert_eq!(
            Tweak::for_key(Scancode::E, true),
            Some(Tweak::MoveLight(Vec3::new(0.0, -NUDGE, 0.0)))
        );
        assert_eq!(Tweak::for_key(Scancode::W, false), None);
        assert_eq!(Tweak::for_key(Scancode::M, true), None);
    }

    #[test]
    fn display_mode_cycles() {
        let mut f = Fixture::new();
        f.press(Scancode::M, false);
        assert_eq!(f.config.display_mode, DisplayMode::SoftShadows);
    }

    #[test]
    fn removing_resets_selection() {
        let mut f = Fixture::new();
        f.press(Scancode::PageUp, false);
        assert_eq!(f.config.selected_light, 1);
        f.press(Scancode::Delete, false);
        assert_eq!(f.lights.len(), 1);
        assert_eq!(f.config.selected_light, 0);
        assert!(f.gpu.calls.iter().any(|c| matches!(c, Call::DeleteTexture(_))));
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut f = Fixture::new();
        f.press(Scancode::PageDown, false);
        assert_eq!(f.config.selected_light, 1);
        f.press(Scancode::PageUp, false);
        assert_eq!(f.config.selected_light, 0);
    }

    #[test]
    fn add_uses_selected_kind() {
        let mut f = Fixture::new();
        f.press(Scancode::K, false);
        assert_eq!(f.config.selected_kind, LightKind::Point);
        f.press(Scancode::N, false);
        assert_eq!(f.lights.len(), 3);
        assert_eq!(f.lights.get(2).unwrap().source.kind(), LightKind::Point);
    }

    #[test]
    fn add_beyond_capacity_changes_nothing() {
        let mut f = Fixture::new();
        for _ in 0..MAX_LIGHTS {
            f.press(Scancode::N, false);
        }
        assert_eq!(f.lights.len(), MAX_LIGHTS);
    }

    #[test]
    fn sample_changes_regenerate_only_that_distribution() {
        let mut f = Fixture::new();
        f.press(Scancode::Num4, false);
        assert_eq!(f.config.pcf_samples, 20);
        let pcf = f.distributions.pcf;
        assert!(matches!(
            f.gpu.calls[..],
            [Call::UploadDistribution(texture, _)] if texture == pcf
        ));
    }

    #[test]
    fn clamped_sample_counts_do_not_regenerate() {
        let mut f = Fixture::new();
        f.config.blocker_search_samples = MIN_NUM_SAMPLES;
        f.press(Scancode::Num1, false);
        assert_eq!(f.config.blocker_search_samples, MIN_NUM_SAMPLES);
        assert!(f.gpu.calls.is_empty());

        f.config.pcf_samples = MAX_NUM_SAMPLES;
        f.press(Scancode::Num4, false);
        assert!(f.gpu.calls.is_empty());
    }

    #[test]
    fn alt_nudges_the_selected_light() {
        let mut f = Fixture::new();
        f.config.selected_light = 1;
        f.press(Scancode::Q, true);
        let y = f.lights.get(1).unwrap().source.position().y;
        assert!((y - 3.07).abs() < 1e-5);
    }

    #[test]
    fn light_size_has_a_floor() {
        let mut f = Fixture::new();
        for _ in 0..10 {
            f.press(Scancode::Z, false);
        }
        assert_eq!(f.lights.get(0).unwrap().source.size, MIN_LIGHT_SIZE);
    }

    #[test]
    fn selected_light_tweaks_ignore_empty_slots() {
        let mut f = Fixture::new();
        f.config.selected_light = 5;
        f.press(Scancode::E, false);
        f.press(Scancode::KpPlus, false);
        assert!(f.lights.iter().all(|l| l.source.enabled));
        assert_eq!(f.lights.get(0).unwrap().source.diffuse_power, 1.0);
    }

    #[test]
    fn bias_never_goes_negative() {
        let mut f = Fixture::new();
        f.config.point_bias = 0.00005;
        f.press(Scancode::Num7, false);
        assert_eq!(f.config.point_bias, 0.0);
    }

    #[test]
    fn color_channels_step_the_chosen_target_and_clamp() {
        let mut f = Fixture::new();
        f.press(Scancode::H, false);
        assert!((f.config.ambient_color.x - 0.15).abs() < 1e-6);
        assert_eq!(f.config.ambient_color.y, 0.1);

        f.press(Scancode::C, false);
        f.press(Scancode::V, false);
        f.press(Scancode::H, false);
        assert_eq!(f.config.specular_color, Vec3::ONE);
        for _ in 0..30 {
            f.press(Scancode::G, false);
        }
        assert_eq!(f.config.specular_color, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn light_colors_follow_the_selected_light() {
        let mut f = Fixture::new();
        f.config.selected_light = 1;
        f.config.color_target = ColorTarget::LightDiffuse;
        f.config.color_channel = 2;
        f.press(Scancode::G, false);
        assert!((f.lights.get(1).unwrap().source.diffuse_color.z - 0.95).abs() < 1e-6);
        assert_eq!(f.lights.get(0).unwrap().source.diffuse_color, Vec3::ONE);

        f.press(Scancode::C, false);
        assert_eq!(f.config.color_target, ColorTarget::LightSpecular);
        f.press(Scancode::G, false);
        assert!((f.lights.get(1).unwrap().source.specular_color.z - 0.95).abs() < 1e-6);
    }

    #[test]
    fn channel_selection_wraps() {
        let mut f = Fixture::new();
        for _ in 0..3 {
            f.press(Scancode::V, false);
        }
        assert_eq!(f.config.color_channel, 0);
    }

    #[test]
    fn specular_power_starts_dark_and_never_goes_negative() {
        let mut f = Fixture::new();
        assert_eq!(f.lights.get(0).unwrap().source.specular_power, 0.0);
        f.press(Scancode::I, false);
        f.press(Scancode::I, false);
        assert!((f.lights.get(0).unwrap().source.specular_power - 0.2).abs() < 1e-6);
        for _ in 0..5 {
            f.press(Scancode::U, false);
        }
        assert_eq!(f.lights.get(0).unwrap().source.specular_power, 0.0);
        assert_eq!(f.lights.get(0).unwrap().source.record().specular_power, 0.0);
    }

    #[test]
    fn specularity_has_a_floor_of_zero() {
        let mut f = Fixture::new();
        f.press(Scancode::P, false);
        assert!((f.config.specularity - 1.1).abs() < 1e-6);
        for _ in 0..20 {
            f.press(Scancode::O, false);
        }
        assert_eq!(f.config.specularity, 0.0);
    }

    #[test]
    fn diffuse_map_cycles_request_a_reload() {
        let mut f = Fixture::new();
        assert_eq!(f.press(Scancode::F6, false), TweakEffect::ReloadDiffuseMaps);
        assert_eq!(f.config.mesh_texture, "brick_floor.jpg");
        f.press(Scancode::F6, false);
        assert_eq!(f.config.mesh_texture, "marble.png");

        assert_eq!(f.press(Scancode::F7, false), TweakEffect::ReloadDiffuseMaps);
        assert_eq!(f.config.ground_texture, "marble.png");
        assert_eq!(f.press(Scancode::M, false), TweakEffect::Applied);
    }

    #[test]
    fn empty_diffuse_map_list_keeps_the_current_name() {
        let mut f = Fixture::new();
        f.diffuse_maps.clear();
        assert_eq!(f.press(Scancode::F7, false), TweakEffect::Applied);
        assert_eq!(f.config.ground_texture, "brick_floor.jpg");
    }
}
