use glam::Vec3;

use crate::scene::light::LightKind;

pub const SCREEN_WIDTH: u32 = 1024;
pub const SCREEN_HEIGHT: u32 = 768;
pub const SHADOW_MAP_SIZE: i32 = 1024;

/// Must match `MAX_LIGHTS` in the lit fragment shader.
pub const MAX_LIGHTS: usize = 8;

pub const DEFAULT_NUM_SAMPLES: usize = 16;
pub const MIN_NUM_SAMPLES: usize = 4;
pub const MAX_NUM_SAMPLES: usize = 256;

pub const DEFAULT_DIRECTIONAL_BIAS: f32 = 0.025;
pub const DEFAULT_POINT_BIAS: f32 = 0.0075;
pub const DEFAULT_LIGHT_SIZE: f32 = 0.5;

pub const FOV: f32 = 60.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;

pub const MEDIA_DIR: &str = "media/";
pub const DEFAULT_MESH_TEXTURE: &str = "wood.png";
pub const DEFAULT_GROUND_TEXTURE: &str = "brick_floor.jpg";

/// Shading strategy selected in the lit fragment shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    HardShadows,
    SoftShadows,
    BlockerSearch,
    PenumbraEstimate,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::HardShadows,
        DisplayMode::SoftShadows,
        DisplayMode::BlockerSearch,
        DisplayMode::PenumbraEstimate,
    ];

    /// Value of the `displayMode` uniform.
    pub fn as_uniform(self) -> i32 {
        match self {
            DisplayMode::HardShadows => 0,
            DisplayMode::SoftShadows => 1,
            DisplayMode::BlockerSearch => 2,
            DisplayMode::PenumbraEstimate => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.as_uniform() as usize + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::HardShadows => "Hard Shadows",
            DisplayMode::SoftShadows => "Soft Shadows",
            DisplayMode::BlockerSearch => "Blocker Search",
            DisplayMode::PenumbraEstimate => "Penumbra Estimate",
        }
    }
}

/// Which colour the channel tweaks edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorTarget {
    #[default]
    Ambient,
    SceneSpecular,
    LightDiffuse,
    LightSpecular,
}

impl ColorTarget {
    pub fn next(self) -> Self {
        match self {
            ColorTarget::Ambient => ColorTarget::SceneSpecular,
            ColorTarget::SceneSpecular => ColorTarget::LightDiffuse,
            ColorTarget::LightDiffuse => ColorTarget::LightSpecular,
            ColorTarget::LightSpecular => ColorTarget::Ambient,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorTarget::Ambient => "ambient color",
            ColorTarget::SceneSpecular => "scene specular color",
            ColorTarget::LightDiffuse => "light diffuse color",
            ColorTarget::LightSpecular => "light specular color",
        }
    }
}

pub const CHANNEL_LABELS: [&str; 3] = ["R", "G", "B"];

/// Every scene-wide tunable. Owned by the app, handed to the pipeline by
/// reference each frame and mutated only between frames.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub ambient_color: Vec3,
    pub specular_color: Vec3,
    pub specularity: f32,
    pub directional_bias: f32,
    pub point_bias: f32,
    pub draw_shadow_map: bool,
    pub shadow_map_index: usize,
    pub blocker_search_samples: usize,
    pub pcf_samples: usize,
    pub display_mode: DisplayMode,
    pub animate_lights: bool,
    pub selected_light: usize,
    /// Kind used by the next "add light" command.
    pub selected_kind: LightKind,
    pub color_target: ColorTarget,
    /// Index into R, G, B.
    pub color_channel: usize,
    pub mesh_texture: String,
    pub ground_texture: String,
}

impl SceneConfig {
    pub fn new(directional_bias: f32, point_bias: f32) -> Self {
        Self {
            directional_bias,
            point_bias,
            ..Self::default()
        }
    }

    /// Stores a clamped blocker-search count. Returns true when it changed.
    pub fn set_blocker_search_samples(&mut self, count: usize) -> bool {
        let count = clamp_samples(count);
        let changed = count != self.blocker_search_samples;
        self.blocker_search_samples = count;
        changed
    }

    /// Stores a clamped PCF count. Returns true when it changed.
    pub fn set_pcf_samples(&mut self, count: usize) -> bool {
        let count = clamp_samples(count);
        let changed = count != self.pcf_samples;
        self.pcf_samples = count;
        changed
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.1),
            specular_color: Vec3::ONE,
            specularity: 1.0,
            directional_bias: DEFAULT_DIRECTIONAL_BIAS,
            point_bias: DEFAULT_POINT_BIAS,
            draw_shadow_map: false,
            shadow_map_index: 0,
            blocker_search_samples: DEFAULT_NUM_SAMPLES,
            pcf_samples: DEFAULT_NUM_SAMPLES,
            display_mode: DisplayMode::HardShadows,
            animate_lights: false,
            selected_light: 0,
            selected_kind: LightKind::Directional,
            color_target: ColorTarget::Ambient,
            color_channel: 0,
            mesh_texture: DEFAULT_MESH_TEXTURE.to_string(),
            ground_texture: DEFAULT_GROUND_TEXTURE.to_string(),
        }
    }
}

pub fn clamp_samples(count: usize) -> usize {
    count.clamp(MIN_NUM_SAMPLES, MAX_NUM_SAMPLES)
}
