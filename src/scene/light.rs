use bytemuck::{Pod, Zeroable};
use gl::types::GLenum;
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::TAU;

use crate::config::DEFAULT_LIGHT_SIZE;
use crate::error::LightError;

/// Half-extent of the directional light's orthographic frustum.
const ORTHO_EXTENT: f32 = 10.0;
const ORTHO_NEAR: f32 = -20.0;
const ORTHO_FAR: f32 = 20.0;

const POINT_NEAR: f32 = 1.0;
const POINT_FAR: f32 = 10.0;

/// Up vector for the directional light's look-at.
const DIRECTIONAL_UP: Vec3 = Vec3::new(-1.0, 0.0, 0.0);

/// Radians per second for animated directional lights (a quarter turn).
const DIRECTIONAL_SPIN_RATE: f32 = TAU * 0.25;
/// Period of the point light's vertical sawtooth.
const POINT_BOB_PERIOD: f32 = 4.0;

/// Light category without its payload. Used wherever only the type matters,
/// e.g. choosing what the next "add light" creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
}

impl LightKind {
    /// Encoding in the shader's `LightSource.type` field.
    pub fn as_raw(self) -> i32 {
        match self {
            LightKind::Directional => 1,
            LightKind::Point => 2,
        }
    }

    #[cfg(test)]
    pub fn from_raw(raw: i32) -> Result<Self, LightError> {
        match raw {
            1 => Ok(LightKind::Directional),
            2 => Ok(LightKind::Point),
            other => Err(LightError::InvalidState(format!("unknown light type {other}"))),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LightKind::Directional => LightKind::Point,
            LightKind::Point => LightKind::Directional,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LightKind::Directional => "Directional",
            LightKind::Point => "Point",
        }
    }
}

/// One face of a depth cube map, in GL enumerant order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn gl_target(self) -> GLenum {
        gl::TEXTURE_CUBE_MAP_POSITIVE_X + self as GLenum
    }

    pub fn from_gl_target(target: GLenum) -> Result<Self, LightError> {
        target
            .checked_sub(gl::TEXTURE_CUBE_MAP_POSITIVE_X)
            .and_then(|offset| Self::ALL.get(offset as usize).copied())
            .ok_or_else(|| {
                LightError::InvalidArgument(format!("unknown cube map face 0x{target:04X}"))
            })
    }

    /// Look direction and up vector of the face's camera.
    fn basis(self) -> (Vec3, Vec3) {
        match self {
            CubeFace::PositiveX => (Vec3::X, Vec3::NEG_Y),
            CubeFace::NegativeX => (Vec3::NEG_X, Vec3::NEG_Y),
            CubeFace::PositiveY => (Vec3::Y, Vec3::Z),
            CubeFace::NegativeY => (Vec3::NEG_Y, Vec3::NEG_Z),
            CubeFace::PositiveZ => (Vec3::Z, Vec3::NEG_Y),
            CubeFace::NegativeZ => (Vec3::NEG_Z, Vec3::NEG_Y),
        }
    }
}

/// Geometry of a light. The variant is fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emitter {
    Directional { direction: Vec3 },
    /// `elapsed` drives the vertical animation.
    Point { position: Vec3, elapsed: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    emitter: Emitter,
    pub diffuse_color: Vec3,
    pub diffuse_power: f32,
    pub specular_color: Vec3,
    pub specular_power: f32,
    pub size: f32,
    pub enabled: bool,
}

impl LightSource {
    pub fn create(kind: LightKind, initial_position: Vec3, diffuse_power: f32) -> Self {
        let emitter = match kind {
            LightKind::Directional => Emitter::Directional {
                direction: initial_position,
            },
            LightKind::Point => Emitter::Point {
                position: initial_position,
                elapsed: 0.0,
            },
        };
        Self {
            emitter,
            diffuse_color: Vec3::ONE,
            diffuse_power,
            specular_color: Vec3::ONE,
            specular_power: 0.0,
            size: DEFAULT_LIGHT_SIZE,
            enabled: true,
        }
    }

    /// Directional lights point straight down; point lights hang 3 units up.
    pub fn new(kind: LightKind) -> Self {
        match kind {
            LightKind::Directional => Self::create(kind, Vec3::NEG_Y, 1.0),
            LightKind::Point => Self::create(kind, Vec3::new(0.0, 3.0, 0.0), 10.0),
        }
    }

    pub fn kind(&self) -> LightKind {
        match self.emitter {
            Emitter::Directional { .. } => LightKind::Directional,
            Emitter::Point { .. } => LightKind::Point,
        }
    }

    /// Direction for directional lights, position for point lights.
    pub fn position(&self) -> Vec3 {
        match self.emitter {
            Emitter::Directional { direction } => direction,
            Emitter::Point { position, .. } => position,
        }
    }

    pub fn set_position(&mut self, value: Vec3) {
        match &mut self.emitter {
            Emitter::Directional { direction } => *direction = value,
            Emitter::Point { position, .. } => *position = value,
        }
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position() + delta);
    }

    pub fn increase_power(&mut self) {
        self.diffuse_power = (self.diffuse_power + 0.1).max(0.0);
    }

    pub fn decrease_power(&mut self) {
        self.diffuse_power = (self.diffuse_power - 0.1).max(0.0);
    }

    /// Light-space view-projection. Directional lights ignore `face`; point
    /// lights need one of the six cube faces.
    pub fn view_projection(&self, face: Option<CubeFace>) -> Result<Mat4, LightError> {
        match self.emitter {
            Emitter::Directional { direction } => Ok(directional_view_projection(direction)),
            Emitter::Point { position, .. } => {
                let face = face.ok_or_else(|| {
                    LightError::InvalidArgument("point light needs a cube map face".into())
                })?;
                Ok(point_view_projection(position, face))
            }
        }
    }

    /// Same as [`view_projection`](Self::view_projection) but takes the raw
    /// `GL_TEXTURE_CUBE_MAP_*` enumerant.
    pub fn view_projection_for_target(&self, target: GLenum) -> Result<Mat4, LightError> {
        match self.kind() {
            LightKind::Directional => self.view_projection(None),
            LightKind::Point => self.view_projection(Some(CubeFace::from_gl_target(target)?)),
        }
    }

    /// Advances the automatic motion by one frame of `seconds_per_frame`.
    pub fn animate(&mut self, seconds_per_frame: f32) {
        match &mut self.emitter {
            Emitter::Directional { direction } => {
                let spin = Quat::from_rotation_y(seconds_per_frame * DIRECTIONAL_SPIN_RATE);
                *direction = spin * *direction;
            }
            Emitter::Point { position, elapsed } => {
                *elapsed = (*elapsed + seconds_per_frame) % POINT_BOB_PERIOD;
                position.y += (*elapsed * 0.5 - 1.0) * 0.05;
            }
        }
    }

    /// GPU record for this light's slot. Disabled lights upload zeros.
    pub fn record(&self) -> LightRecord {
        if !self.enabled {
            return LightRecord::zeroed();
        }
        LightRecord {
            diffuse_color: self.diffuse_color.to_array(),
            diffuse_power: self.diffuse_power,
            specular_color: self.specular_color.to_array(),
            specular_power: self.specular_power,
            position: self.position().to_array(),
            kind: self.kind().as_raw(),
            size: self.size,
            _pad: [0.0; 3],
        }
    }
}

pub fn directional_view_projection(direction: Vec3) -> Mat4 {
    let projection = Mat4::orthographic_rh_gl(
        -ORTHO_EXTENT,
        ORTHO_EXTENT,
        -ORTHO_EXTENT,
        ORTHO_EXTENT,
        ORTHO_NEAR,
        ORTHO_FAR,
    );
    let view = Mat4::look_at_rh((-direction).normalize(), Vec3::ZERO, DIRECTIONAL_UP);
    projection * view
}

pub fn point_projection() -> Mat4 {
    Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, POINT_NEAR, POINT_FAR)
}

pub fn point_view_projection(position: Vec3, face: CubeFace) -> Mat4 {
    let (look, up) = face.basis();
    let view = Mat4::look_at_rh(Vec3::ZERO, look, up) * Mat4::from_translation(-position);
    point_projection() * view
}

/// std140 layout of one entry in the `LightSources` uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LightRecord {
    pub diffuse_color: [f32; 3],
    pub diffuse_power: f32,
    pub specular_color: [f32; 3],
    pub specular_power: f32,
    pub position: [f32; 3],
    pub kind: i32,
    pub size: f32,
    pub _pad: [f32; 3],
}
