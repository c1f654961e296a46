pub mod light;
pub mod lights;

pub use light::LightKind;
pub use lights::LightSet;
