pub mod tweaks;

pub use tweaks::{Tweak, TweakEffect, TweakTarget};
