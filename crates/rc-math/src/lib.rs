//! Riskcast numeric utilities.

pub mod math;

pub use math::bounds::*;
pub use math::diff::*;
pub use math::moments::*;
pub use math::window::*;
