//! Core math modules.

pub mod bounds;
pub mod diff;
pub mod moments;
pub mod window;
