//! Light

mod atomic_light;
mod light_sample;
mod plain_light;
mod stokes_light;

// Re-export.
pub use atomic_light::*;
pub use light_sample::*;
pub use plain_light::*;
pub use stokes_light::*;
