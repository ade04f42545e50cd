//! Transport

extern crate bitflags;
#[macro_use]
extern crate foundation;
#[macro_use]
extern crate log;

// Contract macros must be declared before the modules using them.
#[macro_use]
mod macros;
pub mod attenuation;
pub mod context;
pub mod crosstalk;
pub mod light;
pub mod polarisation;
pub mod reference_frame;
