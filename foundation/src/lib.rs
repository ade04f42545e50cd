//! Foundation

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

#[macro_use]
pub mod assertions;
pub mod geometry;
pub mod math;
pub mod order;
pub mod parallel;
pub mod rng;
pub mod spectrum;
pub mod wavelength;
