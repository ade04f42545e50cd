//! Polarisation

mod mueller_matrix;
mod stokes_vector;

// Re-export
pub use mueller_matrix::*;
pub use stokes_vector::*;

/// Number of Stokes components.
pub const STOKES_COMPONENTS: usize = 4;
