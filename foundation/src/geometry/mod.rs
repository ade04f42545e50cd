//! Geometry

// Define macros for property based testing.
#[cfg(test)]
#[macro_export]
macro_rules! prop_range {
    ($name: ident, $t: ty, $r: expr) => {
        prop_compose! {
            fn $name()(f in $r) -> $t {
                f
            }
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! prop_vector3 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr, $zr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr, z in $zr) -> Vector3<$t> {
                Vector3 { x, y, z }
            }
        }
    };
}

/// Defines a proptest strategy for unit vectors. Available to dependent
/// crates; the caller needs `proptest::prelude::*` in scope.
#[macro_export]
macro_rules! prop_unit_vector3 {
    ($name: ident) => {
        prop_compose! {
            fn $name()(
                x in -1.0..1.0f32,
                y in -1.0..1.0f32,
                z in -1.0..1.0f32,
            ) -> $crate::geometry::Vector3f {
                let v = $crate::geometry::Vector3 { x, y, z };
                if v.length_squared() < 0.01 {
                    $crate::geometry::Vector3 { x: 0.0, y: 0.0, z: 1.0 }
                } else {
                    v.normalize()
                }
            }
        }
    };
}

mod common;
mod coordinate_system;
mod vector3;

// Re-export
pub use common::*;
pub use coordinate_system::*;
pub use vector3::*;
