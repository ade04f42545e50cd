//! 3-D Coordinate System

use super::common::Cross;
use super::vector3::{vector3, Vector3};
use crate::math::abs;
use num_traits::Float;

/// Returns a unit vector perpendicular to the given direction.
///
/// The vector is constructed by zeroing one of the coordinates, swapping the
/// remaining 2 and negating one of them, then normalizing.
///
/// * `v` - A non-zero direction.
pub fn any_perpendicular<T: Float>(v: &Vector3<T>) -> Vector3<T> {
    if abs(v.x) > abs(v.y) {
        vector3(-v.z, T::zero(), v.x) / (v.x * v.x + v.z * v.z).sqrt()
    } else {
        vector3(T::zero(), v.z, -v.y) / (v.y * v.y + v.z * v.z).sqrt()
    }
}

/// Returns two unit vectors that together with the given unit vector form an
/// orthonormal coordinate system.
///
/// * `v1` - The first unit vector of the coordinate system.
pub fn coordinate_system<T: Float>(v1: &Vector3<T>) -> (Vector3<T>, Vector3<T>) {
    let v2 = any_perpendicular(v1);
    let v3 = v1.cross(&v2);
    (v2, v3)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::super::common::Dot;
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn from_unit_x_axis() {
        let v1 = vector3(1.0, 0.0, 0.0);
        let (v2, v3) = coordinate_system(&v1);
        assert!(v2 == vector3(0.0, 0.0, 1.0));
        assert!(v3 == vector3(0.0, -1.0, 0.0));
    }

    #[test]
    fn from_unit_z_axis() {
        let v1 = vector3(0.0, 0.0, 1.0);
        let (v2, v3) = coordinate_system(&v1);
        assert!(v1.dot(&v2) == 0.0);
        assert!(v1.dot(&v3) == 0.0);
        assert!(v2.dot(&v3) == 0.0);
    }

    #[test]
    fn perpendicular_of_skewed_vector() {
        let v1 = vector3(0.2f32, 0.5, 0.5);
        let p = any_perpendicular(&v1);
        assert!(approx_eq!(f32, v1.dot(&p), 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, p.length(), 1.0, epsilon = 1e-6));
    }
}
