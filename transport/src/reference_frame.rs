//! Reference Frames
//!
//! A reference frame is the pair of unit basis vectors, perpendicular to a
//! ray, against which Stokes components are measured. The propagation
//! direction of a frame is `basis[0] x basis[1]`.

use foundation::geometry::*;
use foundation::math::*;
use std::fmt;

/// Default angular tolerance used when checking that two frames share a
/// propagation axis.
pub const DEFAULT_COAXIALITY_TOLERANCE: Float = 3.0 * DEGREES;

/// Direction in which a path is being traced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathDirection {
    /// Traced from the eye, opposite to the direction light travels.
    FromEye,

    /// Traced from the light source.
    FromLight,
}

impl PathDirection {
    /// Returns the opposite path direction.
    pub fn opposite(&self) -> Self {
        match self {
            Self::FromEye => Self::FromLight,
            Self::FromLight => Self::FromEye,
        }
    }
}

/// An orthonormal pair of vectors perpendicular to a propagation direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReferenceFrame {
    /// The basis vectors.
    pub basis: [Vector3f; 2],
}

impl Default for ReferenceFrame {
    /// Returns a frame for light travelling along +z.
    fn default() -> Self {
        Self {
            basis: [vector3(1.0, 0.0, 0.0), vector3(0.0, 1.0, 0.0)],
        }
    }
}

impl ReferenceFrame {
    /// Create a new `ReferenceFrame` from basis vectors. No normalisation is
    /// performed.
    ///
    /// * `b0` - First basis vector.
    /// * `b1` - Second basis vector.
    pub fn new(b0: Vector3f, b1: Vector3f) -> Self {
        Self { basis: [b0, b1] }
    }

    /// Create a frame for light travelling along a vector.
    ///
    /// * `v`  - The ray direction.
    /// * `pd` - Path direction; rays traced from the eye travel opposite to
    ///          the light.
    pub fn from_vector(v: &Vector3f, pd: PathDirection) -> Self {
        let propagation = match pd {
            PathDirection::FromEye => -*v,
            PathDirection::FromLight => *v,
        };
        let (b0, b1) = coordinate_system(&propagation);
        Self::new(b0.normalize(), b1.normalize())
    }

    /// Create a frame whose first basis vector is perpendicular to the plane
    /// spanned by two vectors. Falls back to `from_vector(v0)` when the
    /// vectors are collinear.
    ///
    /// * `v0` - The ray direction.
    /// * `v1` - Second vector spanning the plane.
    /// * `pd` - Path direction.
    pub fn from_vectors(v0: &Vector3f, v1: &Vector3f, pd: PathDirection) -> Self {
        let b0 = v0.cross(v1);
        if b0.is_tiny() {
            return Self::from_vector(v0, pd);
        }
        let b0 = b0.normalize();
        let b1 = v0.cross(&b0).normalize();
        Self::new(b0, b1)
    }

    /// Create the entry and exit frames of a scattering event. Both frames
    /// share the basis vector perpendicular to the plane of incidence.
    ///
    /// * `incoming` - Direction of the incoming ray.
    /// * `outgoing` - Direction of the outgoing ray.
    /// * `pd`       - Path direction.
    pub fn entry_exit_from_vectors(
        incoming: &Vector3f,
        outgoing: &Vector3f,
        pd: PathDirection,
    ) -> (Self, Self) {
        let (light_in, light_out) = light_directions(incoming, outgoing, pd);

        let mut s = light_in.cross(&light_out);
        if s.length_squared() == 0.0 {
            s = any_perpendicular(&light_in);
        }
        let s = s.normalize();

        let entry = Self::new(s, light_in.cross(&s).normalize());
        let exit = Self::new(s, light_out.cross(&s).normalize());
        (entry, exit)
    }

    /// Create the entry and exit frames of a scattering event at a surface,
    /// with the first basis vectors perpendicular to the plane of the ray and
    /// the surface normal.
    ///
    /// * `incoming` - Direction of the incoming ray.
    /// * `normal`   - Surface normal.
    /// * `outgoing` - Direction of the outgoing ray.
    /// * `pd`       - Path direction.
    pub fn entry_exit_from_vectors_and_normal(
        incoming: &Vector3f,
        normal: &Vector3f,
        outgoing: &Vector3f,
        pd: PathDirection,
    ) -> (Self, Self) {
        let (light_in, light_out) = light_directions(incoming, outgoing, pd);

        let perpendicular_to = |v: &Vector3f| {
            let b0 = v.cross(normal);
            let b0 = if b0.is_tiny() {
                any_perpendicular(v)
            } else {
                b0.normalize()
            };
            Self::new(b0, v.cross(&b0).normalize())
        };

        (perpendicular_to(&light_in), perpendicular_to(&light_out))
    }

    /// Returns the propagation direction `basis[0] x basis[1]`.
    pub fn propagation_direction(&self) -> Vector3f {
        self.basis[0].cross(&self.basis[1])
    }

    /// Returns true if both basis vectors have unit length and are
    /// orthogonal.
    pub fn is_valid(&self) -> bool {
        let l0 = self.basis[0].length();
        let l1 = self.basis[1].length();
        if !(dd_equal(l0, 1.0, GEOMETRY_EPSILON) && dd_equal(l1, 1.0, GEOMETRY_EPSILON)) {
            warn!("non unit length refframe basis vectors ({}, {})", l0, l1);
            return false;
        }

        let cosine = self.basis[0].dot(&self.basis[1]);
        if abs(cosine) > GEOMETRY_EPSILON {
            warn!("non orthogonal refframe basis vectors with cosine {}", cosine);
            return false;
        }
        true
    }

    /// Returns true if two frames describe the same propagation direction to
    /// within an angular tolerance. Opposite directions are never coaxial.
    ///
    /// * `other`     - The other frame.
    /// * `tolerance` - Maximum angle between the directions in radians.
    pub fn is_coaxial(&self, other: &Self, tolerance: Float) -> bool {
        self.is_coaxial_with_vector(&other.propagation_direction(), tolerance)
    }

    /// Returns true if the frame's propagation direction matches a unit
    /// vector to within an angular tolerance.
    ///
    /// * `v`         - The direction.
    /// * `tolerance` - Maximum angle between the directions in radians.
    pub fn is_coaxial_with_vector(&self, v: &Vector3f, tolerance: Float) -> bool {
        let dir = self.propagation_direction();

        let l0 = dir.length();
        let l1 = v.length();
        if !(dd_equal(l0, 1.0, GEOMETRY_EPSILON) && dd_equal(l1, 1.0, GEOMETRY_EPSILON)) {
            warn!("non unit propagation directions ({}, {})", l0, l1);
            return false;
        }

        if dir == *v {
            return true;
        }

        let cosine = dir.dot(v);
        if dd_equal(cosine, -1.0, GEOMETRY_EPSILON) {
            warn!("anti-coaxial refframes detected");
            return false;
        }

        if cosine > abs(tolerance.cos()) {
            true
        } else {
            warn!(
                "propagation directions {} and {} are {} degrees apart",
                dir,
                v,
                clamp(cosine, -1.0, 1.0).acos() / DEGREES
            );
            false
        }
    }

    /// Returns true if the basis vectors are exactly equal.
    ///
    /// * `other` - The other frame.
    pub fn equal(&self, other: &Self) -> bool {
        self.basis == other.basis
    }

    /// Returns true if the basis vectors are equal to within a relative
    /// error.
    ///
    /// * `other`              - The other frame.
    /// * `max_relative_error` - Allowed relative error per coordinate.
    pub fn approx_equal(&self, other: &Self, max_relative_error: Float) -> bool {
        self.basis.iter().zip(other.basis.iter()).all(|(a, b)| {
            dd_equal(a.x, b.x, max_relative_error)
                && dd_equal(a.y, b.y, max_relative_error)
                && dd_equal(a.z, b.z, max_relative_error)
        })
    }

    /// Returns the frame rotated about its propagation direction.
    ///
    /// * `angle` - Rotation angle in radians.
    pub fn rotated(&self, angle: Float) -> Self {
        let (s, c) = angle.sin_cos();
        let [b0, b1] = self.basis;
        Self::new(b0 * c + b1 * s, b0 * -s + b1 * c)
    }

    /// Returns `(cos 2phi, sin 2phi)` where `phi` is the angle from this
    /// frame's first basis vector to that of a coaxial target frame. These
    /// are the coefficients of the Stokes component rotation.
    ///
    /// * `target` - The frame being rotated into.
    pub fn stokes_rotation_to(&self, target: &Self) -> (Float, Float) {
        let cos_phi = self.basis[0].dot(&target.basis[0]);
        let sin_phi = self.basis[1].dot(&target.basis[0]);
        (
            cos_phi * cos_phi - sin_phi * sin_phi,
            2.0 * cos_phi * sin_phi,
        )
    }
}

/// Returns the incoming and outgoing directions of the light given the ray
/// directions of the path, normalised.
fn light_directions(
    incoming: &Vector3f,
    outgoing: &Vector3f,
    pd: PathDirection,
) -> (Vector3f, Vector3f) {
    match pd {
        PathDirection::FromEye => (-outgoing.normalize(), -incoming.normalize()),
        PathDirection::FromLight => (incoming.normalize(), outgoing.normalize()),
    }
}

impl fmt::Display for ReferenceFrame {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RF[{}, {}]", self.basis[0], self.basis[1])
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    foundation::prop_unit_vector3!(unit_vector);

    prop_compose! {
        fn frame()(v in unit_vector(), angle in 0.0..6.28f32) -> ReferenceFrame {
            ReferenceFrame::from_vector(&v, PathDirection::FromLight).rotated(angle)
        }
    }

    fn assert_vector_eq(a: &Vector3f, b: &Vector3f) {
        assert!(approx_eq!(Float, a.x, b.x, epsilon = 1e-5), "{} != {}", a, b);
        assert!(approx_eq!(Float, a.y, b.y, epsilon = 1e-5), "{} != {}", a, b);
        assert!(approx_eq!(Float, a.z, b.z, epsilon = 1e-5), "{} != {}", a, b);
    }

    #[test]
    fn path_direction_opposite() {
        assert_eq!(PathDirection::FromEye.opposite(), PathDirection::FromLight);
        assert_eq!(PathDirection::FromLight.opposite(), PathDirection::FromEye);
    }

    #[test]
    fn from_vector_propagates_along_light() {
        let v = vector3(0.0, 0.6, 0.8);
        let rf = ReferenceFrame::from_vector(&v, PathDirection::FromLight);
        assert!(rf.is_valid());
        assert_vector_eq(&rf.propagation_direction(), &v);

        let rf = ReferenceFrame::from_vector(&v, PathDirection::FromEye);
        assert!(rf.is_valid());
        assert_vector_eq(&rf.propagation_direction(), &-v);
    }

    #[test]
    fn from_vectors_falls_back_when_collinear() {
        let v = vector3(0.0, 0.0, 1.0);
        let rf = ReferenceFrame::from_vectors(&v, &(v * 2.0), PathDirection::FromLight);
        assert_eq!(rf, ReferenceFrame::from_vector(&v, PathDirection::FromLight));

        let rf = ReferenceFrame::from_vectors(
            &v,
            &vector3(1.0, 0.0, 0.0),
            PathDirection::FromLight,
        );
        assert!(rf.is_valid());
        assert_vector_eq(&rf.basis[0], &vector3(0.0, 1.0, 0.0));
    }

    #[test]
    fn backscatter_frames_are_valid() {
        let incoming = vector3(0.0, 0.0, 1.0);
        let outgoing = vector3(0.0, 0.0, -1.0);
        for pd in [PathDirection::FromEye, PathDirection::FromLight] {
            let (entry, exit) = ReferenceFrame::entry_exit_from_vectors(&incoming, &outgoing, pd);
            assert!(entry.is_valid());
            assert!(exit.is_valid());
            assert_eq!(entry.basis[0], exit.basis[0]);
        }
    }

    #[test]
    fn entry_exit_frames_follow_the_light() {
        let incoming = vector3(1.0, 0.0, -1.0).normalize();
        let outgoing = vector3(1.0, 0.0, 1.0).normalize();
        let (entry, exit) =
            ReferenceFrame::entry_exit_from_vectors(&incoming, &outgoing, PathDirection::FromLight);
        assert!(entry.is_coaxial_with_vector(&incoming, DEFAULT_COAXIALITY_TOLERANCE));
        assert!(exit.is_coaxial_with_vector(&outgoing, DEFAULT_COAXIALITY_TOLERANCE));

        // Tracing from the eye swaps and reverses the directions.
        let (entry, exit) =
            ReferenceFrame::entry_exit_from_vectors(&incoming, &outgoing, PathDirection::FromEye);
        assert!(entry.is_coaxial_with_vector(&-outgoing, DEFAULT_COAXIALITY_TOLERANCE));
        assert!(exit.is_coaxial_with_vector(&-incoming, DEFAULT_COAXIALITY_TOLERANCE));
    }

    #[test]
    fn entry_exit_with_normal() {
        let incoming = vector3(1.0, 0.0, -1.0).normalize();
        let normal = vector3(0.0, 0.0, 1.0);
        let outgoing = vector3(1.0, 0.0, 1.0).normalize();
        let (entry, exit) = ReferenceFrame::entry_exit_from_vectors_and_normal(
            &incoming,
            &normal,
            &outgoing,
            PathDirection::FromLight,
        );
        assert!(entry.is_valid());
        assert!(exit.is_valid());
        assert!(entry.is_coaxial_with_vector(&incoming, DEFAULT_COAXIALITY_TOLERANCE));
        assert!(exit.is_coaxial_with_vector(&outgoing, DEFAULT_COAXIALITY_TOLERANCE));

        // Normal incidence has no plane of incidence.
        let (entry, exit) = ReferenceFrame::entry_exit_from_vectors_and_normal(
            &-normal,
            &normal,
            &normal,
            PathDirection::FromLight,
        );
        assert!(entry.is_valid());
        assert!(exit.is_valid());
    }

    #[test]
    fn invalid_frames() {
        let rf = ReferenceFrame::new(vector3(2.0, 0.0, 0.0), vector3(0.0, 1.0, 0.0));
        assert!(!rf.is_valid());
        let rf = ReferenceFrame::new(vector3(1.0, 0.0, 0.0), vector3(0.6, 0.8, 0.0));
        assert!(!rf.is_valid());
        assert!(ReferenceFrame::default().is_valid());
    }

    #[test]
    fn anti_coaxial_frames_are_not_coaxial() {
        let v = vector3(0.0, 0.0, 1.0);
        let a = ReferenceFrame::from_vector(&v, PathDirection::FromLight);
        let b = ReferenceFrame::from_vector(&v, PathDirection::FromEye);
        assert!(!a.is_coaxial(&b, DEFAULT_COAXIALITY_TOLERANCE));
        assert!(!b.is_coaxial(&a, DEFAULT_COAXIALITY_TOLERANCE));
    }

    #[test]
    fn coaxial_within_tolerance() {
        let a = ReferenceFrame::from_vector(&vector3(0.0, 0.0, 1.0), PathDirection::FromLight);
        let tilt = 2.0 * DEGREES;
        let v = vector3(tilt.sin(), 0.0, tilt.cos());
        let b = ReferenceFrame::from_vector(&v, PathDirection::FromLight);
        assert!(a.is_coaxial(&b, DEFAULT_COAXIALITY_TOLERANCE));
        assert!(!a.is_coaxial(&b, 1.0 * DEGREES));
    }

    #[test]
    fn rotation_changes_basis_not_direction() {
        let a = ReferenceFrame::default();
        let b = a.rotated(PI / 2.0);
        assert_vector_eq(&b.basis[0], &vector3(0.0, 1.0, 0.0));
        assert_vector_eq(&b.basis[1], &vector3(-1.0, 0.0, 0.0));
        assert!(a.is_coaxial(&b, DEFAULT_COAXIALITY_TOLERANCE));
        assert!(!a.equal(&b));
        assert!(a.approx_equal(&a.rotated(0.0), 1e-6));
    }

    #[test]
    fn stokes_rotation_coefficients() {
        let a = ReferenceFrame::default();
        let (c2, s2) = a.stokes_rotation_to(&a.rotated(PI / 8.0));
        assert!(approx_eq!(Float, c2, (PI / 4.0).cos(), epsilon = 1e-6));
        assert!(approx_eq!(Float, s2, (PI / 4.0).sin(), epsilon = 1e-6));
    }

    proptest! {
        #[test]
        fn coaxiality_is_symmetric(a in frame(), b in frame(), tol in 0.0..0.5f32) {
            prop_assert_eq!(a.is_coaxial(&b, tol), b.is_coaxial(&a, tol));
        }

        #[test]
        fn constructed_frames_are_valid(v0 in unit_vector(), v1 in unit_vector()) {
            prop_assert!(ReferenceFrame::from_vector(&v0, PathDirection::FromEye).is_valid());
            prop_assert!(ReferenceFrame::from_vectors(&v0, &v1, PathDirection::FromLight).is_valid());
            let (entry, exit) =
                ReferenceFrame::entry_exit_from_vectors(&v0, &v1, PathDirection::FromEye);
            prop_assert!(entry.is_valid());
            prop_assert!(exit.is_valid());
        }

        #[test]
        fn rotated_frames_stay_coaxial(a in frame(), angle in -3.0..3.0f32) {
            prop_assert!(a.is_coaxial(&a.rotated(angle), DEFAULT_COAXIALITY_TOLERANCE));
        }
    }
}
