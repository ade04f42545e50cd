//! Contract macros for light and attenuation values.
//!
//! Each macro has a checked definition (with the `foundation-assertions`
//! feature) that aborts through `fatal_error!` and an unchecked one that
//! type checks its arguments but never evaluates them.

/// Aborts if a value fails its `is_valid()` predicate.
#[cfg(feature = "foundation-assertions")]
macro_rules! assert_valid {
    ($v: expr) => {
        if !$v.is_valid() {
            fatal_error!("invalid value `{}`", stringify!($v));
        }
    };
}

#[cfg(not(feature = "foundation-assertions"))]
macro_rules! assert_valid {
    ($v: expr) => {
        if false {
            let _ = $v.is_valid();
        }
    };
}

/// Aborts unless two reference frames share a propagation axis.
#[cfg(feature = "foundation-assertions")]
macro_rules! assert_coaxial_frames {
    ($r0: expr, $r1: expr, $tol: expr) => {
        if !$r0.is_coaxial(&$r1, $tol) {
            fatal_error!(
                "reference frames `{}` = {} and `{}` = {} are not coaxial",
                stringify!($r0),
                $r0,
                stringify!($r1),
                $r1
            );
        }
    };
}

#[cfg(not(feature = "foundation-assertions"))]
macro_rules! assert_coaxial_frames {
    ($r0: expr, $r1: expr, $tol: expr) => {
        if false {
            let _ = $r0.is_coaxial(&$r1, $tol);
        }
    };
}

/// Aborts unless two reference frames have the same basis vectors.
#[cfg(feature = "foundation-assertions")]
macro_rules! assert_identical_frames {
    ($r0: expr, $r1: expr) => {
        if !$r0.approx_equal(&$r1, foundation::math::GEOMETRY_EPSILON) {
            fatal_error!(
                "reference frames `{}` = {} and `{}` = {} are not identical",
                stringify!($r0),
                $r0,
                stringify!($r1),
                $r1
            );
        }
    };
}

#[cfg(not(feature = "foundation-assertions"))]
macro_rules! assert_identical_frames {
    ($r0: expr, $r1: expr) => {
        if false {
            let _ = $r0.approx_equal(&$r1, foundation::math::GEOMETRY_EPSILON);
        }
    };
}

/// Checks that `a1` can follow `a0` in a concatenation. Only meaningful for
/// polarisable contexts.
#[cfg(feature = "foundation-assertions")]
macro_rules! assert_compatible_frames {
    ($ctx: expr, $a0: expr, $a1: expr, $tol: expr) => {
        if $ctx.is_polarisable() {
            $crate::attenuation::check_concatenation_frames($a0, $a1, $tol);
        }
    };
}

#[cfg(not(feature = "foundation-assertions"))]
macro_rules! assert_compatible_frames {
    ($ctx: expr, $a0: expr, $a1: expr, $tol: expr) => {
        if false {
            let _ = ($ctx.is_polarisable(), &$a0, &$a1, $tol);
        }
    };
}
