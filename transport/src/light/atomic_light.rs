//! Atomic Light

use super::{Light, StokesLight};
use crate::context::TransportContext;
use crate::polarisation::{StokesVector, STOKES_COMPONENTS};
use crate::reference_frame::{ReferenceFrame, DEFAULT_COAXIALITY_TOLERANCE};
use foundation::parallel::AtomicFloat;
use foundation::spectrum::Spectrum;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// Light accumulator shared by worker threads, e.g. a pixel of the image
/// plane. Every channel is added to with an atomic compare-and-swap.
///
/// The polarised flag is only ever raised, never cleared, so a thread that
/// reads a stale `false` merely skips components that are still zero. The
/// first polarised contribution fixes the reference frame; later ones are
/// re-expressed in it.
#[derive(Debug)]
pub struct AtomicLight {
    /// Stokes components. Plain light uses component 0 only.
    c: [Vec<AtomicFloat>; STOKES_COMPONENTS],

    /// Set once any polarised light has been added.
    polarised: AtomicBool,

    /// Frame of the polarised components.
    frame: OnceLock<ReferenceFrame>,

    /// True if the context carries polarisable light.
    polarisable: bool,
}

impl AtomicLight {
    /// Create an empty accumulator.
    ///
    /// * `ctx` - The transport context.
    pub fn new(ctx: &TransportContext) -> Self {
        let n = ctx.channels();
        let components = if ctx.is_polarisable() {
            STOKES_COMPONENTS
        } else {
            1
        };
        Self {
            c: std::array::from_fn(|i| {
                if i < components {
                    (0..n).map(|_| AtomicFloat::default()).collect()
                } else {
                    Vec::new()
                }
            }),
            polarised: AtomicBool::new(false),
            frame: OnceLock::new(),
            polarisable: ctx.is_polarisable(),
        }
    }

    /// Returns true if polarised light has been added.
    pub fn is_polarised(&self) -> bool {
        self.polarised.load(Ordering::Relaxed)
    }

    /// Atomically adds a light sample.
    ///
    /// * `l` - The light.
    pub fn add_light(&self, l: &Light) {
        match l {
            Light::Plain(p) => {
                foundation_assert!(!self.polarisable, "plain light added to a polarisable accumulator");
                Self::add_spectrum(&self.c[0], p.intensity());
            }
            Light::Stokes(s) => {
                foundation_assert!(self.polarisable, "Stokes light added to a plain accumulator");
                Self::add_spectrum(&self.c[0], s.intensity());

                if let Some(f) = s.frame() {
                    let frame = self.frame.get_or_init(|| *f);
                    let sv = s.realigned_stokes(frame, DEFAULT_COAXIALITY_TOLERANCE);
                    for i in 1..STOKES_COMPONENTS {
                        Self::add_spectrum(&self.c[i], &sv[i]);
                    }
                    self.polarised.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    /// Returns the accumulated light.
    ///
    /// * `ctx` - The transport context.
    pub fn to_light(&self, ctx: &TransportContext) -> Light {
        let intensity = Self::load_spectrum(&self.c[0]);
        match (self.is_polarised(), self.frame.get()) {
            (true, Some(frame)) => {
                let sv = StokesVector::new(std::array::from_fn(|i| {
                    if i == 0 {
                        intensity.clone()
                    } else {
                        Self::load_spectrum(&self.c[i])
                    }
                }));
                StokesLight::from_stokes(sv, *frame).into()
            }
            _ => Light::from_intensity(ctx, intensity),
        }
    }

    /// Adds a spectrum channelwise to an atomic component.
    ///
    /// * `target` - The component.
    /// * `s`      - The spectrum.
    fn add_spectrum(target: &[AtomicFloat], s: &Spectrum) {
        for (t, v) in target.iter().zip(s.samples().iter()) {
            t.add(*v);
        }
    }

    /// Reads an atomic component.
    ///
    /// * `source` - The component.
    fn load_spectrum(source: &[AtomicFloat]) -> Spectrum {
        Spectrum::from(
            source
                .iter()
                .map(|v| v.load(Ordering::SeqCst))
                .collect::<Vec<_>>(),
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
