//! Transport Context
//!
//! All configuration a light or attenuation operation depends on: the
//! spectral representation, the derived sampling and splatting tables and
//! the light configuration type. A context is built once before rendering
//! and shared by reference; it has no setters.

use crate::attenuation::Attenuation;
use foundation::spectrum::{Isr, SplattingData};
use foundation::wavelength::WavelengthSamplingData;
use std::fmt;

/// Selects which light representation backs all operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightConfigurationType {
    /// Spectral intensity only.
    Plain,

    /// Spectral Stokes vectors with reference frames.
    Polarisable,
}

impl LightConfigurationType {
    /// Returns a human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain light",
            Self::Polarisable => "polarisable light",
        }
    }
}

impl fmt::Display for LightConfigurationType {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Immutable configuration of the light transport algebra.
#[derive(Clone, Debug)]
pub struct TransportContext {
    /// The internal spectral representation.
    isr: Isr,

    /// Hero wavelength sampling data derived from the ISR.
    sampling_data: WavelengthSamplingData,

    /// Splatting table derived from the ISR.
    splatting_data: SplattingData,

    /// The light configuration type.
    lct: LightConfigurationType,

    /// Attenuation that lets all light pass. Plain mode only.
    free_transmission: Option<Attenuation>,

    /// Attenuation that blocks all light. Plain mode only.
    total_blocker: Option<Attenuation>,
}

impl TransportContext {
    /// Create a new `TransportContext`.
    ///
    /// * `isr` - The internal spectral representation.
    /// * `lct` - The light configuration type.
    pub fn new(isr: Isr, lct: LightConfigurationType) -> Result<Self, String> {
        let sampling_data = WavelengthSamplingData::from_isr(&isr)?;
        let splatting_data = SplattingData::from_isr(&isr);

        let mut ctx = Self {
            isr,
            sampling_data,
            splatting_data,
            lct,
            free_transmission: None,
            total_blocker: None,
        };

        // The singletons have no reference frames so they only exist for
        // plain light.
        if lct == LightConfigurationType::Plain {
            ctx.free_transmission = Some(Attenuation::from_value(&ctx, 1.0));
            ctx.total_blocker = Some(Attenuation::from_value(&ctx, 0.0));
        }

        info!("{}", ctx.describe());
        Ok(ctx)
    }

    /// Create a new `TransportContext` for plain light.
    ///
    /// * `isr` - The internal spectral representation.
    pub fn plain(isr: Isr) -> Result<Self, String> {
        Self::new(isr, LightConfigurationType::Plain)
    }

    /// Create a new `TransportContext` for polarisable light.
    ///
    /// * `isr` - The internal spectral representation.
    pub fn polarisable(isr: Isr) -> Result<Self, String> {
        Self::new(isr, LightConfigurationType::Polarisable)
    }

    /// Returns the internal spectral representation.
    pub fn isr(&self) -> &Isr {
        &self.isr
    }

    /// Returns the number of spectral channels.
    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.isr.channels()
    }

    /// Returns the hero wavelength sampling data.
    pub fn sampling_data(&self) -> &WavelengthSamplingData {
        &self.sampling_data
    }

    /// Returns the hero sample splatting table.
    pub fn splatting_data(&self) -> &SplattingData {
        &self.splatting_data
    }

    /// Returns the light configuration type.
    pub fn lct(&self) -> LightConfigurationType {
        self.lct
    }

    /// Returns true if light carries polarisation state.
    #[inline(always)]
    pub fn is_polarisable(&self) -> bool {
        self.lct == LightConfigurationType::Polarisable
    }

    /// Returns the attenuation that lets all light pass.
    pub fn free_transmission(&self) -> &Attenuation {
        match &self.free_transmission {
            Some(a) => a,
            None => fatal_error!("free transmission attenuation is not available for polarisable light"),
        }
    }

    /// Returns the attenuation that blocks all light.
    pub fn total_blocker(&self) -> &Attenuation {
        match &self.total_blocker {
            Some(a) => a,
            None => fatal_error!("total blocker attenuation is not available for polarisable light"),
        }
    }

    /// Returns a one line summary for logs.
    pub fn describe(&self) -> String {
        format!(
            "light transport with {} ({}), contract checks {}",
            self.lct.name(),
            self.isr,
            if foundation::assertions::assertions_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Light;

    fn isr() -> Isr {
        Isr::new(4, 400.0, 75.0).unwrap()
    }

    #[test]
    fn plain_context_has_singletons() {
        let ctx = TransportContext::plain(isr()).unwrap();
        assert_eq!(ctx.channels(), 4);
        assert_eq!(ctx.lct(), LightConfigurationType::Plain);
        assert!(!ctx.is_polarisable());
        assert_eq!(ctx.sampling_data().range, 300.0);

        let mut l = Light::from_value(&ctx, 2.0);
        ctx.free_transmission().apply_to_light(&ctx, &mut l);
        assert_eq!(l.intensity(), &ctx.isr().spectrum(2.0));
        ctx.total_blocker().apply_to_light(&ctx, &mut l);
        assert!(l.intensity().is_black());
    }

    #[test]
    #[should_panic(expected = "not available for polarisable light")]
    fn polarisable_context_has_no_singletons() {
        let ctx = TransportContext::polarisable(isr()).unwrap();
        ctx.free_transmission();
    }

    #[test]
    fn names_and_description() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(LightConfigurationType::Plain.name(), "plain light");
        assert_eq!(LightConfigurationType::Polarisable.to_string(), "polarisable light");

        let ctx = TransportContext::polarisable(isr()).unwrap();
        assert!(ctx.is_polarisable());
        assert!(ctx.describe().contains("polarisable light"));
        assert!(ctx.describe().contains("400nm"));
    }

    #[test]
    fn context_is_shareable() {
        fn shareable<T: Send + Sync>() {}
        shareable::<TransportContext>();
    }
}
