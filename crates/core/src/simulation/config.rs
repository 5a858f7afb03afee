//! Construction parameters for a forest fire run
//!
//! Every range is checked once in [`SimulationConfig::validate`], before any cell
//! is created, so a running simulation can never meet an invalid probability.

use crate::cell::{CellKind, DrosselSchwablRates};
use crate::error::FireSimError;
use serde::{Deserialize, Serialize};

/// Pass cap after which a run halts even if fire is still burning.
pub const DEFAULT_MAX_PASSES: u32 = 250;

/// Slack on the `protection <= 1 - density` bound so that e.g. density 0.7 with
/// protection 0.3 is not rejected by float rounding.
const PROTECTION_TOLERANCE: f64 = 1e-9;

/// Drossel-Schwabl tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrosselSchwablConfig {
    /// Probability a slot starts Protected, `[0, 1 - density]`.
    /// `None` resolves to `1 - density` and is rejected at density 1.
    pub protection: Option<f64>,
    /// Regrowth probability `p`, `[0, 1]`.
    pub regrowth: f64,
    /// Spontaneous ignition probability `f`, `[0, 1]`.
    pub ignition: f64,
}

impl Default for DrosselSchwablConfig {
    fn default() -> Self {
        Self {
            protection: None,
            regrowth: 0.1,
            ignition: 0.1,
        }
    }
}

impl DrosselSchwablConfig {
    /// Concrete per-cell rates for a forest of the given density.
    pub fn resolve(&self, density: f64) -> DrosselSchwablRates {
        DrosselSchwablRates {
            protection: self.protection.unwrap_or(1.0 - density),
            regrowth: self.regrowth,
            ignition: self.ignition,
        }
    }
}

/// Cell family plus the parameters only that family understands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CellVariant {
    Simple,
    SingleSpread,
    DrosselSchwabl(DrosselSchwablConfig),
}

impl CellVariant {
    /// Family tag.
    pub const fn kind(&self) -> CellKind {
        match self {
            CellVariant::Simple => CellKind::Simple,
            CellVariant::SingleSpread => CellKind::SingleSpread,
            CellVariant::DrosselSchwabl(_) => CellKind::DrosselSchwabl,
        }
    }
}

impl From<CellKind> for CellVariant {
    /// Variant with default parameters for its family.
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Simple => CellVariant::Simple,
            CellKind::SingleSpread => CellVariant::SingleSpread,
            CellKind::DrosselSchwabl => CellVariant::DrosselSchwabl(DrosselSchwablConfig::default()),
        }
    }
}

/// Complete description of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Probability a slot starts as a living tree, `(0, 1]`.
    pub density: f64,
    /// Cell family and its tunables.
    pub variant: CellVariant,
    /// RNG seed. `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Halt after this many passes. `None` runs until the fire dies out.
    pub max_passes: Option<u32>,
}

impl SimulationConfig {
    /// Config with an entropy seed and the default pass cap.
    pub fn new(width: usize, height: usize, density: f64, variant: CellVariant) -> Self {
        Self {
            width,
            height,
            density,
            variant,
            seed: None,
            max_passes: Some(DEFAULT_MAX_PASSES),
        }
    }

    /// Fix the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the pass cap.
    pub fn with_max_passes(mut self, max_passes: Option<u32>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Resolved Drossel-Schwabl rates, if that is the configured family.
    pub fn drossel_schwabl_rates(&self) -> Option<DrosselSchwablRates> {
        match &self.variant {
            CellVariant::DrosselSchwabl(ds) => Some(ds.resolve(self.density)),
            _ => None,
        }
    }

    /// Reject dimensions or probabilities outside their declared ranges.
    pub fn validate(&self) -> Result<(), FireSimError> {
        if self.width == 0 || self.height == 0 {
            return Err(FireSimError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.density > 0.0 && self.density <= 1.0) {
            return Err(FireSimError::out_of_range("density", self.density, "(0, 1]"));
        }
        if self.max_passes == Some(0) {
            return Err(FireSimError::out_of_range("max_passes", 0.0, "[1, inf)"));
        }

        if let CellVariant::DrosselSchwabl(ds) = &self.variant {
            check_probability("regrowth", ds.regrowth)?;
            check_probability("ignition", ds.ignition)?;
            let room = 1.0 - self.density;
            match ds.protection {
                None if room <= 0.0 => {
                    return Err(FireSimError::out_of_range(
                        "protection",
                        room,
                        "[0, 0], set explicitly at density 1",
                    ));
                }
                None => {}
                Some(protection) => {
                    if !(0.0..=room + PROTECTION_TOLERANCE).contains(&protection) {
                        return Err(FireSimError::out_of_range(
                            "protection",
                            protection,
                            format!("[0, {room}]"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_probability(parameter: &'static str, value: f64) -> Result<(), FireSimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FireSimError::out_of_range(parameter, value, "[0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(protection: Option<f64>, regrowth: f64, ignition: f64) -> CellVariant {
        CellVariant::DrosselSchwabl(DrosselSchwablConfig {
            protection,
            regrowth,
            ignition,
        })
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::new(20, 20, 0.7, CellVariant::Simple);
        assert_eq!(config.max_passes, Some(DEFAULT_MAX_PASSES));
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
        assert_eq!(config.drossel_schwabl_rates(), None);
    }

    #[test]
    fn test_density_range() {
        for density in [0.0, -0.1, 1.01, f64::NAN] {
            let config = SimulationConfig::new(5, 5, density, CellVariant::Simple);
            assert!(
                matches!(
                    config.validate(),
                    Err(FireSimError::OutOfRange { parameter: "density", .. })
                ),
                "density {density} accepted"
            );
        }
        assert!(SimulationConfig::new(5, 5, 1.0, CellVariant::Simple)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = SimulationConfig::new(0, 5, 0.5, CellVariant::SingleSpread);
        assert_eq!(
            config.validate(),
            Err(FireSimError::InvalidDimensions { width: 0, height: 5 })
        );
    }

    #[test]
    fn test_protection_bounded_by_density() {
        assert!(SimulationConfig::new(5, 5, 0.7, ds(Some(0.3), 0.1, 0.1))
            .validate()
            .is_ok());
        assert!(matches!(
            SimulationConfig::new(5, 5, 0.7, ds(Some(0.31), 0.1, 0.1)).validate(),
            Err(FireSimError::OutOfRange { parameter: "protection", .. })
        ));
        assert!(matches!(
            SimulationConfig::new(5, 5, 0.5, ds(Some(-0.1), 0.1, 0.1)).validate(),
            Err(FireSimError::OutOfRange { parameter: "protection", .. })
        ));
    }

    #[test]
    fn test_protection_defaults_to_remaining_room() {
        let config = SimulationConfig::new(5, 5, 0.6, ds(None, 0.2, 0.3));
        let rates = config.drossel_schwabl_rates().unwrap();
        approx::assert_relative_eq!(rates.protection, 0.4);
        assert_eq!(rates.regrowth, 0.2);
        assert_eq!(rates.ignition, 0.3);

    }

    #[test]
    fn test_full_density_needs_explicit_protection() {
        let implied = SimulationConfig::new(5, 5, 1.0, ds(None, 0.0, 0.0));
        assert!(matches!(
            implied.validate(),
            Err(FireSimError::OutOfRange { parameter: "protection", .. })
        ));

        let explicit = SimulationConfig::new(5, 5, 1.0, ds(Some(0.0), 0.0, 0.0));
        assert!(explicit.validate().is_ok());
        assert_eq!(explicit.drossel_schwabl_rates().unwrap().protection, 0.0);
    }

    #[test]
    fn test_rates_range() {
        assert!(matches!(
            SimulationConfig::new(5, 5, 0.5, ds(Some(0.0), 1.5, 0.1)).validate(),
            Err(FireSimError::OutOfRange { parameter: "regrowth", .. })
        ));
        assert!(matches!(
            SimulationConfig::new(5, 5, 0.5, ds(Some(0.0), 0.1, -0.5)).validate(),
            Err(FireSimError::OutOfRange { parameter: "ignition", .. })
        ));
    }

    #[test]
    fn test_zero_pass_cap_rejected() {
        let config = SimulationConfig::new(5, 5, 0.5, CellVariant::Simple).with_max_passes(Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_variant_from_kind() {
        assert_eq!(CellVariant::from(CellKind::Simple), CellVariant::Simple);
        assert_eq!(
            CellVariant::from(CellKind::DrosselSchwabl),
            CellVariant::DrosselSchwabl(DrosselSchwablConfig::default())
        );
        assert_eq!(
            CellVariant::from(CellKind::SingleSpread).kind(),
            CellKind::SingleSpread
        );
    }
}
