//! Qubit spectrum models and the kind-keyed registry the oracle resolves
//! against at construction time.

use crate::domain::{OracleError, OracleResult};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Parametric qubit spectrum: control-parameter value, flux period, sweet-spot
/// offset, maximum transition frequency (GHz) and junction asymmetry map to a
/// transition frequency in GHz.
pub type SpectrumModelFn = fn(x: f64, period: f64, sweet_spot: f64, max_freq: f64, d: f64) -> f64;

/// Split transmon spectrum with junction asymmetry `d`:
/// `f(x) = f_max * (cos^2 phi + d^2 sin^2 phi)^(1/4)` with
/// `phi = pi * (x - sweet_spot) / period`.
pub fn transmon_spectrum(x: f64, period: f64, sweet_spot: f64, max_freq: f64, d: f64) -> f64 {
    let phase = PI * (x - sweet_spot) / period;
    let (sin, cos) = phase.sin_cos();
    max_freq * (cos * cos + d * d * sin * sin).sqrt().sqrt()
}

/// Evaluates `model` over every entry of `xs` with a shared parameter set.
pub fn evaluate_over(
    model: SpectrumModelFn,
    xs: &[f64],
    period: f64,
    sweet_spot: f64,
    max_freq: f64,
    d: f64,
) -> Vec<f64> {
    xs.iter()
        .map(|&x| model(x, period, sweet_spot, max_freq, d))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, SpectrumModelFn>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self {
            models: BTreeMap::new(),
        };
        registry.register("transmon", transmon_spectrum);
        registry
    }
}

impl ModelRegistry {
    pub fn register(&mut self, kind: impl Into<String>, model: SpectrumModelFn) {
        self.models.insert(kind.into(), model);
    }

    pub fn resolve(&self, kind: &str) -> OracleResult<SpectrumModelFn> {
        self.models
            .get(kind)
            .copied()
            .ok_or_else(|| OracleError::unknown_model_kind(kind, &self.registered_kinds()))
    }

    pub fn registered_kinds(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelRegistry, transmon_spectrum};
    use crate::domain::OracleError;

    const PERIOD: f64 = 1e-3;
    const F_MAX: f64 = 5.0;

    #[test]
    fn transmon_peaks_at_sweet_spot() {
        let at_sweet_spot = transmon_spectrum(0.2e-3, PERIOD, 0.2e-3, F_MAX, 0.5);
        let off_sweet_spot = transmon_spectrum(0.45e-3, PERIOD, 0.2e-3, F_MAX, 0.5);
        assert!((at_sweet_spot - F_MAX).abs() < 1e-12);
        assert!(off_sweet_spot < at_sweet_spot);
    }

    #[test]
    fn transmon_is_symmetric_around_sweet_spot() {
        let left = transmon_spectrum(-0.1e-3, PERIOD, 0.0, F_MAX, 0.3);
        let right = transmon_spectrum(0.1e-3, PERIOD, 0.0, F_MAX, 0.3);
        assert!((left - right).abs() < 1e-12);
    }

    #[test]
    fn symmetric_junctions_reach_zero_at_half_period() {
        let at_node = transmon_spectrum(PERIOD / 2.0, PERIOD, 0.0, F_MAX, 0.0);
        assert!(at_node.abs() < 1e-6);
    }

    #[test]
    fn unit_asymmetry_flattens_the_spectrum() {
        for &x in &[-0.3e-3, 0.0, 0.17e-3, 0.5e-3] {
            let frequency = transmon_spectrum(x, PERIOD, 0.0, F_MAX, 1.0);
            assert!((frequency - F_MAX).abs() < 1e-9);
        }
    }

    #[test]
    fn registry_resolves_transmon_and_rejects_unknown_kinds() {
        let registry = ModelRegistry::default();
        assert!(registry.resolve("transmon").is_ok());

        let error = registry
            .resolve("nonexistent")
            .expect_err("unknown kind should fail");
        assert!(matches!(error, OracleError::UnknownModelKind { .. }));
        assert!(error.to_string().contains("transmon"));
    }

    #[test]
    fn registry_accepts_new_model_kinds() {
        fn flat(_x: f64, _period: f64, _sws: f64, max_freq: f64, _d: f64) -> f64 {
            max_freq
        }
        let mut registry = ModelRegistry::default();
        registry.register("flat", flat);
        let model = registry.resolve("flat").expect("registered kind");
        assert_eq!(model(1.0, 1.0, 0.0, 4.5, 0.2), 4.5);
    }
}
