//! Property source contracts consumed by fluid states.
//!
//! A [`PropertySource`] is a process-wide, read-only registry that hands out a
//! shared [`SpeciesProperties`] handle per species. Fluid states hold the
//! handle by reference (`Arc`) and forward all property queries to it; the
//! source must outlive every referencing state, which the `Arc` guarantees.

use crate::error::FluidResult;
use crate::species::{Phase, Species};
use mf_core::numeric::inner_limit;
use std::sync::Arc;

/// Pure property evaluators for one species.
///
/// Every evaluator must return a finite, positive, range-clamped value for
/// any input; fluid states never re-validate what comes back.
///
/// Specific heat is linear in temperature (`cp = bias + slope·T`), which is
/// what makes the closed-form enthalpy inversion in the mixture engine
/// possible. Implementations expose the two coefficients directly.
pub trait SpeciesProperties: Send + Sync {
    /// Species this handle evaluates.
    fn species(&self) -> Species;

    /// Molar mass [kg/kmol].
    fn molar_mass(&self) -> f64;

    /// Phase over the modeled range.
    fn phase(&self) -> Phase {
        self.species().phase()
    }

    /// Density [kg/m³] at temperature [K] and pressure [Pa].
    fn density(&self, t: f64, p: f64) -> f64;

    /// Dynamic viscosity [Pa·s].
    fn viscosity(&self, t: f64, p: f64) -> f64;

    /// Constant term of the linear specific heat fit [J/(kg·K)].
    fn cp_bias(&self) -> f64;

    /// Temperature coefficient of the linear specific heat fit [J/(kg·K²)].
    fn cp_slope(&self) -> f64;

    /// Specific heat at constant pressure [J/(kg·K)].
    fn specific_heat(&self, t: f64, p: f64) -> f64;

    /// Specific enthalpy [J/kg], defined as `cp(T)·T`.
    fn specific_enthalpy(&self, t: f64, p: f64) -> f64 {
        self.specific_heat(t, p) * t
    }

    /// Thermal conductivity [W/(m·K)].
    fn thermal_conductivity(&self, t: f64, p: f64) -> f64;

    /// Prandtl number `μ·cp/k` (dimensionless).
    fn prandtl(&self, t: f64, p: f64) -> f64 {
        self.viscosity(t, p) * self.specific_heat(t, p)
            / inner_limit(self.thermal_conductivity(t, p), f64::EPSILON)
    }

    /// Adiabatic index γ (dimensionless).
    fn adiabatic_index(&self, t: f64, p: f64) -> f64;

    /// Pressure [Pa] from temperature [K] and density [kg/m³].
    fn pressure(&self, t: f64, density: f64) -> f64;

    /// Temperature [K] from specific enthalpy [J/kg] and pressure [Pa].
    ///
    /// Inverts `specific_enthalpy`: with `h = (bias + slope·T)·T`, the
    /// physical root of `slope·T² + bias·T − h = 0` is returned. The
    /// discriminant is clamped at zero against round-off.
    fn temperature(&self, h: f64, _p: f64) -> f64 {
        let a = self.cp_slope();
        let b = self.cp_bias();
        if a.abs() < f64::EPSILON {
            h / inner_limit(b, f64::EPSILON)
        } else {
            (-b + (b * b + 4.0 * a * h).max(0.0).sqrt()) / (2.0 * a)
        }
    }
}

/// Process-wide registry of per-species property handles.
pub trait PropertySource: Send + Sync {
    /// Get the shared property handle for a species.
    fn properties(&self, species: Species) -> FluidResult<Arc<dyn SpeciesProperties>>;
}
