//! Built-in curve-fit property catalog.
//!
//! Provides a predefined [`PropertySource`] backed by lightweight curve fits:
//! linear specific heat, viscosity, and thermal conductivity in temperature,
//! ideal-gas density and pressure for gases, and constant-density with linear
//! compressibility for liquids. Each fit carries a valid temperature range;
//! inputs are clamped into it so every evaluator stays finite and positive.
//!
//! The catalog is deliberately simple. Tabulated real-gas lookups belong to
//! an external property source implementing the same traits.

use crate::error::{FluidError, FluidResult};
use crate::properties::{PropertySource, SpeciesProperties};
use crate::species::Species;
use mf_core::numeric::inner_limit;
use mf_core::units::constants::R_UNIVERSAL;
use std::collections::HashMap;
use std::sync::Arc;

/// Pressure clamp range for curve-fit inputs [Pa].
const P_MIN: f64 = 1.0e-9;
const P_MAX: f64 = 1.0e9;

/// Floors keeping transport fits positive outside their fitted band.
const VISCOSITY_FLOOR: f64 = 1.0e-6;
const CONDUCTIVITY_FLOOR: f64 = 1.0e-3;

/// Reference pressure for the liquid compressibility fit [Pa].
const P_REF_LIQUID: f64 = 101_325.0;

/// Liquid equation of state: constant reference density with linear
/// compressibility about atmospheric pressure.
#[derive(Debug, Clone, Copy)]
struct LiquidEos {
    /// Reference density [kg/m³]
    density: f64,
    /// Bulk modulus [Pa]
    bulk_modulus: f64,
}

/// Curve-fit property data for one species.
#[derive(Debug, Clone)]
pub struct CurveFit {
    species: Species,
    mweight: f64,
    /// cp = cp[0] + cp[1]·T [J/(kg·K)]
    cp: [f64; 2],
    /// μ = visc[0] + visc[1]·T [Pa·s]
    viscosity: [f64; 2],
    /// k = cond[0] + cond[1]·T [W/(m·K)]
    conductivity: [f64; 2],
    /// Valid temperature range [K]; inputs are clamped into it.
    t_range: (f64, f64),
    /// None for ideal gases.
    liquid: Option<LiquidEos>,
}

impl CurveFit {
    fn clamp_t(&self, t: f64) -> f64 {
        t.clamp(self.t_range.0, self.t_range.1)
    }

    fn clamp_p(&self, p: f64) -> f64 {
        p.clamp(P_MIN, P_MAX)
    }

    /// Specific gas constant [J/(kg·K)].
    fn r_specific(&self) -> f64 {
        R_UNIVERSAL / self.mweight
    }
}

impl SpeciesProperties for CurveFit {
    fn species(&self) -> Species {
        self.species
    }

    fn molar_mass(&self) -> f64 {
        self.mweight
    }

    fn density(&self, t: f64, p: f64) -> f64 {
        let t = self.clamp_t(t);
        let p = self.clamp_p(p);
        match self.liquid {
            Some(eos) => eos.density * (1.0 + (p - P_REF_LIQUID) / eos.bulk_modulus),
            None => p / (self.r_specific() * t),
        }
    }

    fn viscosity(&self, t: f64, _p: f64) -> f64 {
        let t = self.clamp_t(t);
        (self.viscosity[0] + self.viscosity[1] * t).max(VISCOSITY_FLOOR)
    }

    fn cp_bias(&self) -> f64 {
        self.cp[0]
    }

    fn cp_slope(&self) -> f64 {
        self.cp[1]
    }

    fn specific_heat(&self, t: f64, _p: f64) -> f64 {
        self.cp[0] + self.cp[1] * self.clamp_t(t)
    }

    fn thermal_conductivity(&self, t: f64, _p: f64) -> f64 {
        let t = self.clamp_t(t);
        (self.conductivity[0] + self.conductivity[1] * t).max(CONDUCTIVITY_FLOOR)
    }

    fn adiabatic_index(&self, t: f64, p: f64) -> f64 {
        match self.liquid {
            Some(_) => 1.0,
            None => {
                let cp = self.specific_heat(t, p);
                cp / inner_limit(cp - self.r_specific(), f64::EPSILON)
            }
        }
    }

    fn pressure(&self, t: f64, density: f64) -> f64 {
        let t = self.clamp_t(t);
        let p = match self.liquid {
            Some(eos) => P_REF_LIQUID + eos.bulk_modulus * (density / eos.density - 1.0),
            None => density * self.r_specific() * t,
        };
        p.clamp(P_MIN, P_MAX)
    }

    fn temperature(&self, h: f64, _p: f64) -> f64 {
        let a = self.cp[1];
        let b = self.cp[0];
        let t = if a.abs() < f64::EPSILON {
            h / inner_limit(b, f64::EPSILON)
        } else {
            (-b + (b * b + 4.0 * a * h).max(0.0).sqrt()) / (2.0 * a)
        };
        self.clamp_t(t)
    }
}

/// All predefined species fits.
fn standard_fits() -> Vec<CurveFit> {
    let gas = |species: Species,
               cp: [f64; 2],
               viscosity: [f64; 2],
               conductivity: [f64; 2],
               t_range: (f64, f64)| CurveFit {
        species,
        mweight: species.molar_mass(),
        cp,
        viscosity,
        conductivity,
        t_range,
        liquid: None,
    };
    let liquid = |species: Species,
                  cp: [f64; 2],
                  viscosity: [f64; 2],
                  conductivity: [f64; 2],
                  t_range: (f64, f64),
                  density: f64,
                  bulk_modulus: f64| CurveFit {
        species,
        mweight: species.molar_mass(),
        cp,
        viscosity,
        conductivity,
        t_range,
        liquid: Some(LiquidEos {
            density,
            bulk_modulus,
        }),
    };

    vec![
        gas(Species::N2, [970.0, 0.23], [7.12e-6, 3.56e-8], [0.0064, 6.5e-5], (65.0, 2500.0)),
        gas(Species::O2, [840.0, 0.26], [8.24e-6, 4.12e-8], [0.0071, 6.5e-5], (55.0, 2500.0)),
        gas(Species::H2, [13_500.0, 2.7], [3.56e-6, 1.78e-8], [0.045, 4.7e-4], (14.0, 2500.0)),
        gas(Species::He, [5_193.0, 0.0], [7.96e-6, 3.98e-8], [0.038, 3.8e-4], (3.0, 2500.0)),
        gas(Species::Ar, [520.3, 0.0], [9.08e-6, 4.54e-8], [0.0045, 4.4e-5], (84.0, 2500.0)),
        gas(Species::CO2, [600.0, 0.82], [6.0e-6, 3.0e-8], [0.0016, 5.0e-5], (195.0, 2500.0)),
        gas(Species::CO, [980.0, 0.20], [7.08e-6, 3.54e-8], [0.0067, 6.1e-5], (68.0, 2500.0)),
        gas(Species::CH4, [1_270.0, 3.2], [4.44e-6, 2.22e-8], [0.0043, 1.0e-4], (91.0, 2000.0)),
        gas(Species::Steam, [1_700.0, 0.65], [4.0e-6, 2.0e-8], [0.0006, 8.0e-5], (273.0, 2500.0)),
        gas(Species::NH3, [1_550.0, 2.1], [4.04e-6, 2.02e-8], [0.0036, 7.0e-5], (240.0, 2000.0)),
        gas(Species::Ne, [1_030.1, 0.0], [1.268e-5, 6.34e-8], [0.0163, 1.1e-4], (25.0, 2500.0)),
        gas(Species::Xe, [158.3, 0.0], [9.24e-6, 4.62e-8], [0.0019, 1.2e-5], (165.0, 2000.0)),
        liquid(
            Species::Water,
            [4_120.0, 0.22],
            [2.8e-3, -6.5e-6],
            [0.40, 7.0e-4],
            (273.0, 640.0),
            997.0,
            2.2e9,
        ),
        liquid(
            Species::Methanol,
            [2_200.0, 1.1],
            [1.74e-3, -4.0e-6],
            [0.32, -4.0e-4],
            (176.0, 500.0),
            792.0,
            1.0e9,
        ),
        liquid(
            Species::Glycol,
            [2_000.0, 1.7],
            [0.28, -8.0e-4],
            [0.26, -2.0e-4],
            (215.0, 460.0),
            1_036.0,
            2.5e9,
        ),
    ]
}

/// Built-in read-only property registry covering every [`Species`].
pub struct StandardCatalog {
    fits: HashMap<Species, Arc<CurveFit>>,
}

impl StandardCatalog {
    pub fn new() -> Self {
        let fits = standard_fits()
            .into_iter()
            .map(|fit| (fit.species, Arc::new(fit)))
            .collect();
        Self { fits }
    }

    /// Shared handle, convenient for passing into fluid state configs.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for StandardCatalog {
    fn properties(&self, species: Species) -> FluidResult<Arc<dyn SpeciesProperties>> {
        self.fits
            .get(&species)
            .cloned()
            .map(|fit| fit as Arc<dyn SpeciesProperties>)
            .ok_or(FluidError::Config {
                what: "species missing from property catalog",
            })
    }
}
