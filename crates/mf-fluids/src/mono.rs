//! Single-species fluid state.

use crate::error::{FluidError, FluidResult};
use crate::properties::SpeciesProperties;
use crate::species::{Phase, Species};
use std::fmt;
use std::sync::Arc;

/// Inputs below this are treated as zero at construction time.
pub(crate) const MIN_STATE_INPUT: f64 = f32::EPSILON as f64;

/// Flows below this magnitude cannot weight a mixing average.
const MIN_FLOW_RATE: f64 = f64::EPSILON * f64::EPSILON;

/// Thermodynamic state of a single species.
///
/// Owned exclusively by one mixture constituent slot. The owning
/// [`PolyFluidState`](crate::poly::PolyFluidState) pushes temperature and
/// partial pressure in; external callers only read. Mass and moles are kept
/// dual (`mole = mass / molar_mass`) by every mutator.
pub struct MonoFluidState {
    properties: Arc<dyn SpeciesProperties>,
    /// Temperature [K]
    temperature: f64,
    /// Pressure [Pa]; the partial pressure when owned by a mixture
    pressure: f64,
    /// Mass flow rate [kg/s]
    flow_rate: f64,
    /// Mass [kg]
    mass: f64,
    /// Moles [kmol]
    mole: f64,
}

impl MonoFluidState {
    /// Build a validated single-species state.
    ///
    /// Temperature and pressure below single-precision epsilon are rejected;
    /// a state that cold or evacuated has no meaningful properties.
    pub(crate) fn new(
        properties: Arc<dyn SpeciesProperties>,
        temperature: f64,
        pressure: f64,
        flow_rate: f64,
        mass: f64,
    ) -> FluidResult<Self> {
        if temperature < MIN_STATE_INPUT {
            return Err(FluidError::InvalidInput {
                what: "temperature below minimum",
            });
        }
        if pressure < MIN_STATE_INPUT {
            return Err(FluidError::InvalidInput {
                what: "pressure below minimum",
            });
        }
        let mole = mass / properties.molar_mass();
        Ok(Self {
            properties,
            temperature,
            pressure,
            flow_rate,
            mass,
            mole,
        })
    }

    pub fn species(&self) -> Species {
        self.properties.species()
    }

    pub fn phase(&self) -> Phase {
        self.properties.phase()
    }

    /// Property handle this state forwards to.
    pub fn properties(&self) -> &Arc<dyn SpeciesProperties> {
        &self.properties
    }

    /// Temperature [K]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Pressure [Pa]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Mass flow rate [kg/s]
    pub fn flow_rate(&self) -> f64 {
        self.flow_rate
    }

    /// Mass [kg]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Moles [kmol]
    pub fn mole(&self) -> f64 {
        self.mole
    }

    /// Molar mass [kg/kmol]
    pub fn molar_mass(&self) -> f64 {
        self.properties.molar_mass()
    }

    // --- property getters at the current (T, P) ---

    /// Density [kg/m³]
    pub fn density(&self) -> f64 {
        self.properties.density(self.temperature, self.pressure)
    }

    /// Dynamic viscosity [Pa·s]
    pub fn viscosity(&self) -> f64 {
        self.properties.viscosity(self.temperature, self.pressure)
    }

    /// Specific heat [J/(kg·K)]
    pub fn specific_heat(&self) -> f64 {
        self.properties
            .specific_heat(self.temperature, self.pressure)
    }

    /// Specific enthalpy [J/kg], `cp(T)·T`
    pub fn specific_enthalpy(&self) -> f64 {
        self.properties
            .specific_enthalpy(self.temperature, self.pressure)
    }

    /// Thermal conductivity [W/(m·K)]
    pub fn thermal_conductivity(&self) -> f64 {
        self.properties
            .thermal_conductivity(self.temperature, self.pressure)
    }

    /// Prandtl number
    pub fn prandtl_number(&self) -> f64 {
        self.properties.prandtl(self.temperature, self.pressure)
    }

    /// Adiabatic index γ
    pub fn adiabatic_index(&self) -> f64 {
        self.properties
            .adiabatic_index(self.temperature, self.pressure)
    }

    // --- pure evaluators; never touch stored state ---

    /// Temperature [K] recovered from specific enthalpy at the current pressure.
    pub fn compute_temperature(&self, h: f64) -> f64 {
        self.properties.temperature(h, self.pressure)
    }

    /// Specific enthalpy [J/kg] at an arbitrary (T, P).
    pub fn compute_specific_enthalpy(&self, t: f64, p: f64) -> f64 {
        self.properties.specific_enthalpy(t, p)
    }

    /// Pressure [Pa] at an arbitrary (T, density).
    pub fn compute_pressure(&self, t: f64, density: f64) -> f64 {
        self.properties.pressure(t, density)
    }

    /// Density [kg/m³] at an arbitrary (T, P).
    pub fn compute_density(&self, t: f64, p: f64) -> f64 {
        self.properties.density(t, p)
    }

    // --- mutators, reserved for the owning mixture ---

    pub(crate) fn set_temperature(&mut self, t: f64) {
        self.temperature = t;
    }

    pub(crate) fn set_pressure(&mut self, p: f64) {
        self.pressure = p;
    }

    pub(crate) fn set_flow_rate(&mut self, flow: f64) {
        self.flow_rate = flow;
    }

    /// Set mass; moles follow.
    pub(crate) fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.mole = mass / self.properties.molar_mass();
    }

    /// Set moles; mass follows.
    pub(crate) fn set_mole(&mut self, mole: f64) {
        self.mole = mole;
        self.mass = mole * self.properties.molar_mass();
    }

    /// Zero all state; the property handle is retained.
    pub(crate) fn reset_state(&mut self) {
        self.temperature = 0.0;
        self.pressure = 0.0;
        self.flow_rate = 0.0;
        self.mass = 0.0;
        self.mole = 0.0;
    }

    /// Copy temperature, pressure, and flow from another state.
    ///
    /// Mass and moles are quantity bookkeeping of the destination and are
    /// never copied.
    pub(crate) fn set_state(&mut self, src: &MonoFluidState) {
        self.temperature = src.temperature;
        self.pressure = src.pressure;
        self.flow_rate = src.flow_rate;
    }

    /// Mix another state's flow into this one.
    ///
    /// The incoming flow is `override_flow` when its magnitude reaches the
    /// minimum, otherwise `src`'s own flow. Temperature and pressure become
    /// flow-weighted averages when the combined flow can carry a weighting;
    /// below the minimum they fall back to an unweighted 50/50 average,
    /// avoiding both a vanishing denominator and an arbitrary near-zero
    /// weight deciding the outcome.
    pub(crate) fn add_state(&mut self, src: &MonoFluidState, override_flow: f64) {
        let in_flow = if override_flow.abs() >= MIN_FLOW_RATE {
            override_flow
        } else {
            src.flow_rate
        };
        let combined = self.flow_rate + in_flow;

        if combined.abs() >= MIN_FLOW_RATE {
            self.temperature = (self.temperature * self.flow_rate + src.temperature * in_flow)
                / combined;
            self.pressure = (self.pressure * self.flow_rate + src.pressure * in_flow) / combined;
        } else {
            self.temperature = 0.5 * (self.temperature + src.temperature);
            self.pressure = 0.5 * (self.pressure + src.pressure);
        }
        self.flow_rate = combined;
    }
}

impl fmt::Debug for MonoFluidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonoFluidState")
            .field("species", &self.species())
            .field("temperature", &self.temperature)
            .field("pressure", &self.pressure)
            .field("flow_rate", &self.flow_rate)
            .field("mass", &self.mass)
            .field("mole", &self.mole)
            .finish()
    }
}
