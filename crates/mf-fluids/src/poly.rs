//! Multi-species mixture state.
//!
//! A [`PolyFluidState`] owns an ordered array of weighted constituents, each
//! a [`MonoFluidState`], and keeps bulk and per-constituent mass, mole, and
//! energy bookkeeping self-consistent under composition edits, temperature
//! and pressure changes, and stream-mixing events.
//!
//! Invariants held after every successful public call:
//! - mass fractions and mole fractions each sum to 1 within tolerance
//! - all non-negligible constituents share one phase; the composite mirrors it
//! - `mole = mass / mweight`, composite and per-constituent
//! - `mweight = 1 / Σ(mole_fraction_i / molar_mass_i)`, clamped away from zero
//! - constituent pressure is the Dalton partial pressure
//!   `mole_fraction × composite pressure`; constituents never receive
//!   temperature or pressure from anyone but their owning mixture

use crate::error::{FluidError, FluidResult};
use crate::mono::{MIN_STATE_INPUT, MonoFluidState};
use crate::properties::PropertySource;
use crate::species::{Phase, Species};
use crate::trace::TraceCompounds;
use mf_core::numeric::inner_limit;
use mf_core::units::{Mass, MassRate, Pressure, Temperature};
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uom::si::{
    mass::kilogram, mass_rate::kilogram_per_second, pressure::pascal,
    thermodynamic_temperature::kelvin,
};

/// Largest tolerated deviation of a fraction sum from one.
pub const FRACTION_TOLERANCE: f64 = 1.0e-4;

/// Deviations above this are renormalized (with a warning); below it the
/// fractions are left untouched.
const FRACTION_RENORM: f64 = f32::EPSILON as f64;

/// Clamp for molar quantities. Tighter than the mass-flow limit: legitimate
/// mass flow can sit at machine epsilon while the corresponding molar flow,
/// divided by a molar mass well below one, is larger; a looser clamp would
/// wrongly zero valid trace flows.
const MOLE_INNER_LIMIT: f64 = f64::EPSILON * f64::EPSILON;

/// Construction-time configuration of a mixture.
pub struct PolyFluidConfig {
    /// Instance name used in diagnostics; must not be empty.
    pub name: String,
    /// Shared read-only property registry.
    pub source: Arc<dyn PropertySource>,
    /// Ordered constituent species. Two mixtures can exchange state only if
    /// their species lists match exactly.
    pub species: Vec<Species>,
    /// Optional minor-species ledger, owned by the mixture once configured.
    pub trace: Option<Box<dyn TraceCompounds>>,
}

/// Initial state of a mixture.
pub struct PolyFluidInput {
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub flow_rate: MassRate,
    pub mass: Mass,
    /// One entry per configured species; must sum to one within tolerance.
    pub mass_fractions: Vec<f64>,
}

/// One weighted slot of the constituent array.
pub struct Constituent {
    species: Species,
    fluid: MonoFluidState,
    mass_fraction: f64,
    mole_fraction: f64,
}

impl Constituent {
    pub fn species(&self) -> Species {
        self.species
    }

    pub fn fluid(&self) -> &MonoFluidState {
        &self.fluid
    }

    pub fn mass_fraction(&self) -> f64 {
        self.mass_fraction
    }

    pub fn mole_fraction(&self) -> f64 {
        self.mole_fraction
    }

    fn molar_mass(&self) -> f64 {
        self.fluid.molar_mass()
    }
}

/// Thermodynamic state of a fluid mixture.
pub struct PolyFluidState {
    name: String,
    /// Temperature [K]
    temperature: f64,
    /// Pressure [Pa]
    pressure: f64,
    /// Mass flow rate [kg/s]
    flow_rate: f64,
    /// Mass [kg]
    mass: f64,
    /// Moles [kmol]
    mole: f64,
    phase: Phase,
    /// Molecular weight [kg/kmol]
    mweight: f64,
    /// Density [kg/m³]
    density: f64,
    /// Dynamic viscosity [Pa·s]
    viscosity: f64,
    /// Specific heat [J/(kg·K)]
    specific_heat: f64,
    /// Specific enthalpy [J/kg]
    specific_enthalpy: f64,
    /// Thermal conductivity [W/(m·K)]
    thermal_conductivity: f64,
    /// Prandtl number
    prandtl: f64,
    /// Adiabatic index γ
    adiabatic_index: f64,
    constituents: Vec<Constituent>,
    trace: Option<Box<dyn TraceCompounds>>,
}

impl PolyFluidState {
    /// Build a validated mixture from configuration and initial state.
    ///
    /// Every constituent is constructed from the shared initial temperature,
    /// pressure, flow, and mass; a single failure discards the whole staged
    /// array. On success the state is fully derived and the trace ledger, if
    /// configured, has its compound masses established.
    pub fn new(config: PolyFluidConfig, input: PolyFluidInput) -> FluidResult<Self> {
        if config.name.is_empty() {
            return Err(FluidError::InvalidInput {
                what: "mixture name is empty",
            });
        }
        if config.species.is_empty() {
            return Err(FluidError::Config {
                what: "species list is empty",
            });
        }
        if input.mass_fractions.len() != config.species.len() {
            return Err(FluidError::Config {
                what: "mass fraction count does not match species count",
            });
        }

        let temperature = input.temperature.get::<kelvin>();
        let pressure = input.pressure.get::<pascal>();
        let flow_rate = input.flow_rate.get::<kilogram_per_second>();
        let mass = input.mass.get::<kilogram>();

        // Stage the constituent array; any failure discards it whole.
        let constituents = config
            .species
            .iter()
            .zip(&input.mass_fractions)
            .map(|(&species, &mass_fraction)| {
                let properties = config.source.properties(species)?;
                let fluid =
                    MonoFluidState::new(properties, temperature, pressure, flow_rate, mass)?;
                Ok(Constituent {
                    species,
                    fluid,
                    mass_fraction,
                    // Provisional; corrected by the first derive.
                    mole_fraction: mass_fraction,
                })
            })
            .collect::<FluidResult<Vec<_>>>()?;

        let mut state = Self {
            name: config.name,
            temperature,
            pressure,
            flow_rate,
            mass,
            mole: 0.0,
            phase: Phase::NoPhase,
            mweight: 0.0,
            density: 0.0,
            viscosity: 0.0,
            specific_heat: 0.0,
            specific_enthalpy: 0.0,
            thermal_conductivity: 0.0,
            prandtl: 0.0,
            adiabatic_index: 0.0,
            constituents,
            trace: config.trace,
        };

        state.validate()?;
        state.derive();
        if let Some(trace) = state.trace.as_mut() {
            trace.set_masses(state.mole);
        }
        Ok(state)
    }

    // --- accessors ---

    pub fn name(&self) -> &str {
        &self.name
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

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Molecular weight [kg/kmol]
    pub fn mweight(&self) -> f64 {
        self.mweight
    }

    /// Density [kg/m³]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Dynamic viscosity [Pa·s]
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Specific heat [J/(kg·K)]
    pub fn specific_heat(&self) -> f64 {
        self.specific_heat
    }

    /// Specific enthalpy [J/kg]
    pub fn specific_enthalpy(&self) -> f64 {
        self.specific_enthalpy
    }

    /// Thermal conductivity [W/(m·K)]
    pub fn thermal_conductivity(&self) -> f64 {
        self.thermal_conductivity
    }

    /// Prandtl number
    pub fn prandtl_number(&self) -> f64 {
        self.prandtl
    }

    /// Adiabatic index γ
    pub fn adiabatic_index(&self) -> f64 {
        self.adiabatic_index
    }

    pub fn num_constituents(&self) -> usize {
        self.constituents.len()
    }

    pub fn constituents(&self) -> &[Constituent] {
        &self.constituents
    }

    pub fn constituent(&self, index: usize) -> FluidResult<&Constituent> {
        self.constituents.get(index).ok_or(FluidError::IndexOob {
            what: "constituent",
            index,
            len: self.constituents.len(),
        })
    }

    pub fn mass_fraction(&self, index: usize) -> FluidResult<f64> {
        Ok(self.constituent(index)?.mass_fraction)
    }

    pub fn mole_fraction(&self, index: usize) -> FluidResult<f64> {
        Ok(self.constituent(index)?.mole_fraction)
    }

    /// Index of a bulk constituent species.
    pub fn find(&self, species: Species) -> FluidResult<usize> {
        self.constituents
            .iter()
            .position(|c| c.species == species)
            .ok_or(FluidError::OutOfRange {
                what: "species is not a constituent",
            })
    }

    /// Index of a trace compound in the ledger, if the mixture carries one
    /// and the ledger knows the compound.
    pub fn find_compound(&self, species: Species) -> Option<usize> {
        self.trace.as_ref()?.find_compound(species)
    }

    pub fn trace(&self) -> Option<&dyn TraceCompounds> {
        self.trace.as_deref()
    }

    pub fn trace_mut(&mut self) -> Option<&mut (dyn TraceCompounds + 'static)> {
        self.trace.as_deref_mut()
    }

    // --- validation ---

    /// Check fraction sums and phase consistency on the stored fractions.
    pub(crate) fn validate(&mut self) -> FluidResult<()> {
        let mut fractions: Vec<f64> =
            self.constituents.iter().map(|c| c.mass_fraction).collect();
        normalize_fractions(&self.name, "mass", &mut fractions)?;
        for (c, &fraction) in self.constituents.iter_mut().zip(&fractions) {
            c.mass_fraction = fraction;
        }
        self.phase = resolve_phase(
            self.constituents
                .iter()
                .map(|c| (c.species, c.mass_fraction)),
        )?;
        Ok(())
    }

    // --- derivation ---

    /// Derive mole fractions, molecular weight, moles, constituent
    /// distribution, and composite properties from the current mass,
    /// fractions, temperature, and pressure.
    pub(crate) fn derive(&mut self) {
        let mut moles_per_unit_mass = 0.0;
        for c in &self.constituents {
            moles_per_unit_mass += c.mass_fraction / c.molar_mass();
        }
        let moles_per_unit_mass = inner_limit(moles_per_unit_mass, f64::EPSILON);

        self.mweight = 1.0 / moles_per_unit_mass;
        self.mole = self.mass / self.mweight;

        for c in &mut self.constituents {
            c.mole_fraction = c.mass_fraction / c.fluid.molar_mass() / moles_per_unit_mass;
        }
        let (temperature, pressure, flow_rate, mass) =
            (self.temperature, self.pressure, self.flow_rate, self.mass);
        for c in &mut self.constituents {
            c.fluid.set_temperature(temperature);
            c.fluid.set_pressure(c.mole_fraction * pressure);
            c.fluid.set_flow_rate(c.mass_fraction * flow_rate);
            c.fluid.set_mass(c.mass_fraction * mass);
        }
        self.refresh_properties();
    }

    /// Recompute composite bulk properties from constituents at their
    /// current temperature and partial pressures. Density is the sum of
    /// partial densities; viscosity, Prandtl number, and adiabatic index are
    /// mole-fraction weighted; specific heat and thermal conductivity are
    /// mass-fraction weighted; enthalpy is `cp·T`.
    fn refresh_properties(&mut self) {
        let mut density = 0.0;
        let mut viscosity = 0.0;
        let mut specific_heat = 0.0;
        let mut thermal_conductivity = 0.0;
        let mut prandtl = 0.0;
        let mut adiabatic_index = 0.0;

        for c in &self.constituents {
            if c.mole_fraction.abs() <= f64::EPSILON {
                continue;
            }
            density += c.fluid.density();
            viscosity += c.mole_fraction * c.fluid.viscosity();
            prandtl += c.mole_fraction * c.fluid.prandtl_number();
            adiabatic_index += c.mole_fraction * c.fluid.adiabatic_index();
            specific_heat += c.mass_fraction * c.fluid.specific_heat();
            thermal_conductivity += c.mass_fraction * c.fluid.thermal_conductivity();
        }

        self.density = density;
        self.viscosity = viscosity;
        self.specific_heat = specific_heat;
        self.thermal_conductivity = thermal_conductivity;
        self.prandtl = prandtl;
        self.adiabatic_index = adiabatic_index;
        self.specific_enthalpy = specific_heat * self.temperature;
    }

    // --- mutators ---

    /// Set the composite temperature, push it with refreshed partial
    /// pressures to every constituent, and recompute composite properties.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
        let pressure = self.pressure;
        for c in &mut self.constituents {
            c.fluid.set_temperature(temperature);
            c.fluid.set_pressure(c.mole_fraction * pressure);
        }
        self.refresh_properties();
    }

    /// Set the composite pressure and recompute density from the new
    /// partial pressures.
    ///
    /// Only density is refreshed; the remaining composite properties stay
    /// stale until the next `set_temperature`.
    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
        let mut density = 0.0;
        for c in &mut self.constituents {
            c.fluid.set_pressure(c.mole_fraction * pressure);
            if c.mole_fraction.abs() > f64::EPSILON {
                density += c.fluid.density();
            }
        }
        self.density = density;
    }

    /// Set composite mass and a new mass fraction distribution, re-deriving
    /// moles, molecular weight, and the constituent quantities.
    ///
    /// Composite thermodynamic properties stay stale until the next
    /// `set_temperature`.
    pub fn set_mass_and_mass_fractions(
        &mut self,
        mass: f64,
        mass_fractions: &[f64],
    ) -> FluidResult<()> {
        if mass_fractions.len() != self.constituents.len() {
            return Err(FluidError::OutOfRange {
                what: "mass fraction count does not match constituent count",
            });
        }
        let mut fractions = mass_fractions.to_vec();
        normalize_fractions(&self.name, "mass", &mut fractions)?;
        let phase = resolve_phase(
            self.constituents
                .iter()
                .zip(&fractions)
                .map(|(c, &fraction)| (c.species, fraction)),
        )?;

        self.mass = mass;
        self.phase = phase;
        let mut moles_per_unit_mass = 0.0;
        for (c, &fraction) in self.constituents.iter().zip(&fractions) {
            moles_per_unit_mass += fraction / c.molar_mass();
        }
        let moles_per_unit_mass = inner_limit(moles_per_unit_mass, f64::EPSILON);
        self.mweight = 1.0 / moles_per_unit_mass;
        self.mole = mass / self.mweight;

        let (mole, flow_rate) = (self.mole, self.flow_rate);
        for (c, &fraction) in self.constituents.iter_mut().zip(&fractions) {
            c.mass_fraction = fraction;
            c.mole_fraction = fraction / c.fluid.molar_mass() / moles_per_unit_mass;
            c.fluid.set_mole(c.mole_fraction * mole);
            c.fluid.set_flow_rate(fraction * flow_rate);
        }
        Ok(())
    }

    /// Dual of [`set_mass_and_mass_fractions`]: set composite moles and a
    /// mole fraction distribution, back-deriving mass quantities.
    ///
    /// [`set_mass_and_mass_fractions`]: Self::set_mass_and_mass_fractions
    pub fn set_mole_and_mole_fractions(
        &mut self,
        mole: f64,
        mole_fractions: &[f64],
    ) -> FluidResult<()> {
        if mole_fractions.len() != self.constituents.len() {
            return Err(FluidError::OutOfRange {
                what: "mole fraction count does not match constituent count",
            });
        }
        let mut fractions = mole_fractions.to_vec();
        normalize_fractions(&self.name, "mole", &mut fractions)?;
        let phase = resolve_phase(
            self.constituents
                .iter()
                .zip(&fractions)
                .map(|(c, &fraction)| (c.species, fraction)),
        )?;

        let mut mweight = 0.0;
        for (c, &fraction) in self.constituents.iter().zip(&fractions) {
            mweight += fraction * c.molar_mass();
        }
        self.mweight = inner_limit(mweight, f64::EPSILON);
        self.mole = mole;
        self.mass = mole * self.mweight;
        self.phase = phase;

        let (mass, flow_rate, mweight) = (self.mass, self.flow_rate, self.mweight);
        for (c, &fraction) in self.constituents.iter_mut().zip(&fractions) {
            c.mole_fraction = fraction;
            c.mass_fraction = fraction * c.fluid.molar_mass() / mweight;
            c.fluid.set_mass(c.mass_fraction * mass);
            c.fluid.set_flow_rate(c.mass_fraction * flow_rate);
        }
        Ok(())
    }

    /// Raw per-constituent mass write. The composite is left inconsistent
    /// until the caller follows up with [`update_mass`](Self::update_mass).
    pub fn set_constituent_mass(&mut self, index: usize, mass: f64) -> FluidResult<()> {
        let len = self.constituents.len();
        let c = self
            .constituents
            .get_mut(index)
            .ok_or(FluidError::IndexOob {
                what: "constituent",
                index,
                len,
            })?;
        c.fluid.set_mass(mass);
        Ok(())
    }

    /// Set the composite mass, apportioning it to constituents by their
    /// existing mass fractions. Trace compound mole fractions are held
    /// constant while the ledger masses are recomputed.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.mole = mass / inner_limit(self.mweight, f64::EPSILON);
        for c in &mut self.constituents {
            c.fluid.set_mass(c.mass_fraction * mass);
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.set_masses(self.mole);
        }
    }

    /// Re-derive composite mass, moles, molecular weight, and fractions
    /// purely from the current constituent masses — the inverse direction of
    /// [`set_mass_and_mass_fractions`](Self::set_mass_and_mass_fractions).
    pub fn update_mass(&mut self) {
        let total: f64 = self.constituents.iter().map(|c| c.fluid.mass()).sum();
        self.mass = inner_limit(total, f64::EPSILON);

        let mut moles_per_unit_mass = 0.0;
        for c in &mut self.constituents {
            c.mass_fraction = c.fluid.mass() / self.mass;
            moles_per_unit_mass += c.mass_fraction / c.fluid.molar_mass();
        }
        let moles_per_unit_mass = inner_limit(moles_per_unit_mass, f64::EPSILON);
        self.mweight = 1.0 / moles_per_unit_mass;
        self.mole = self.mass / self.mweight;
        for c in &mut self.constituents {
            c.mole_fraction = c.mass_fraction / c.fluid.molar_mass() / moles_per_unit_mass;
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.update_masses(self.mole);
        }
    }

    /// Zero the composite, every constituent, and the trace ledger.
    pub fn reset_state(&mut self) {
        self.temperature = 0.0;
        self.pressure = 0.0;
        self.flow_rate = 0.0;
        self.mass = 0.0;
        self.mole = 0.0;
        self.mweight = 0.0;
        self.density = 0.0;
        self.viscosity = 0.0;
        self.specific_heat = 0.0;
        self.specific_enthalpy = 0.0;
        self.thermal_conductivity = 0.0;
        self.prandtl = 0.0;
        self.adiabatic_index = 0.0;
        for c in &mut self.constituents {
            c.mass_fraction = 0.0;
            c.mole_fraction = 0.0;
            c.fluid.reset_state();
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.reset();
        }
    }

    /// Copy another mixture's state: transport quantities, fractions, and
    /// derived properties verbatim. The source is assumed self-consistent;
    /// nothing is re-derived. Composite mass and moles are not copied.
    pub fn set_state(&mut self, src: &PolyFluidState) -> FluidResult<()> {
        self.check_compatible(src)?;

        self.temperature = src.temperature;
        self.pressure = src.pressure;
        self.flow_rate = src.flow_rate;
        for (c, s) in self.constituents.iter_mut().zip(&src.constituents) {
            c.mass_fraction = s.mass_fraction;
            c.mole_fraction = s.mole_fraction;
            c.fluid.set_state(&s.fluid);
        }
        self.phase = src.phase;
        self.mweight = src.mweight;
        self.density = src.density;
        self.viscosity = src.viscosity;
        self.specific_heat = src.specific_heat;
        self.specific_enthalpy = src.specific_enthalpy;
        self.thermal_conductivity = src.thermal_conductivity;
        self.prandtl = src.prandtl;
        self.adiabatic_index = src.adiabatic_index;

        if let (Some(dst), Some(s)) = (self.trace.as_mut(), src.trace.as_ref()) {
            dst.set_mole_fractions(s.mole_fractions())?;
        }
        Ok(())
    }

    /// Mix an incoming stream into this one.
    ///
    /// The incoming flow is `override_flow` when its magnitude reaches
    /// machine epsilon, otherwise `src`'s own flow. Enthalpy, not
    /// temperature, is conserved across the mix: with specific heat linear
    /// in temperature the flow-weighted average of the pre-mix enthalpies is
    /// exact, and the mixed temperature is recovered from it by
    /// [`compute_temperature`](Self::compute_temperature).
    ///
    /// The composite molecular weight is rate-based here
    /// (`flow / molar flow`) rather than the quantity-based form used by
    /// derivation; mass and moles are not tracked in a pure flow-mixing
    /// event.
    pub fn add_state(&mut self, src: &PolyFluidState, override_flow: f64) -> FluidResult<()> {
        self.check_compatible(src)?;

        let dest_flow = self.flow_rate;
        let src_flow = if override_flow.abs() >= f64::EPSILON {
            override_flow
        } else {
            src.flow_rate
        };
        let new_flow = dest_flow + src_flow;
        if new_flow.abs() < f64::EPSILON {
            return Err(FluidError::OutOfRange {
                what: "combined flow rate below minimum",
            });
        }

        let h_dest = self.specific_enthalpy;
        let h_src = src.specific_enthalpy;
        self.flow_rate = new_flow;

        let mut mole_flow = 0.0;
        for (c, s) in self.constituents.iter_mut().zip(&src.constituents) {
            c.fluid.add_state(&s.fluid, src_flow * s.mass_fraction);
            mole_flow += c.fluid.flow_rate() / c.fluid.molar_mass();
        }
        let mole_flow = inner_limit(mole_flow, MOLE_INNER_LIMIT);

        let mut moles_per_unit_mass = 0.0;
        for c in &mut self.constituents {
            c.mass_fraction = c.fluid.flow_rate() / new_flow;
            moles_per_unit_mass += c.mass_fraction / c.fluid.molar_mass();
        }
        let moles_per_unit_mass = inner_limit(moles_per_unit_mass, MOLE_INNER_LIMIT);

        let mut pressure = 0.0;
        for c in &mut self.constituents {
            c.mole_fraction = c.mass_fraction / c.fluid.molar_mass() / moles_per_unit_mass;
            pressure += c.fluid.pressure() * c.mole_fraction;
        }
        self.pressure = pressure;

        self.specific_enthalpy =
            h_src * src_flow / new_flow + h_dest * dest_flow / new_flow;
        self.temperature = self.compute_temperature(self.specific_enthalpy);

        let temperature = self.temperature;
        for c in &mut self.constituents {
            c.fluid.set_temperature(temperature);
        }
        self.refresh_properties();
        self.mweight = new_flow / mole_flow;

        if let (Some(dst), Some(s)) = (self.trace.as_mut(), src.trace.as_ref()) {
            if src.mweight > f64::EPSILON {
                dst.flow_in(s.as_ref(), src_flow / src.mweight, mole_flow);
            }
        }
        Ok(())
    }

    /// Override temperature and pressure, both clamped non-negative.
    pub fn edit(&mut self, temperature: f64, pressure: f64) {
        self.pressure = pressure.max(0.0);
        self.set_temperature(temperature.max(0.0));
    }

    /// Override temperature and composition via partial pressures.
    ///
    /// The composite pressure becomes the sum of the non-negative partials.
    /// When that sum is meaningful, mole fractions follow from it and the
    /// composition is rewritten at constant total moles.
    ///
    /// Not atomic: a failure while rewriting the composition is downgraded
    /// to a warning and leaves the state partially updated (temperature and
    /// pressure applied, old composition kept).
    pub fn edit_partial_pressures(
        &mut self,
        temperature: f64,
        partial_pressures: &[f64],
    ) -> FluidResult<()> {
        if partial_pressures.len() != self.constituents.len() {
            return Err(FluidError::OutOfRange {
                what: "partial pressure count does not match constituent count",
            });
        }

        let total: f64 = partial_pressures.iter().map(|p| p.max(0.0)).sum();
        self.pressure = total;
        self.set_temperature(temperature);
        if total < MIN_STATE_INPUT {
            return Ok(());
        }

        let fractions: Vec<f64> = partial_pressures
            .iter()
            .map(|p| p.max(0.0) / total)
            .collect();
        match self.set_mole_and_mole_fractions(self.mole, &fractions) {
            Ok(()) => self.set_temperature(temperature),
            Err(err) => warn!(
                name = %self.name,
                %err,
                "partial pressure edit left state partially updated"
            ),
        }
        Ok(())
    }

    // --- pure evaluators ---

    /// Temperature [K] recovered from composite specific enthalpy [J/kg].
    ///
    /// Composite specific heat is linear in temperature,
    /// `cp = B + A·T` with mass-fraction-weighted per-species bias and
    /// slope, so `h = cp·T` solves in closed form:
    /// `A·T² + B·T − h = 0`, physical root
    /// `T = (−B + √max(B² + 4·A·h, 0)) / (2·A)`, discriminant clamped at
    /// zero against round-off. Exactly inverts
    /// [`compute_specific_enthalpy`](Self::compute_specific_enthalpy).
    pub fn compute_temperature(&self, h: f64) -> f64 {
        let mut slope = 0.0;
        let mut bias = 0.0;
        for c in &self.constituents {
            slope += c.mass_fraction * c.fluid.properties().cp_slope();
            bias += c.mass_fraction * c.fluid.properties().cp_bias();
        }
        if slope.abs() < f64::EPSILON {
            h / inner_limit(bias, f64::EPSILON)
        } else {
            (-bias + (bias * bias + 4.0 * slope * h).max(0.0).sqrt()) / (2.0 * slope)
        }
    }

    /// Specific enthalpy [J/kg] at an arbitrary (T, P): mass-fraction
    /// weighted sum of constituent enthalpies at their partial pressures.
    pub fn compute_specific_enthalpy(&self, t: f64, p: f64) -> f64 {
        self.constituents
            .iter()
            .filter(|c| c.mass_fraction.abs() > f64::EPSILON)
            .map(|c| c.mass_fraction * c.fluid.compute_specific_enthalpy(t, c.mole_fraction * p))
            .sum()
    }

    /// Pressure [Pa] at an arbitrary (T, density): sum of constituent
    /// partial pressures evaluated at mass-apportioned partial densities.
    pub fn compute_pressure(&self, t: f64, density: f64) -> f64 {
        self.constituents
            .iter()
            .filter(|c| c.mass_fraction.abs() > f64::EPSILON)
            .map(|c| c.fluid.compute_pressure(t, c.mass_fraction * density))
            .sum()
    }

    /// Density [kg/m³] at an arbitrary (T, P): sum of constituent partial
    /// densities at their partial pressures.
    pub fn compute_density(&self, t: f64, p: f64) -> f64 {
        self.constituents
            .iter()
            .filter(|c| c.mole_fraction.abs() > f64::EPSILON)
            .map(|c| c.fluid.compute_density(t, c.mole_fraction * p))
            .sum()
    }

    // --- internal helpers ---

    /// Two mixtures can exchange state only over identical ordered species.
    fn check_compatible(&self, other: &PolyFluidState) -> FluidResult<()> {
        if self.constituents.len() != other.constituents.len() {
            return Err(FluidError::OutOfRange {
                what: "constituent count mismatch",
            });
        }
        for (a, b) in self.constituents.iter().zip(&other.constituents) {
            if a.species != b.species {
                return Err(FluidError::OutOfRange {
                    what: "constituent species mismatch",
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PolyFluidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolyFluidState")
            .field("name", &self.name)
            .field("temperature", &self.temperature)
            .field("pressure", &self.pressure)
            .field("flow_rate", &self.flow_rate)
            .field("mass", &self.mass)
            .field("mole", &self.mole)
            .field("phase", &self.phase)
            .field("mweight", &self.mweight)
            .field("constituents", &self.constituents.len())
            .finish()
    }
}

/// Normalize a fraction distribution toward a unit sum.
///
/// Deviations beyond [`FRACTION_TOLERANCE`] are rejected; deviations above
/// single-precision epsilon are renormalized with a warning; smaller
/// deviations are left alone.
fn normalize_fractions(name: &str, kind: &str, fractions: &mut [f64]) -> FluidResult<()> {
    let sum: f64 = fractions.iter().sum();
    let error = (sum - 1.0).abs();
    if error > FRACTION_TOLERANCE {
        return Err(FluidError::InvalidInput {
            what: "fraction sum outside tolerance",
        });
    }
    if error > FRACTION_RENORM {
        warn!(name, kind, sum, "renormalizing fractions");
        for fraction in fractions.iter_mut() {
            *fraction /= sum;
        }
    }
    Ok(())
}

/// Composite phase from the first non-negligible constituent; a second
/// non-negligible constituent in a different phase is rejected.
fn resolve_phase(
    constituents: impl Iterator<Item = (Species, f64)>,
) -> FluidResult<Phase> {
    let mut phase = Phase::NoPhase;
    for (species, fraction) in constituents {
        if fraction.abs() <= f64::EPSILON {
            continue;
        }
        let p = species.phase();
        if phase == Phase::NoPhase {
            phase = p;
        } else if p != phase {
            return Err(FluidError::InvalidInput {
                what: "constituents span more than one phase",
            });
        }
    }
    Ok(phase)
}
