//! mf-fluids: fluid mixture states for mixflow.
//!
//! Provides:
//! - Chemical species and phase definitions
//! - Property source contracts plus a built-in curve-fit catalog
//! - Single-species state ([`MonoFluidState`])
//! - Multi-species mixture state ([`PolyFluidState`]) with conservation
//!   bookkeeping, stream mixing, and closed-form enthalpy inversion
//! - Trace compound ledger contract for minor species tracked by mole
//!
//! # Architecture
//!
//! A mixture owns one [`MonoFluidState`] per configured species and keeps
//! bulk and per-constituent mass, mole, and energy quantities consistent
//! under composition edits, temperature and pressure changes, and
//! stream-mixing events. Property evaluation is delegated to a shared
//! [`PropertySource`]; the built-in [`StandardCatalog`] covers every
//! [`Species`] with lightweight curve fits, and a tabulated real-gas source
//! can be swapped in behind the same traits.
//!
//! The surrounding network solver constructs one mixture per node or link
//! commodity, mutates it every step, and reads bulk properties back; the
//! mixture itself never iterates.
//!
//! # Example
//!
//! ```
//! use mf_fluids::{PolyFluidConfig, PolyFluidInput, PolyFluidState, Species, StandardCatalog};
//! use mf_core::units::{k, kg, kgps, pa};
//!
//! let mix = PolyFluidState::new(
//!     PolyFluidConfig {
//!         name: "cabin.air".into(),
//!         source: StandardCatalog::shared(),
//!         species: vec![Species::N2, Species::O2],
//!         trace: None,
//!     },
//!     PolyFluidInput {
//!         temperature: k(300.0),
//!         pressure: pa(101_325.0),
//!         flow_rate: kgps(0.0),
//!         mass: kg(1.0),
//!         mass_fractions: vec![0.767, 0.233],
//!     },
//! )
//! .unwrap();
//!
//! println!("MW = {} kg/kmol", mix.mweight());
//! ```

pub mod catalog;
pub mod error;
pub mod mono;
pub mod poly;
pub mod properties;
pub mod species;
pub mod trace;

// Re-exports for ergonomics
pub use catalog::StandardCatalog;
pub use error::{FluidError, FluidResult};
pub use mono::MonoFluidState;
pub use poly::{
    Constituent, FRACTION_TOLERANCE, PolyFluidConfig, PolyFluidInput, PolyFluidState,
};
pub use properties::{PropertySource, SpeciesProperties};
pub use species::{Phase, Species};
pub use trace::TraceCompounds;
