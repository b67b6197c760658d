//! Trace compound ledger contract.
//!
//! Minor species tracked by mole live outside the bulk constituent array, in
//! a ledger owned by the mixture but implemented externally. The mixture only
//! drives the hooks below during mixing and mass bookkeeping; it never reads
//! ledger state back into its own composite properties.

use crate::error::FluidResult;
use crate::species::Species;

/// Mole-based ledger of minor species carried alongside a mixture.
///
/// `flow_in` receives the in-flowing molar rate and the mixed total moles
/// explicitly; the owning mixture computes both during `add_state` so the
/// ledger never needs to reach back into its owner.
pub trait TraceCompounds: Send + Sync {
    /// Index of a compound in the ledger, if present.
    fn find_compound(&self, species: Species) -> Option<usize>;

    /// Current mole fractions, one per ledger compound.
    fn mole_fractions(&self) -> &[f64];

    /// Overwrite mole fractions. Fails if the slice length does not match
    /// the ledger's compound count.
    fn set_mole_fractions(&mut self, fractions: &[f64]) -> FluidResult<()>;

    /// Mix an upstream ledger in: `in_moles` is the molar rate entering and
    /// `total_moles` the mixed molar total to renormalize against.
    fn flow_in(&mut self, source: &dyn TraceCompounds, in_moles: f64, total_moles: f64);

    /// Re-derive compound masses from current mole fractions after the
    /// owner's total moles changed organically.
    fn update_masses(&mut self, total_moles: f64);

    /// Recompute compound masses holding mole fractions constant, after the
    /// owner's total mass was set directly.
    fn set_masses(&mut self, total_moles: f64);

    /// Zero all ledger quantities.
    fn reset(&mut self);
}
