//! Chemical species and phase definitions.

/// Bulk phase of a species or mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Gas,
    Liquid,
    /// Unset phase, e.g. a freshly reset composite.
    NoPhase,
}

/// Chemical species tracked as bulk constituents of a mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Hydrogen (H₂)
    H2,
    /// Helium (He)
    He,
    /// Argon (Ar)
    Ar,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Carbon monoxide (CO)
    CO,
    /// Methane (CH₄)
    CH4,
    /// Water vapor (H₂O, gas phase)
    Steam,
    /// Ammonia (NH₃)
    NH3,
    /// Neon
    Ne,
    /// Xenon
    Xe,
    /// Liquid water
    Water,
    /// Liquid methanol
    Methanol,
    /// Liquid propylene glycol
    Glycol,
}

impl Species {
    pub const ALL: [Species; 15] = [
        Species::N2,
        Species::O2,
        Species::H2,
        Species::He,
        Species::Ar,
        Species::CO2,
        Species::CO,
        Species::CH4,
        Species::Steam,
        Species::NH3,
        Species::Ne,
        Species::Xe,
        Species::Water,
        Species::Methanol,
        Species::Glycol,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::H2 => "H2",
            Species::He => "He",
            Species::Ar => "Ar",
            Species::CO2 => "CO2",
            Species::CO => "CO",
            Species::CH4 => "CH4",
            Species::Steam => "Steam",
            Species::NH3 => "NH3",
            Species::Ne => "Ne",
            Species::Xe => "Xe",
            Species::Water => "Water",
            Species::Methanol => "Methanol",
            Species::Glycol => "Glycol",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::H2 => "Hydrogen",
            Species::He => "Helium",
            Species::Ar => "Argon",
            Species::CO2 => "Carbon Dioxide",
            Species::CO => "Carbon Monoxide",
            Species::CH4 => "Methane",
            Species::Steam => "Water Vapor",
            Species::NH3 => "Ammonia",
            Species::Ne => "Neon",
            Species::Xe => "Xenon",
            Species::Water => "Water",
            Species::Methanol => "Methanol",
            Species::Glycol => "Propylene Glycol",
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    ///
    /// Values sourced from standard reference data (e.g., NIST).
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::N2 => 28.014,
            Species::O2 => 31.999,
            Species::H2 => 2.016,
            Species::He => 4.003,
            Species::Ar => 39.948,
            Species::CO2 => 44.010,
            Species::CO => 28.010,
            Species::CH4 => 16.043,
            Species::Steam => 18.015,
            Species::NH3 => 17.031,
            Species::Ne => 20.180,
            Species::Xe => 131.293,
            Species::Water => 18.015,
            Species::Methanol => 32.042,
            Species::Glycol => 76.095,
        }
    }

    /// Phase this species occupies over its modeled range.
    pub fn phase(&self) -> Phase {
        match self {
            Species::Water | Species::Methanol | Species::Glycol => Phase::Liquid,
            _ => Phase::Gas,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "HE" | "HELIUM" => Ok(Species::He),
            "AR" | "ARGON" => Ok(Species::Ar),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "CO" | "CARBONMONOXIDE" | "CARBON MONOXIDE" => Ok(Species::CO),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "STEAM" | "WATER VAPOR" | "H2O" => Ok(Species::Steam),
            "NH3" | "AMMONIA" => Ok(Species::NH3),
            "NE" | "NEON" => Ok(Species::Ne),
            "XE" | "XENON" => Ok(Species::Xe),
            "WATER" => Ok(Species::Water),
            "METHANOL" | "CH3OH" => Ok(Species::Methanol),
            "GLYCOL" | "PROPYLENE GLYCOL" => Ok(Species::Glycol),
            _ => Err("unknown species"),
        }
    }
}
