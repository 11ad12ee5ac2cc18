use num_enum::TryFromPrimitive;
use strum_macros::Display;

use crate::interpolation::{resample_clamped, union_sorted};

//=====================================================================
// Secondary-energy distributions
//
// The ACE format describes outgoing-energy data through a handful of
// law codes with wildly different payloads. Classification happens
// once, when the parser hands the table over; the record packer then
// dispatches on the payload tag instead of probing attributes.
//=====================================================================
#[derive(Debug, Clone)]
pub struct EnergyDist {
    /// Raw ACE law code.
    pub law: u32,
    pub data: EnergyDistData,
}

impl std::fmt::Display for EnergyDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match EnergyLaw::try_from(self.law) {
            Ok(law) => write!(f, "EnergyDist(law {} {}, {})", self.law, law, self.data),
            Err(_) => write!(f, "EnergyDist(law {}, {})", self.law, self.data),
        }
    }
}

// ENDF/ACE law codes the classifier recognizes by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, Display)]
#[repr(u32)]
pub enum EnergyLaw {
    LevelScattering = 3,
    ContinuousTabular = 4,
    GeneralEvaporation = 5,
    Maxwell = 7,
    Evaporation = 9,
    Watt = 11,
    KalbachMann = 44,
    TabulatedAngleEnergy = 61,
    NBodyPhaseSpace = 66,
}

#[derive(Debug, Clone)]
pub enum EnergyDistData {
    Tabulated(TabulatedDist),
    JointAngleEnergy(JointAngleEnergyDist),
    Evaporation(EvaporationDist),
    Maxwellian(MaxwellianDist),
    Watt(WattDist),
    Other(OtherDist),
}

impl std::fmt::Display for EnergyDistData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyDistData::Tabulated(d) => write!(f, "{}", d),
            EnergyDistData::JointAngleEnergy(d) => write!(f, "{}", d),
            EnergyDistData::Evaporation(d) => write!(f, "{}", d),
            EnergyDistData::Maxwellian(d) => write!(f, "{}", d),
            EnergyDistData::Watt(d) => write!(f, "{}", d),
            EnergyDistData::Other(d) => write!(f, "{}", d),
        }
    }
}

impl EnergyDistData {
    /// Incident-energy axis, when the payload carries one. For the
    /// Watt payload this is the derived union of the a and b axes.
    pub fn energy_in(&self) -> Option<&[f64]> {
        match self {
            EnergyDistData::Tabulated(d) => Some(&d.energy_in),
            EnergyDistData::JointAngleEnergy(d) => Some(&d.energy_in),
            EnergyDistData::Evaporation(d) => Some(&d.energy_in),
            EnergyDistData::Maxwellian(d) => Some(&d.energy_in),
            EnergyDistData::Watt(d) => Some(&d.energy_in),
            EnergyDistData::Other(d) => d.energy_in.as_deref(),
        }
    }
}

//=====================================================================
// Tabulated outgoing-energy distribution (laws 4 and 44)
//
// One (energy_out, pdf, cdf) triple per incident energy. Law 44
// additionally carries precompound fractions and angular parameters.
// The intt codes are raw DLW values: they may fold a discrete line
// count into the tens digit, so they are not pure schemes.
//=====================================================================
#[derive(Debug, Clone)]
pub struct TabulatedDist {
    pub energy_in: Vec<f64>,
    pub intt: Option<Vec<u32>>,
    pub energy_out: Vec<Vec<f64>>,
    pub pdf: Vec<Vec<f64>>,
    pub cdf: Vec<Vec<f64>>,
    /// Law-44 precompound fractions.
    pub frac: Option<Vec<Vec<f64>>>,
    /// Law-44 angular parameters.
    pub ang: Option<Vec<Vec<f64>>>,
}

impl std::fmt::Display for TabulatedDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tabulated({} incident energies)", self.energy_in.len())
    }
}

//=====================================================================
// Joint angle-energy distribution (law 61)
//
// A tabulated outgoing-energy distribution where every outgoing
// energy carries its own tabulated angular distribution.
//=====================================================================
#[derive(Debug, Clone)]
pub struct JointAngleEnergyDist {
    pub energy_in: Vec<f64>,
    pub intt: Option<Vec<u32>>,
    pub energy_out: Vec<Vec<f64>>,
    pub pdf: Vec<Vec<f64>>,
    pub cdf: Vec<Vec<f64>>,
    /// Interpolation codes of the per-outgoing-energy angle tables.
    pub a_dist_intt: Option<Vec<Vec<u32>>>,
    pub a_dist_mu_out: Vec<Vec<Vec<f64>>>,
    pub a_dist_pdf: Vec<Vec<Vec<f64>>>,
    pub a_dist_cdf: Vec<Vec<Vec<f64>>>,
}

impl std::fmt::Display for JointAngleEnergyDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JointAngleEnergy({} incident energies)", self.energy_in.len())
    }
}

// Evaporation spectrum with tabulated nuclear temperature (law 9)
#[derive(Debug, Clone)]
pub struct EvaporationDist {
    pub energy_in: Vec<f64>,
    pub intt: Option<Vec<u32>>,
    pub t: Vec<f64>,
    /// Restriction energy.
    pub u: f64,
}

impl std::fmt::Display for EvaporationDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Evaporation({} incident energies)", self.energy_in.len())
    }
}

// Maxwellian fission spectrum with tabulated temperature (law 7)
#[derive(Debug, Clone)]
pub struct MaxwellianDist {
    pub energy_in: Vec<f64>,
    pub intt: Option<Vec<u32>>,
    pub t: Vec<f64>,
    pub u: f64,
}

impl std::fmt::Display for MaxwellianDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Maxwellian({} incident energies)", self.energy_in.len())
    }
}

//=====================================================================
// Energy-dependent Watt spectrum (law 11)
//
// The a and b parameters arrive on their own incident-energy axes,
// which may differ. Both are resampled once, at construction, onto
// the union of the two axes so the packer can bracket a single grid.
//=====================================================================
#[derive(Debug, Clone)]
pub struct WattDist {
    /// Original a(E) axis, kept for grid unionization.
    pub energya_in: Vec<f64>,
    /// Original b(E) axis, kept for grid unionization.
    pub energyb_in: Vec<f64>,
    /// Union of the two axes.
    pub energy_in: Vec<f64>,
    /// a resampled onto `energy_in`.
    pub a: Vec<f64>,
    /// b resampled onto `energy_in`.
    pub b: Vec<f64>,
    pub u: f64,
}

impl WattDist {
    pub fn new(
        energya_in: Vec<f64>,
        a: Vec<f64>,
        energyb_in: Vec<f64>,
        b: Vec<f64>,
        u: f64,
    ) -> Self {
        let energy_in = union_sorted(&energya_in, &energyb_in);
        let a_union = resample_clamped(&energy_in, &energya_in, &a);
        let b_union = resample_clamped(&energy_in, &energyb_in, &b);
        Self {
            energya_in,
            energyb_in,
            energy_in,
            a: a_union,
            b: b_union,
            u,
        }
    }
}

impl std::fmt::Display for WattDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Watt({} incident energies)", self.energy_in.len())
    }
}

// Law the packer has no sampling payload for, e.g. N-body phase space
#[derive(Debug, Clone)]
pub struct OtherDist {
    pub energy_in: Option<Vec<f64>>,
}

impl std::fmt::Display for OtherDist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Other")
    }
}
