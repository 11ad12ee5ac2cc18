use std::collections::BTreeMap;

use crate::interpolation::InterpolationScheme;
use crate::tables::Reaction;

//=====================================================================
// Nuclide table
//
// One nuclide at one temperature, as handed over by the ACE parser.
// The preparation pipeline never mutates a table; everything past the
// load phase works on shared references into it.
//=====================================================================
#[derive(Debug, Clone, Default)]
pub struct NuclideTable {
    /// Identifier as it appears in the xsdir, e.g. "92235.70c".
    pub name: String,
    /// Atomic weight ratio relative to the neutron mass.
    pub awr: f64,
    /// Temperature of the evaluation.
    pub temp: f64,
    /// Principal energy grid, strictly increasing.
    pub energy: Vec<f64>,
    /// Total cross section on the principal grid.
    pub sigma_t: Vec<f64>,
    /// Reactions keyed by MT number. A BTreeMap fixes ascending-MT
    /// iteration so downstream column assignment is reproducible.
    pub reactions: BTreeMap<u32, Reaction>,
    /// Total neutrons per fission, if the nuclide is fissile.
    pub nu_t: Option<NuTable>,
    /// Delayed neutrons per fission.
    pub nu_d: Option<NuTable>,
    /// Prompt neutrons per fission.
    pub nu_p: Option<NuTable>,
    /// Outgoing-energy distributions for the delayed-neutron precursor
    /// groups, each bracketed by a lower and an upper tabulated
    /// distribution. Empty for non-fissile nuclides.
    pub nu_d_energy_dist: Vec<PrecursorDist>,
    /// Precursor group probabilities, one [lower, upper] pair per group.
    pub nu_d_precursor_prob: Vec<[f64; 2]>,
}

impl NuclideTable {
    /// Lowest energy at which a reaction has a non-zero cross section.
    pub fn reaction_threshold(&self, rxn: &Reaction) -> f64 {
        self.energy[rxn.ie]
    }
}

impl std::fmt::Display for NuclideTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NuclideTable({}, awr={}, {} energies, {} reactions)",
            self.name,
            self.awr,
            self.energy.len(),
            self.reactions.len()
        )
    }
}

//=====================================================================
// Nu tables
//
// Tabulated neutrons-per-fission values. The ENDF interpolation code
// is either one scheme for the whole table or one per grid point.
//=====================================================================
#[derive(Debug, Clone)]
pub struct NuTable {
    pub energy: Vec<f64>,
    pub value: Vec<f64>,
    pub int: NuInterp,
}

#[derive(Debug, Clone)]
pub enum NuInterp {
    Scalar(InterpolationScheme),
    PerPoint(Vec<InterpolationScheme>),
}

impl NuInterp {
    /// Interpolation codes at a (lower, upper) bracket.
    pub fn bracket_codes(&self, lower: usize, upper: usize) -> (u32, u32) {
        match self {
            NuInterp::Scalar(s) => (*s as u32, *s as u32),
            NuInterp::PerPoint(v) => (v[lower] as u32, v[upper] as u32),
        }
    }
}

//=====================================================================
// Precursor group distributions
//
// Each delayed-neutron precursor group carries two tabulated
// outgoing-energy distributions bracketing the incident energy. The
// intt fields are raw DLW-style codes (they may fold in a discrete
// line count), so they stay numeric rather than typed schemes.
//=====================================================================
#[derive(Debug, Clone)]
pub struct PrecursorDist {
    pub law: u32,
    pub intt: [u32; 2],
    pub energy_out: [Vec<f64>; 2],
    pub pdf: [Vec<f64>; 2],
    pub cdf: [Vec<f64>; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::InterpolationScheme;

    #[test]
    fn test_nu_interp_scalar() {
        let int = NuInterp::Scalar(InterpolationScheme::LinLin);
        assert_eq!(int.bracket_codes(0, 1), (2, 2));
        assert_eq!(int.bracket_codes(4, 5), (2, 2));
    }

    #[test]
    fn test_nu_interp_per_point() {
        let int = NuInterp::PerPoint(vec![
            InterpolationScheme::Histogram,
            InterpolationScheme::LinLin,
            InterpolationScheme::LogLog,
        ]);
        assert_eq!(int.bracket_codes(0, 1), (1, 2));
        assert_eq!(int.bracket_codes(1, 2), (2, 5));
    }
}
