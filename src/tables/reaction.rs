use crate::interpolation::InterpolationScheme;
use crate::tables::EnergyDist;
use crate::utils::reaction_name_from_mt;

//=====================================================================
// Reaction
//
// One reaction channel of a nuclide. The cross section starts at the
// threshold index `ie` into the parent table's energy grid, so
// `sigma.len() == energy.len() - ie`.
//=====================================================================
#[derive(Debug, Clone)]
pub struct Reaction {
    /// ENDF MT number.
    pub mt: u32,
    /// Q value in MeV.
    pub q: f64,
    /// Threshold index into the parent energy grid, 0-based.
    pub ie: usize,
    /// Cross section from the threshold up.
    pub sigma: Vec<f64>,
    /// TYR-style neutron release; energy-dependent fission carries 19.
    pub multiplicity: i32,
    /// Tabulated angular distributions, if the reaction has its own.
    pub angular: Option<AngularDist>,
    /// Secondary-energy distribution, classified at load time.
    pub energy_dist: Option<EnergyDist>,
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reaction(MT={} {})", self.mt, reaction_name_from_mt(self.mt))
    }
}

//=====================================================================
// Tabulated angular distribution
//
// One tabulated (cos, pdf, cdf) triple per incident energy. These
// come from the AND block, where the interpolation code is a pure
// scheme (histogram or lin-lin).
//=====================================================================
#[derive(Debug, Clone)]
pub struct AngularDist {
    pub energy_in: Vec<f64>,
    pub intt: Vec<InterpolationScheme>,
    pub cos: Vec<Vec<f64>>,
    pub pdf: Vec<Vec<f64>>,
    pub cdf: Vec<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_display() {
        let rxn = Reaction {
            mt: 2,
            q: 0.0,
            ie: 0,
            sigma: vec![1.0],
            multiplicity: 1,
            angular: None,
            energy_dist: None,
        };
        assert_eq!(format!("{}", rxn), "Reaction(MT=2 elastic scattering)");
    }
}
