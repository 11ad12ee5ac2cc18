use crate::api::cross_section_data::CrossSectionData;
use crate::error::PrepError;
use crate::tables::{
    AngularDist, EnergyDist, EnergyDistData, JointAngleEnergyDist, NuclideTable, Reaction,
};
use crate::utils::to_f32;

//=====================================================================
// Packed distribution records
//
// For every (grid row, reaction column) pair the packer emits one
// scatter record and one energy record of a fixed 15-field shape:
// the lower and upper tabulated distributions bracketing the row's
// energy, plus the next row index at which the bracket changes. The
// downstream sampling kernels consume these buffers verbatim, so the
// layout and the index conventions here are load-bearing.
//
// The len fields are vectors because the fission branch stores the
// interpolated (nu_total, nu_delayed) pair there; everywhere else
// they hold a single element with the payload length.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct DistRecord {
    pub lower_erg: f32,
    pub lower_len: Vec<f32>,
    pub lower_law: f32,
    pub lower_intt: f32,
    pub lower_var: Vec<f32>,
    pub lower_pdf: Vec<f32>,
    pub lower_cdf: Vec<f32>,
    pub upper_erg: f32,
    pub upper_len: Vec<f32>,
    pub upper_law: f32,
    pub upper_intt: f32,
    pub upper_var: Vec<f32>,
    pub upper_pdf: Vec<f32>,
    pub upper_cdf: Vec<f32>,
    pub next_dex: u32,
}

impl DistRecord {
    /// Below-threshold record: everything zero apart from the law
    /// marker and the row where data begins.
    fn zeroed(law: f32, next_dex: u32) -> Self {
        Self {
            lower_erg: 0.0,
            lower_len: vec![0.0],
            lower_law: law,
            lower_intt: 0.0,
            lower_var: vec![0.0],
            lower_pdf: vec![0.0],
            lower_cdf: vec![0.0],
            upper_erg: 0.0,
            upper_len: vec![0.0],
            upper_law: law,
            upper_intt: 0.0,
            upper_var: vec![0.0],
            upper_pdf: vec![0.0],
            upper_cdf: vec![0.0],
            next_dex,
        }
    }
}

//=====================================================================
// Bracketing
//
// The bracket of E on an axis is the pair of adjacent indices with
// axis[lower] <= E < axis[upper], found as the smallest index whose
// energy exceeds E. At or past the last point both indices clamp to
// the end of the axis.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bracket {
    Below,
    Inside { lower: usize, upper: usize },
    Above { last: usize },
}

fn bracket(axis: &[f64], energy: f64) -> Bracket {
    let upper = axis.partition_point(|&e| e <= energy);
    if upper == 0 {
        Bracket::Below
    } else if upper == axis.len() {
        Bracket::Above { last: axis.len() - 1 }
    } else {
        Bracket::Inside { lower: upper - 1, upper }
    }
}

impl Bracket {
    /// (lower, upper, above_last); the caller has ruled out Below.
    fn clamped(self) -> (usize, usize, bool) {
        match self {
            Bracket::Inside { lower, upper } => (lower, upper, false),
            Bracket::Above { last } => (last, last, true),
            Bracket::Below => panic!("below-threshold bracket reached the data path"),
        }
    }
}

impl CrossSectionData {
    /// Scatter record for the reaction at `col`, bracketing the grid
    /// energy at `row`.
    pub fn scatter_record(&self, row: usize, col: usize) -> Result<DistRecord, PrepError> {
        let (tope, table, mt, rxn) = self.column_reaction(col);

        // fission first: nu and precursor data stand in for the
        // scattering distribution
        if table.nu_t.is_some() && rxn.multiplicity > 10 {
            return Ok(self.fission_scatter_record(row, table, rxn));
        }
        if let Some(ang) = &rxn.angular {
            return Ok(self.angular_scatter_record(row, table, rxn, ang));
        }
        if let Some(dist) = &rxn.energy_dist {
            if let EnergyDistData::JointAngleEnergy(joint) = &dist.data {
                return self.joint_scatter_record(row, col, tope, mt, table, rxn, dist.law, joint);
            }
            if dist.data.energy_in().is_some() {
                return Ok(self.energy_dist_scatter_record(row, table, rxn, dist));
            }
        }
        Ok(self.isotropic_fallback_record(rxn))
    }

    /// Energy record for the reaction at `col`. Only distributions
    /// with an incident axis carry data; everything else gets the
    /// length-1 zero fallback.
    pub fn energy_record(&self, row: usize, col: usize) -> Result<DistRecord, PrepError> {
        let (tope, table, mt, rxn) = self.column_reaction(col);
        let this_e = self.grid[row];
        let e_u = self.grid.len();

        let Some(dist) = &rxn.energy_dist else {
            return Ok(self.energy_fallback_record(0.0));
        };
        let Some(energy_in) = dist.data.energy_in() else {
            return Ok(self.energy_fallback_record(dist.law as f32));
        };

        let b = bracket(energy_in, this_e);
        if b == Bracket::Below {
            let next_dex = self.threshold_dex(table, rxn, energy_in[0]);
            return Ok(DistRecord::zeroed(0.0, next_dex));
        }
        let (lo, hi, above) = b.clamped();

        let (lower_intt, upper_intt) = intt_pair(dist, lo, hi);

        let (lower_var, lower_cdf, lower_pdf, upper_var, upper_cdf, upper_pdf) = match &dist.data {
            // tabulated spectra copy through as-is
            EnergyDistData::Tabulated(t) => (
                to_f32(&t.energy_out[lo]),
                to_f32(&t.cdf[lo]),
                to_f32(&t.pdf[lo]),
                to_f32(&t.energy_out[hi]),
                to_f32(&t.cdf[hi]),
                to_f32(&t.pdf[hi]),
            ),
            EnergyDistData::JointAngleEnergy(j) => (
                to_f32(&j.energy_out[lo]),
                to_f32(&j.cdf[lo]),
                to_f32(&j.pdf[lo]),
                to_f32(&j.energy_out[hi]),
                to_f32(&j.cdf[hi]),
                to_f32(&j.pdf[hi]),
            ),
            // evaporation-style: nuclear temperature and restriction
            EnergyDistData::Evaporation(d) => (
                vec![d.t[lo] as f32],
                vec![d.u as f32],
                vec![0.0],
                vec![d.t[hi] as f32],
                vec![d.u as f32],
                vec![0.0],
            ),
            EnergyDistData::Maxwellian(d) => (
                vec![d.t[lo] as f32],
                vec![d.u as f32],
                vec![0.0],
                vec![d.t[hi] as f32],
                vec![d.u as f32],
                vec![0.0],
            ),
            // energy-dependent Watt, a and b already on the union axis
            EnergyDistData::Watt(w) => (
                vec![w.a[lo] as f32],
                vec![w.b[lo] as f32],
                vec![w.u as f32],
                vec![w.a[hi] as f32],
                vec![w.b[hi] as f32],
                vec![w.u as f32],
            ),
            EnergyDistData::Other(_) => {
                return Err(PrepError::UnhandledEnergyDist {
                    law: dist.law,
                    nuclide: tope,
                    mt,
                    row,
                    col,
                });
            }
        };

        let next_dex = if above {
            e_u as u32
        } else {
            self.grid.first_at_or_above(energy_in[hi]) as u32
        };

        Ok(DistRecord {
            lower_erg: energy_in[lo] as f32,
            lower_len: vec![lower_var.len() as f32],
            lower_law: dist.law as f32,
            lower_intt,
            lower_var,
            lower_pdf,
            lower_cdf,
            upper_erg: energy_in[hi] as f32,
            upper_len: vec![upper_var.len() as f32],
            upper_law: dist.law as f32,
            upper_intt,
            upper_var,
            upper_pdf,
            upper_cdf,
            next_dex,
        })
    }

    //-----------------------------------------------------------------
    // Scatter branches
    //-----------------------------------------------------------------

    // Fission: the record carries interpolated nu values, cumulative
    // precursor probabilities, and the six precursor spectra muxed
    // into one buffer.
    fn fission_scatter_record(
        &self,
        row: usize,
        table: &NuclideTable,
        rxn: &Reaction,
    ) -> DistRecord {
        let this_e = self.grid[row];
        let e_u = self.grid.len();
        let nu_t = table.nu_t.as_ref().expect("fission branch requires total nu");
        let nu_d = table.nu_d.as_ref().expect("fission table without delayed nu");
        let nu_p = table.nu_p.as_ref().expect("fission table without prompt nu");

        let bt = bracket(&nu_t.energy, this_e);
        let bd = bracket(&nu_d.energy, this_e);

        if bt == Bracket::Below || bd == Bracket::Below {
            let threshold = table
                .reaction_threshold(rxn)
                .max(nu_t.energy[0])
                .max(nu_d.energy[0]);
            let next_dex = self.grid.first_at_or_above(threshold) as u32;
            return DistRecord::zeroed(0.0, next_dex);
        }
        let (t_lo, t_hi, above_t) = bt.clamped();
        let (d_lo, d_hi, above_d) = bd.clamped();

        let lower_nu_t_grid = nu_t.value[t_lo];
        let upper_nu_t_grid = nu_t.value[t_hi];
        let lower_nu_d_grid = nu_d.value[d_lo];
        let upper_nu_d_grid = nu_d.value[d_hi];
        let lower_e_t = nu_t.energy[t_lo];
        let upper_e_t = nu_t.energy[t_hi];
        let lower_e_d = nu_d.energy[d_lo];
        let upper_e_d = nu_d.energy[d_hi];

        // Interpolation codes. The delayed digit comes from the prompt
        // nu table, and per-point total codes follow the delayed
        // bracket; both are source conventions kept for the decoder
        // (see DESIGN.md). Precursor codes are taken from group 0 as
        // representative of all six.
        let (lower_nu_d_intt, upper_nu_d_intt) = nu_p.int.bracket_codes(d_lo, d_hi);
        let (lower_nu_t_intt, upper_nu_t_intt) = nu_t.int.bracket_codes(d_lo, d_hi);
        let group0 = &table.nu_d_energy_dist[0];
        let lower_intt =
            lower_nu_t_intt + lower_nu_d_intt * 10 + group0.intt[0] * 100 + group0.law * 1000;
        let upper_intt =
            upper_nu_t_intt + upper_nu_d_intt * 10 + group0.intt[1] * 100 + group0.law * 1000;

        // narrowest overlap of the two brackets
        let lower_erg = lower_e_t.max(lower_e_d);
        let upper_erg = upper_e_t.min(upper_e_d);

        // evaluate nu on that interval, holding the last tabulated
        // value once an axis is exhausted
        let (lower_nu_t, upper_nu_t) = if above_t {
            (upper_nu_t_grid, upper_nu_t_grid)
        } else {
            let slope = (upper_nu_t_grid - lower_nu_t_grid) / (upper_e_t - lower_e_t);
            (
                lower_nu_t_grid + (lower_erg - lower_e_t) * slope,
                lower_nu_t_grid + (upper_erg - lower_e_t) * slope,
            )
        };
        let (lower_nu_d, upper_nu_d) = if above_d {
            (upper_nu_d_grid, upper_nu_d_grid)
        } else {
            let slope = (upper_nu_d_grid - lower_nu_d_grid) / (upper_e_d - lower_e_d);
            (
                lower_nu_d_grid + (lower_erg - lower_e_d) * slope,
                lower_nu_d_grid + (upper_erg - lower_e_d) * slope,
            )
        };

        // cumulative precursor probabilities
        let mut acc = 0.0;
        let lower_var: Vec<f32> = table
            .nu_d_precursor_prob
            .iter()
            .map(|p| {
                acc += p[0];
                acc as f32
            })
            .collect();
        let mut acc = 0.0;
        let upper_var: Vec<f32> = table
            .nu_d_precursor_prob
            .iter()
            .map(|p| {
                acc += p[1];
                acc as f32
            })
            .collect();

        // mux the six groups: outgoing energies first, recording the
        // cumulative section offsets, then the cdfs, then the pdfs
        let mux_side = |side: usize| -> (Vec<f32>, Vec<f32>) {
            let mut cdf: Vec<f32> = Vec::new();
            let mut pdf: Vec<f32> = vec![0.0];
            for group in &table.nu_d_energy_dist {
                cdf.extend(group.energy_out[side].iter().map(|&v| v as f32));
                pdf.push(cdf.len() as f32);
            }
            for group in &table.nu_d_energy_dist {
                cdf.extend(group.cdf[side].iter().map(|&v| v as f32));
            }
            for group in &table.nu_d_energy_dist {
                cdf.extend(group.pdf[side].iter().map(|&v| v as f32));
            }
            (cdf, pdf)
        };
        let (lower_cdf, lower_pdf) = mux_side(0);
        let (upper_cdf, upper_pdf) = mux_side(1);

        let next_dex = if above_t && above_d {
            e_u
        } else {
            self.grid.first_at_or_above(upper_erg)
        };
        // one exhausted nu axis would otherwise stall a consumer
        // sweeping on next_dex
        let next_dex = next_dex.max(row + 1) as u32;

        DistRecord {
            lower_erg: lower_erg as f32,
            lower_len: vec![lower_nu_t as f32, lower_nu_d as f32],
            lower_law: -1.0,
            lower_intt: lower_intt as f32,
            lower_var,
            lower_pdf,
            lower_cdf,
            upper_erg: upper_erg as f32,
            upper_len: vec![upper_nu_t as f32, upper_nu_d as f32],
            upper_law: -1.0,
            upper_intt: upper_intt as f32,
            upper_var,
            upper_pdf,
            upper_cdf,
            next_dex,
        }
    }

    // Tabulated angular distribution (law 3): copy the bracketing
    // (cos, pdf, cdf) tables through.
    fn angular_scatter_record(
        &self,
        row: usize,
        table: &NuclideTable,
        rxn: &Reaction,
        ang: &AngularDist,
    ) -> DistRecord {
        let this_e = self.grid[row];
        let e_u = self.grid.len();

        let b = bracket(&ang.energy_in, this_e);
        if b == Bracket::Below {
            let next_dex = self.threshold_dex(table, rxn, ang.energy_in[0]);
            return DistRecord::zeroed(-2.0, next_dex);
        }
        let (lo, hi, above) = b.clamped();

        let mut lower_law = 3.0;
        let mut upper_law = 3.0;
        let lower_var = to_f32(&ang.cos[lo]);
        let upper_var = to_f32(&ang.cos[hi]);
        let lower_cdf = to_f32(&ang.cdf[lo]);
        let upper_cdf = to_f32(&ang.cdf[hi]);

        // Basically-isotropic short tables are marked law 0 so the
        // sampler can skip them; three-point cdfs round off badly in
        // single precision.
        if ang.cos[lo].len() == 3 && (ang.cdf[lo][1] - 0.5).abs() <= self.isotropic_tol {
            lower_law = 0.0;
        }
        if ang.cos[hi].len() == 3 && (ang.cdf[hi][1] - 0.5).abs() <= self.isotropic_tol {
            upper_law = 0.0;
        }

        let next_dex = if above {
            e_u as u32
        } else {
            self.grid.first_at_or_above(ang.energy_in[hi]) as u32
        };

        DistRecord {
            lower_erg: ang.energy_in[lo] as f32,
            lower_len: vec![lower_var.len() as f32],
            lower_law,
            lower_intt: ang.intt[lo] as u32 as f32,
            lower_var,
            lower_pdf: to_f32(&ang.pdf[lo]),
            lower_cdf,
            upper_erg: ang.energy_in[hi] as f32,
            upper_len: vec![upper_var.len() as f32],
            upper_law,
            upper_intt: ang.intt[hi] as u32 as f32,
            upper_var,
            upper_pdf: to_f32(&ang.pdf[hi]),
            upper_cdf,
            next_dex,
        }
    }

    // Joint angle-energy (law 61): flatten the per-outgoing-energy
    // angle tables into one buffer per side. The var field is a zero
    // sentinel; sampling picks the sub-distribution through the
    // energy record.
    #[allow(clippy::too_many_arguments)]
    fn joint_scatter_record(
        &self,
        row: usize,
        col: usize,
        tope: usize,
        mt: u32,
        table: &NuclideTable,
        rxn: &Reaction,
        law: u32,
        joint: &JointAngleEnergyDist,
    ) -> Result<DistRecord, PrepError> {
        let this_e = self.grid[row];
        let e_u = self.grid.len();

        let b = bracket(&joint.energy_in, this_e);
        if b == Bracket::Below {
            let next_dex = self.threshold_dex(table, rxn, joint.energy_in[0]);
            return Ok(DistRecord::zeroed(-2.0, next_dex));
        }
        let (lo, hi, above) = b.clamped();

        for idx in [lo, hi] {
            if joint.a_dist_mu_out[idx].len() != joint.energy_out[idx].len() {
                return Err(PrepError::LengthMismatch {
                    nuclide: tope,
                    mt,
                    row,
                    col,
                    mu_len: joint.a_dist_mu_out[idx].len(),
                    e_out_len: joint.energy_out[idx].len(),
                });
            }
        }

        let intt_of = |idx: usize| match &joint.a_dist_intt {
            Some(intt) => intt[idx][0] as f32,
            None => 2.0,
        };

        // mu values first with their cumulative offsets, then the
        // cdf sections, then the pdf sections
        let mux_side = |idx: usize| -> (Vec<f32>, Vec<f32>) {
            let mut cdf: Vec<f32> = Vec::new();
            let mut pdf: Vec<f32> = vec![0.0];
            for sub in &joint.a_dist_mu_out[idx] {
                cdf.extend(sub.iter().map(|&v| v as f32));
                pdf.push(cdf.len() as f32);
            }
            for sub in &joint.a_dist_cdf[idx] {
                cdf.extend(sub.iter().map(|&v| v as f32));
            }
            for sub in &joint.a_dist_pdf[idx] {
                cdf.extend(sub.iter().map(|&v| v as f32));
            }
            (cdf, pdf)
        };
        let (lower_cdf, lower_pdf) = mux_side(lo);
        let (upper_cdf, upper_pdf) = mux_side(hi);

        let next_dex = if above {
            e_u as u32
        } else {
            self.grid.first_at_or_above(joint.energy_in[hi]) as u32
        };

        Ok(DistRecord {
            lower_erg: joint.energy_in[lo] as f32,
            lower_len: vec![(lower_cdf.len() / 3) as f32],
            lower_law: law as f32,
            lower_intt: intt_of(lo),
            lower_var: vec![0.0],
            lower_pdf,
            lower_cdf,
            upper_erg: joint.energy_in[hi] as f32,
            upper_len: vec![(upper_cdf.len() / 3) as f32],
            upper_law: law as f32,
            upper_intt: intt_of(hi),
            upper_var: vec![0.0],
            upper_pdf,
            upper_cdf,
            next_dex,
        })
    }

    // Everything angular lives in the energy distribution: the
    // scatter record only carries law-44 fractions and angular
    // parameters when present, zero-shapes otherwise.
    fn energy_dist_scatter_record(
        &self,
        row: usize,
        table: &NuclideTable,
        rxn: &Reaction,
        dist: &EnergyDist,
    ) -> DistRecord {
        let this_e = self.grid[row];
        let e_u = self.grid.len();
        let energy_in = dist.data.energy_in().expect("checked by the dispatcher");

        let b = bracket(energy_in, this_e);
        if b == Bracket::Below {
            let next_dex = self.threshold_dex(table, rxn, energy_in[0]);
            return DistRecord::zeroed(-2.0, next_dex);
        }
        let (lo, hi, above) = b.clamped();

        let (lower_intt, upper_intt) = intt_pair(dist, lo, hi);

        let (lower_var, lower_cdf, lower_pdf, upper_var, upper_cdf, upper_pdf) = match &dist.data {
            EnergyDistData::Tabulated(t) => {
                let var = |i: usize| match &t.ang {
                    Some(ang) => to_f32(&ang[i]),
                    None => vec![0.0],
                };
                let cdf = |i: usize| match &t.frac {
                    Some(frac) => to_f32(&frac[i]),
                    None => vec![0.0; t.cdf[i].len()],
                };
                let pdf = |i: usize| vec![0.0; t.pdf[i].len()];
                (var(lo), cdf(lo), pdf(lo), var(hi), cdf(hi), pdf(hi))
            }
            // parametric spectra have nothing angular to offer
            _ => (
                vec![0.0],
                vec![0.0],
                vec![0.0],
                vec![0.0],
                vec![0.0],
                vec![0.0],
            ),
        };

        let next_dex = if above {
            e_u as u32
        } else {
            self.grid.first_at_or_above(energy_in[hi]) as u32
        };

        DistRecord {
            lower_erg: energy_in[lo] as f32,
            lower_len: vec![lower_var.len() as f32],
            lower_law: dist.law as f32,
            lower_intt,
            lower_var,
            lower_pdf,
            lower_cdf,
            upper_erg: energy_in[hi] as f32,
            upper_len: vec![upper_var.len() as f32],
            upper_law: dist.law as f32,
            upper_intt,
            upper_var,
            upper_pdf,
            upper_cdf,
            next_dex,
        }
    }

    // No distributions at all: a flat isotropic table spanning the
    // whole grid.
    fn isotropic_fallback_record(&self, rxn: &Reaction) -> DistRecord {
        let law = rxn.energy_dist.as_ref().map_or(0.0, |d| d.law as f32);
        DistRecord {
            lower_erg: self.grid[0] as f32,
            lower_len: vec![3.0],
            lower_law: law,
            lower_intt: 1.0,
            lower_var: vec![-1.0, 0.0, 1.0],
            lower_pdf: vec![0.5, 0.5, 0.5],
            lower_cdf: vec![0.0, 0.5, 1.0],
            upper_erg: self.grid[self.grid.len() - 1] as f32,
            upper_len: vec![3.0],
            upper_law: law,
            upper_intt: 1.0,
            upper_var: vec![-1.0, 0.0, 1.0],
            upper_pdf: vec![0.5, 0.5, 0.5],
            upper_cdf: vec![0.0, 0.5, 1.0],
            next_dex: self.grid.len() as u32,
        }
    }

    // Energy-record fallback: length-1 zero vectors spanning the grid.
    fn energy_fallback_record(&self, law: f32) -> DistRecord {
        DistRecord {
            lower_erg: self.grid[0] as f32,
            lower_len: vec![1.0],
            lower_law: law,
            lower_intt: 1.0,
            lower_var: vec![0.0],
            lower_pdf: vec![0.0],
            lower_cdf: vec![0.0],
            upper_erg: self.grid[self.grid.len() - 1] as f32,
            upper_len: vec![1.0],
            upper_law: law,
            upper_intt: 1.0,
            upper_var: vec![0.0],
            upper_pdf: vec![0.0],
            upper_cdf: vec![0.0],
            next_dex: self.grid.len() as u32,
        }
    }

    //-----------------------------------------------------------------
    // Shared plumbing
    //-----------------------------------------------------------------

    // Which reaction a column refers to. Only reaction columns have
    // records; the first N columns are the totals.
    fn column_reaction(&self, col: usize) -> (usize, &NuclideTable, u32, &Reaction) {
        let n = self.catalog.num_isotopes;
        assert!(
            col >= n && col < n + self.catalog.num_reactions,
            "records exist only for reaction columns, got column {}",
            col
        );
        let tope = self.catalog.isotope_of_column(col);
        let table = &self.material.tables()[tope];
        let mt = self.catalog.reaction_numbers[col];
        let rxn = &table.reactions[&mt];
        (tope, table, mt, rxn)
    }

    // First row at or above where the distribution has data: the
    // larger of the reaction threshold and the axis start.
    fn threshold_dex(&self, table: &NuclideTable, rxn: &Reaction, axis_first: f64) -> u32 {
        let threshold = table.reaction_threshold(rxn).max(axis_first);
        self.grid.first_at_or_above(threshold) as u32
    }
}

// Per-point interpolation codes at the bracket, defaulting to lin-lin
// when the payload has none.
fn intt_pair(dist: &EnergyDist, lo: usize, hi: usize) -> (f32, f32) {
    let from = |intt: &Option<Vec<u32>>| match intt {
        Some(v) => (v[lo] as f32, v[hi] as f32),
        None => (2.0, 2.0),
    };
    match &dist.data {
        EnergyDistData::Tabulated(t) => from(&t.intt),
        EnergyDistData::JointAngleEnergy(j) => from(&j.intt),
        EnergyDistData::Evaporation(d) => from(&d.intt),
        EnergyDistData::Maxwellian(d) => from(&d.intt),
        EnergyDistData::Watt(_) | EnergyDistData::Other(_) => (2.0, 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::utils::testing::{
        angular_threshold_table, elastic_table, elastic_table_with_mids, evap_table,
        evap_threshold_table, fissile_table, fissile_table_nu_floor, kalbach_table,
        law61_mismatch_table, law61_table, level_table, maxwell_table, other_law_table, prepared,
        shared_prepared_data, tabulated_table, threshold_table, watt_table,
    };

    fn zero_vecs(record: &DistRecord) -> bool {
        [
            &record.lower_len,
            &record.lower_var,
            &record.lower_pdf,
            &record.lower_cdf,
            &record.upper_len,
            &record.upper_var,
            &record.upper_pdf,
            &record.upper_cdf,
        ]
        .iter()
        .all(|v| **v == vec![0.0])
    }

    #[test]
    fn test_bracketing() {
        let axis = [1.0, 2.0, 4.0];
        assert_eq!(bracket(&axis, 0.5), Bracket::Below);
        assert_eq!(bracket(&axis, 1.0), Bracket::Inside { lower: 0, upper: 1 });
        assert_eq!(bracket(&axis, 3.0), Bracket::Inside { lower: 1, upper: 2 });
        assert_eq!(bracket(&axis, 4.0), Bracket::Above { last: 2 });
        assert_eq!(bracket(&axis, 9.0), Bracket::Above { last: 2 });
    }

    //-----------------------------------------------------------------
    // B1: fission
    //-----------------------------------------------------------------
    #[test]
    fn test_fission_record_interior() {
        let data = prepared(vec![fissile_table("92235.70c")]);
        // grid [1,2,4]; col 1 is MT 18
        let record = data.scatter_record(1, 1).unwrap();

        assert_eq!(record.lower_law, -1.0);
        assert_eq!(record.upper_law, -1.0);
        // nu_t lin-lin (2), delayed digit from prompt histogram (1),
        // precursor intt 2, precursor law 4
        assert_eq!(record.lower_intt, 4212.0);
        assert_eq!(record.upper_intt, 4212.0);
        // narrowest interval is [2,4] on both axes
        assert_eq!(record.lower_erg, 2.0);
        assert_eq!(record.upper_erg, 4.0);
        // interpolated (nu_t, nu_d) pairs in the len fields
        assert_abs_diff_eq!(record.lower_len[0], 2.6);
        assert_abs_diff_eq!(record.lower_len[1], 0.04);
        assert_abs_diff_eq!(record.upper_len[0], 3.0);
        assert_abs_diff_eq!(record.upper_len[1], 0.08);
        // cumulative precursor probabilities
        assert_eq!(record.lower_var, vec![0.2, 0.4, 0.6, 0.8, 0.9, 1.0]);
        assert_abs_diff_eq!(record.upper_var[5], 1.0);
        // mux: 6 groups x 2 outgoing energies, then cdfs, then pdfs
        assert_eq!(record.lower_cdf.len(), 36);
        assert_eq!(record.lower_pdf, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        // group 0 energies lead the mux
        assert_eq!(&record.lower_cdf[..2], &[0.1, 0.2]);
        assert_eq!(record.next_dex, 2);
    }

    #[test]
    fn test_fission_record_above_last() {
        let data = prepared(vec![fissile_table("92235.70c")]);
        let record = data.scatter_record(2, 1).unwrap();

        // both axes exhausted: hold the last nu values, point past
        // the end of the grid
        assert_abs_diff_eq!(record.lower_len[0], 3.0);
        assert_abs_diff_eq!(record.lower_len[1], 0.08);
        assert_eq!(record.lower_erg, 4.0);
        assert_eq!(record.upper_erg, 4.0);
        assert_eq!(record.next_dex, 3);
    }

    #[test]
    fn test_fission_record_below_nu_grid() {
        let data = prepared(vec![fissile_table_nu_floor("92235.70c")]);
        // nu axes start at 2.0; row 0 is E=1
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 0.0);
        assert_eq!(record.upper_law, 0.0);
        assert!(zero_vecs(&record));
        assert_eq!(record.next_dex, 1);
    }

    //-----------------------------------------------------------------
    // B2: tabulated angular
    //-----------------------------------------------------------------
    #[test]
    fn test_angular_record() {
        let data = prepared(vec![elastic_table("1001.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        // lower cdf is exactly isotropic, upper is off by 2e-4
        assert_eq!(record.lower_law, 0.0);
        assert_eq!(record.upper_law, 3.0);
        assert_eq!(record.lower_intt, 2.0);
        assert_eq!(record.lower_erg, 1.0);
        assert_eq!(record.upper_erg, 4.0);
        assert_eq!(record.lower_var, vec![-1.0, 0.0, 1.0]);
        assert_eq!(record.lower_cdf, vec![0.0, 0.5, 1.0]);
        assert_eq!(record.lower_len, vec![3.0]);
        assert_eq!(record.next_dex, 2);
    }

    #[test]
    fn test_isotropy_tolerance_knob() {
        // 2e-4 off: flagged isotropic only under the looser tolerance
        let tight = prepared(vec![elastic_table_with_mids("1001.70c", 0.5, 0.5002)]);
        let record = tight.scatter_record(0, 1).unwrap();
        assert_eq!(record.lower_law, 0.0);
        assert_eq!(record.upper_law, 3.0);

        // under 1e-4 a 5e-5 offset passes, a 2e-4 offset still fails
        let loose = prepared(vec![elastic_table_with_mids("1001.70c", 0.50005, 0.5002)])
            .with_isotropic_tol(1e-4);
        let record = loose.scatter_record(0, 1).unwrap();
        assert_eq!(record.lower_law, 0.0);
        assert_eq!(record.upper_law, 3.0);
    }

    #[test]
    fn test_angular_above_last() {
        let data = prepared(vec![elastic_table("1001.70c")]);
        // row 2 is E=4, the last angular energy
        let record = data.scatter_record(2, 1).unwrap();

        assert_eq!(record.lower_erg, 4.0);
        assert_eq!(record.upper_erg, 4.0);
        assert_eq!(record.next_dex, 3);
    }

    #[test]
    fn test_angular_below_threshold() {
        let data = prepared(vec![angular_threshold_table("26056.70c")]);
        // angular data starts at E=3; row 0 is E=1
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, -2.0);
        assert_eq!(record.upper_law, -2.0);
        assert!(zero_vecs(&record));
        assert_eq!(record.lower_erg, 0.0);
        assert_eq!(record.next_dex, 2);
    }

    //-----------------------------------------------------------------
    // B3: joint angle-energy
    //-----------------------------------------------------------------
    #[test]
    fn test_law61_scatter_mux() {
        let data = prepared(vec![law61_table("26056.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 61.0);
        assert_eq!(record.lower_intt, 2.0);
        // var is a zero sentinel; the energy record picks the sub-dist
        assert_eq!(record.lower_var, vec![0.0]);
        // two 3-point sub-distributions: mu, cdf, pdf sections
        assert_eq!(record.lower_cdf.len(), 18);
        assert_eq!(record.lower_len, vec![6.0]);
        assert_eq!(record.lower_pdf, vec![0.0, 3.0, 6.0]);
        assert_eq!(&record.lower_cdf[..6], &[-1.0, 0.0, 1.0, -1.0, 0.0, 1.0]);
        assert_eq!(&record.lower_cdf[6..12], &[0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(&record.lower_cdf[12..], &[0.5; 6]);
        assert_eq!(record.next_dex, 2);
    }

    #[test]
    fn test_law61_length_mismatch() {
        let data = prepared(vec![law61_mismatch_table("26056.70c")]);
        let err = data.scatter_record(0, 1).unwrap_err();

        assert!(matches!(
            err,
            PrepError::LengthMismatch {
                nuclide: 0,
                mt: 51,
                row: 0,
                col: 1,
                mu_len: 1,
                e_out_len: 2,
            }
        ));
    }

    #[test]
    fn test_law61_energy_record_is_tabulated() {
        let data = prepared(vec![law61_table("26056.70c")]);
        let record = data.energy_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 61.0);
        assert_eq!(record.lower_var, vec![0.1, 0.2]);
        assert_eq!(record.lower_pdf, vec![4.0, 6.0]);
        assert_eq!(record.lower_cdf, vec![0.0, 1.0]);
        assert_eq!(record.lower_len, vec![2.0]);
        assert_eq!(record.upper_var, vec![0.1, 0.3]);
    }

    //-----------------------------------------------------------------
    // B4: outgoing-energy distributions
    //-----------------------------------------------------------------
    #[test]
    fn test_scatter_parametric_zero_shapes() {
        // parametric spectra carry nothing angular
        let data = prepared(vec![evap_table("26056.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 9.0);
        assert_eq!(record.lower_intt, 2.0);
        assert_eq!(record.lower_var, vec![0.0]);
        assert_eq!(record.lower_cdf, vec![0.0]);
        assert_eq!(record.lower_pdf, vec![0.0]);
        assert_eq!(record.lower_len, vec![1.0]);
        assert_eq!(record.lower_erg, 1.0);
        assert_eq!(record.upper_erg, 4.0);
        assert_eq!(record.next_dex, 2);
    }

    #[test]
    fn test_scatter_plain_tabulated_zero_shapes() {
        // law 4: no angular payload, but the zero vectors keep the
        // shapes of the outgoing cdf and pdf
        let data = prepared(vec![tabulated_table("26056.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 4.0);
        assert_eq!(record.lower_var, vec![0.0]);
        assert_eq!(record.lower_len, vec![1.0]);
        assert_eq!(record.lower_cdf, vec![0.0, 0.0, 0.0]);
        assert_eq!(record.lower_pdf, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scatter_kalbach_fractions() {
        // law 44: angular parameters ride in var, precompound
        // fractions in cdf
        let data = prepared(vec![kalbach_table("26056.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 44.0);
        assert_eq!(record.lower_var, vec![0.4, 0.5, 0.6]);
        assert_eq!(record.upper_var, vec![0.5, 0.6, 0.7]);
        assert_eq!(record.lower_cdf, vec![0.1, 0.2, 0.3]);
        assert_eq!(record.lower_pdf, vec![0.0, 0.0, 0.0]);
        assert_eq!(record.lower_len, vec![3.0]);
    }

    #[test]
    fn test_scatter_watt_brackets_union_axis() {
        let data = prepared(vec![watt_table("26056.70c")]);
        // row 1 is E=2, a point of the b axis only; the union axis
        // carries it
        let record = data.scatter_record(1, 1).unwrap();

        assert_eq!(record.lower_law, 11.0);
        assert_eq!(record.lower_erg, 2.0);
        assert_eq!(record.upper_erg, 4.0);
        assert_eq!(record.next_dex, 2);
    }

    #[test]
    fn test_energy_tabulated_spectrum() {
        let data = prepared(vec![fissile_table("92235.70c")]);
        let record = data.energy_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 4.0);
        assert_eq!(record.lower_intt, 2.0);
        assert_eq!(record.lower_var, vec![0.5, 1.0, 2.0]);
        assert_eq!(record.lower_pdf, vec![0.3, 0.4, 0.3]);
        assert_eq!(record.lower_cdf, vec![0.0, 0.5, 1.0]);
        assert_eq!(record.lower_len, vec![3.0]);
        assert_eq!(record.upper_var, vec![0.6, 1.2, 2.4]);
        assert_eq!(record.lower_erg, 1.0);
        assert_eq!(record.upper_erg, 4.0);
        assert_eq!(record.next_dex, 2);
    }

    #[test]
    fn test_energy_evaporation() {
        let data = prepared(vec![evap_table("26056.70c")]);
        let record = data.energy_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 9.0);
        assert_eq!(record.lower_var, vec![0.5]);
        assert_eq!(record.upper_var, vec![0.7]);
        // restriction energy rides in the cdf field
        assert_eq!(record.lower_cdf, vec![0.1]);
        assert_eq!(record.lower_pdf, vec![0.0]);
        assert_eq!(record.lower_len, vec![1.0]);
    }

    #[test]
    fn test_energy_maxwellian() {
        let data = prepared(vec![maxwell_table("26056.70c")]);
        let record = data.energy_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 7.0);
        assert_eq!(record.lower_var, vec![0.3]);
        assert_eq!(record.lower_cdf, vec![0.2]);
        assert_eq!(record.lower_pdf, vec![0.0]);
    }

    #[test]
    fn test_energy_watt_resampled_parameters() {
        let data = prepared(vec![watt_table("26056.70c")]);
        // row 1 is E=2: a is interpolated onto the union axis, b is
        // tabulated there
        let record = data.energy_record(1, 1).unwrap();

        assert_eq!(record.lower_law, 11.0);
        assert_abs_diff_eq!(record.lower_var[0], 0.9666667, epsilon = 1e-6);
        assert_eq!(record.lower_cdf, vec![0.5]);
        assert_eq!(record.lower_pdf, vec![0.05]);
        assert_eq!(record.upper_var, vec![1.1]);
        assert_eq!(record.upper_cdf, vec![0.6]);
    }

    #[test]
    fn test_energy_below_threshold() {
        let data = prepared(vec![evap_threshold_table("26056.70c")]);
        // spectrum starts at E=2; row 0 is E=1
        let record = data.energy_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 0.0);
        assert_eq!(record.upper_law, 0.0);
        assert!(zero_vecs(&record));
        assert_eq!(record.next_dex, 1);
    }

    #[test]
    fn test_energy_unhandled_dist() {
        let data = prepared(vec![other_law_table("26056.70c")]);
        let err = data.energy_record(0, 1).unwrap_err();

        assert!(matches!(
            err,
            PrepError::UnhandledEnergyDist {
                law: 66,
                nuclide: 0,
                mt: 37,
                row: 0,
                col: 1,
            }
        ));
    }

    #[test]
    fn test_scatter_unrecognized_law_still_packs() {
        // the scatter side has nothing to say about an unknown law
        // with an axis: zero shapes, law passed through
        let data = prepared(vec![other_law_table("26056.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 66.0);
        assert_eq!(record.lower_var, vec![0.0]);
        assert_eq!(record.lower_len, vec![1.0]);
    }

    //-----------------------------------------------------------------
    // B5: fallbacks
    //-----------------------------------------------------------------
    #[test]
    fn test_scatter_isotropic_fallback() {
        let data = prepared(vec![threshold_table("26056.70c")]);
        let record = data.scatter_record(0, 1).unwrap();

        assert_eq!(record.lower_law, 0.0);
        assert_eq!(record.lower_intt, 1.0);
        assert_eq!(record.lower_erg, 1.0);
        assert_eq!(record.upper_erg, 5.0);
        assert_eq!(record.lower_len, vec![3.0]);
        assert_eq!(record.lower_var, vec![-1.0, 0.0, 1.0]);
        assert_eq!(record.lower_pdf, vec![0.5, 0.5, 0.5]);
        assert_eq!(record.lower_cdf, vec![0.0, 0.5, 1.0]);
        assert_eq!(record.next_dex, 5);
    }

    #[test]
    fn test_fallback_law_passes_through() {
        // level scattering has a law code but no incident axis
        let data = prepared(vec![level_table("26056.70c")]);

        let scatter = data.scatter_record(0, 1).unwrap();
        assert_eq!(scatter.lower_law, 3.0);
        assert_eq!(scatter.lower_var, vec![-1.0, 0.0, 1.0]);

        let energy = data.energy_record(0, 1).unwrap();
        assert_eq!(energy.lower_law, 3.0);
        assert_eq!(energy.lower_len, vec![1.0]);
        assert_eq!(energy.lower_var, vec![0.0]);
        assert_eq!(energy.next_dex, 3);
    }

    //-----------------------------------------------------------------
    // Cross-branch invariants
    //-----------------------------------------------------------------
    #[test]
    fn test_next_dex_always_advances() {
        let data = shared_prepared_data();
        let [n, e_u, r] = data.lengths();

        for col in n as usize..(n + r) as usize {
            for row in 0..e_u as usize {
                let scatter = data.scatter_record(row, col).unwrap();
                let energy = data.energy_record(row, col).unwrap();
                assert!(
                    scatter.next_dex as usize > row || scatter.next_dex == e_u,
                    "scatter next_dex {} at row {} col {}",
                    scatter.next_dex,
                    row,
                    col
                );
                assert!(
                    energy.next_dex as usize > row || energy.next_dex == e_u,
                    "energy next_dex {} at row {} col {}",
                    energy.next_dex,
                    row,
                    col
                );
            }
        }
    }

    #[test]
    fn test_next_dex_skips_share_bracket() {
        // rows strictly between a row and its next_dex reproduce the
        // same bracket energies
        let data = shared_prepared_data();
        let [n, e_u, r] = data.lengths();

        for col in n as usize..(n + r) as usize {
            let mut row = 0usize;
            while row < e_u as usize {
                let record = data.scatter_record(row, col).unwrap();
                let stop = (record.next_dex as usize).min(e_u as usize);
                for mid in row + 1..stop {
                    let same = data.scatter_record(mid, col).unwrap();
                    assert_eq!(record.lower_erg, same.lower_erg);
                    assert_eq!(record.upper_erg, same.upper_erg);
                }
                row = stop.max(row + 1);
            }
        }
    }

    #[test]
    fn test_records_are_pure() {
        let data = shared_prepared_data();
        let n = data.lengths()[0] as usize;
        let first = data.scatter_record(0, n).unwrap();
        let second = data.scatter_record(0, n).unwrap();
        assert_eq!(first, second);
    }
}
