#![allow(dead_code)]

//=====================================================================
// Utility functions to aid in testing
//
// Synthetic nuclide tables covering every distribution shape the
// packer handles, plus a stub parser so the load path can run against
// scratch xsdir trees.
//=====================================================================

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use lazy_static::lazy_static;
use tempfile::TempDir;

use crate::api::{CrossSectionData, Material};
use crate::interpolation::InterpolationScheme;
use crate::tables::{
    AngularDist, EnergyDist, EnergyDistData, EvaporationDist, JointAngleEnergyDist, Library,
    LibraryProvider, MaxwellianDist, NuInterp, NuTable, NuclideTable, OtherDist, PrecursorDist,
    Reaction, TabulatedDist, WattDist,
};
use crate::xsdir::Xsdir;

lazy_static! {
    // Shared prepared data, assembled once and reused by the accessor
    // and record tests.
    static ref SHARED_DATA: Mutex<Option<CrossSectionData>> = Mutex::new(None);
}

//=====================================================================
// Stub parser
//=====================================================================
pub struct StubLibrary {
    tables: HashMap<String, Arc<NuclideTable>>,
    read: bool,
}

impl Library for StubLibrary {
    fn read(&mut self) -> Result<()> {
        self.read = true;
        Ok(())
    }

    fn find_table(&self, nuclide: &str) -> Option<Arc<NuclideTable>> {
        assert!(self.read, "find_table called before read");
        self.tables.get(nuclide).cloned()
    }
}

pub struct StubProvider {
    libraries: HashMap<PathBuf, HashMap<String, Arc<NuclideTable>>>,
    pub open_count: AtomicUsize,
}

impl LibraryProvider for StubProvider {
    type Lib = StubLibrary;

    fn open(&self, path: &Path) -> Result<StubLibrary> {
        self.open_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let tables = self
            .libraries
            .get(path)
            .ok_or_else(|| anyhow::anyhow!("no stub library at {}", path.display()))?;
        Ok(StubLibrary {
            tables: tables.clone(),
            read: false,
        })
    }
}

/// Scratch xsdir tree plus a stub provider serving the given tables,
/// one entry per (library name, tables) pair.
pub fn stub_setup(
    libraries: Vec<(&str, Vec<Arc<NuclideTable>>)>,
) -> (TempDir, Xsdir, StubProvider) {
    stub_setup_with_lines(libraries, &[])
}

/// Like `stub_setup`, with extra raw xsdir lines appended (e.g. an
/// entry pointing at a library that does not actually hold it).
pub fn stub_setup_with_lines(
    libraries: Vec<(&str, Vec<Arc<NuclideTable>>)>,
    extra_lines: &[&str],
) -> (TempDir, Xsdir, StubProvider) {
    let dir = TempDir::new().unwrap();

    let mut body = String::new();
    let mut provider = StubProvider {
        libraries: HashMap::new(),
        open_count: AtomicUsize::new(0),
    };

    for (library_name, tables) in libraries {
        let library_path = dir.path().join(library_name);
        let mut by_name = HashMap::new();
        for table in tables {
            body.push_str(&format!(
                "{} {} {} 0 1 1 8192\n",
                table.name, table.awr, library_name
            ));
            by_name.insert(table.name.clone(), table);
        }
        provider.libraries.insert(library_path, by_name);
    }
    for line in extra_lines {
        body.push_str(line);
        body.push('\n');
    }

    let mut f = std::fs::File::create(dir.path().join("xsdir")).unwrap();
    f.write_all(body.as_bytes()).unwrap();

    let xsdir = Xsdir::open(dir.path()).unwrap();
    (dir, xsdir, provider)
}

/// Assemble prepared data straight from tables, skipping the resolve
/// and load phases.
pub fn prepared(tables: Vec<Arc<NuclideTable>>) -> CrossSectionData {
    CrossSectionData::assemble(Material::from_tables(tables))
}

/// Three-nuclide material (elastic + fissile + thresholded) prepared
/// once through the full resolve/load path and shared across tests.
pub fn shared_prepared_data() -> CrossSectionData {
    let mut data = SHARED_DATA.lock().unwrap();
    if data.is_none() {
        let (_dir, xsdir, provider) = stub_setup(vec![
            (
                "lib_a",
                vec![elastic_table("1001.70c"), fissile_table("92235.70c")],
            ),
            ("lib_b", vec![threshold_table("26056.70c")]),
        ]);
        *data =
            Some(CrossSectionData::prepare("1001.70c,92235.70c,26056.70c", &xsdir, &provider).unwrap());
    }
    data.as_ref().unwrap().clone()
}

//=====================================================================
// Synthetic tables
//=====================================================================
fn bare_table(name: &str, energy: Vec<f64>, sigma_t: Vec<f64>) -> NuclideTable {
    NuclideTable {
        name: name.to_string(),
        awr: 0.999167,
        temp: 2.5301e-8,
        energy,
        sigma_t,
        reactions: BTreeMap::new(),
        nu_t: None,
        nu_d: None,
        nu_p: None,
        nu_d_energy_dist: Vec::new(),
        nu_d_precursor_prob: Vec::new(),
    }
}

fn bare_reaction(mt: u32, q: f64, ie: usize, sigma: Vec<f64>) -> Reaction {
    Reaction {
        mt,
        q,
        ie,
        sigma,
        multiplicity: 1,
        angular: None,
        energy_dist: None,
    }
}

/// A total cross section and nothing else: energy [1,2,4],
/// sigma_t [10,20,40].
pub fn simple_table(name: &str) -> Arc<NuclideTable> {
    Arc::new(bare_table(name, vec![1.0, 2.0, 4.0], vec![10.0, 20.0, 40.0]))
}

/// Two nuclides on disjoint grids [1,3,5] and [2,4].
pub fn two_grid_tables() -> Vec<Arc<NuclideTable>> {
    vec![
        Arc::new(bare_table("a", vec![1.0, 3.0, 5.0], vec![10.0, 30.0, 50.0])),
        Arc::new(bare_table("b", vec![2.0, 4.0], vec![20.0, 40.0])),
    ]
}

/// Elastic scattering with a two-point angular table; the lower
/// distribution is exactly isotropic, the upper slightly off.
pub fn elastic_table(name: &str) -> Arc<NuclideTable> {
    elastic_table_with_mids(name, 0.5, 0.5002)
}

/// Elastic table with chosen cdf midpoints at the two incident
/// energies, for exercising the isotropy tolerance.
pub fn elastic_table_with_mids(name: &str, lower_mid: f64, upper_mid: f64) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![10.0, 20.0, 40.0]);
    let mut rxn = bare_reaction(2, 0.0, 0, vec![10.0, 20.0, 40.0]);
    rxn.angular = Some(AngularDist {
        energy_in: vec![1.0, 4.0],
        intt: vec![InterpolationScheme::LinLin, InterpolationScheme::LinLin],
        cos: vec![vec![-1.0, 0.0, 1.0], vec![-1.0, 0.0, 1.0]],
        pdf: vec![vec![0.5, 0.5, 0.5], vec![0.5, 0.5, 0.5]],
        cdf: vec![vec![0.0, lower_mid, 1.0], vec![0.0, upper_mid, 1.0]],
    });
    table.reactions.insert(2, rxn);
    Arc::new(table)
}

/// (n,2n) thresholded at E=3 on [1,2,3,4,5], no distributions.
pub fn threshold_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(
        name,
        vec![1.0, 2.0, 3.0, 4.0, 5.0],
        vec![1.0, 1.0, 1.0, 1.0, 1.0],
    );
    table
        .reactions
        .insert(16, bare_reaction(16, -5.0, 2, vec![0.1, 0.2, 0.3]));
    Arc::new(table)
}

/// Angular table starting above the bottom of the grid, so low rows
/// sit below the distribution threshold.
pub fn angular_threshold_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(
        name,
        vec![1.0, 2.0, 3.0, 4.0, 5.0],
        vec![1.0, 1.0, 1.0, 1.0, 1.0],
    );
    let mut rxn = bare_reaction(16, -5.0, 0, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
    rxn.angular = Some(AngularDist {
        energy_in: vec![3.0, 5.0],
        intt: vec![InterpolationScheme::LinLin, InterpolationScheme::LinLin],
        cos: vec![vec![-1.0, 0.0, 1.0], vec![-1.0, 0.5, 1.0]],
        pdf: vec![vec![0.5, 0.5, 0.5], vec![0.4, 0.6, 0.4]],
        cdf: vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.7, 1.0]],
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// MTs {2, 3, 4, 16, 102, 207} for the retention filter.
pub fn retention_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    for (mt, q) in [(2, 0.0), (3, 0.0), (4, -0.5), (16, -7.0), (102, 6.5), (207, 0.0)] {
        table
            .reactions
            .insert(mt, bare_reaction(mt, q, 0, vec![1.0, 1.0, 1.0]));
    }
    Arc::new(table)
}

fn precursor_groups() -> Vec<PrecursorDist> {
    (0..6)
        .map(|g| {
            let scale = (g + 1) as f64;
            PrecursorDist {
                law: 4,
                intt: [2, 2],
                energy_out: [
                    vec![0.1 * scale, 0.2 * scale],
                    vec![0.15 * scale, 0.25 * scale],
                ],
                pdf: [vec![5.0, 5.0], vec![5.0, 5.0]],
                cdf: [vec![0.0, 1.0], vec![0.0, 1.0]],
            }
        })
        .collect()
}

fn fissile_table_with_nu_axes(name: &str, nu_energy: Vec<f64>, nu_t_value: Vec<f64>, nu_d_value: Vec<f64>) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![10.0, 20.0, 40.0]);
    table.awr = 233.0248;

    table.nu_t = Some(NuTable {
        energy: nu_energy.clone(),
        value: nu_t_value,
        int: NuInterp::Scalar(InterpolationScheme::LinLin),
    });
    table.nu_d = Some(NuTable {
        energy: nu_energy.clone(),
        value: nu_d_value,
        int: NuInterp::Scalar(InterpolationScheme::LinLin),
    });
    // prompt nu; its interpolation code feeds the delayed digit of the
    // packed intt field
    table.nu_p = Some(NuTable {
        value: vec![2.38; nu_energy.len()],
        energy: nu_energy,
        int: NuInterp::Scalar(InterpolationScheme::Histogram),
    });
    table.nu_d_energy_dist = precursor_groups();
    table.nu_d_precursor_prob = vec![
        [0.2, 0.1],
        [0.2, 0.1],
        [0.2, 0.2],
        [0.2, 0.2],
        [0.1, 0.2],
        [0.1, 0.2],
    ];

    let mut fission = bare_reaction(18, 194.0, 0, vec![17.0, 38.0, 100.0]);
    fission.multiplicity = 19;
    fission.energy_dist = Some(EnergyDist {
        law: 4,
        data: EnergyDistData::Tabulated(TabulatedDist {
            energy_in: vec![1.0, 4.0],
            intt: Some(vec![2, 2]),
            energy_out: vec![vec![0.5, 1.0, 2.0], vec![0.6, 1.2, 2.4]],
            pdf: vec![vec![0.3, 0.4, 0.3], vec![0.3, 0.4, 0.3]],
            cdf: vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0]],
            frac: None,
            ang: None,
        }),
    });
    table.reactions.insert(18, fission);
    table
        .reactions
        .insert(102, bare_reaction(102, 6.5, 0, vec![1.0, 2.0, 3.0]));
    Arc::new(table)
}

/// Fissile nuclide: nu tables on the principal grid, six precursor
/// groups, fission (MT 18) with a tabulated spectrum, capture (MT 102).
pub fn fissile_table(name: &str) -> Arc<NuclideTable> {
    fissile_table_with_nu_axes(
        name,
        vec![1.0, 2.0, 4.0],
        vec![2.4, 2.6, 3.0],
        vec![0.02, 0.04, 0.08],
    )
}

/// Fissile nuclide whose nu grids start above the union grid bottom,
/// so the lowest rows are below the nu threshold.
pub fn fissile_table_nu_floor(name: &str) -> Arc<NuclideTable> {
    fissile_table_with_nu_axes(name, vec![2.0, 4.0], vec![2.6, 3.0], vec![0.04, 0.08])
}

fn joint_payload(mu_out_lower: Vec<Vec<f64>>) -> JointAngleEnergyDist {
    JointAngleEnergyDist {
        energy_in: vec![1.0, 4.0],
        intt: Some(vec![2, 2]),
        energy_out: vec![vec![0.1, 0.2], vec![0.1, 0.3]],
        pdf: vec![vec![4.0, 6.0], vec![5.0, 5.0]],
        cdf: vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        a_dist_intt: Some(vec![vec![2, 2], vec![2, 2]]),
        a_dist_mu_out: vec![
            mu_out_lower,
            vec![vec![-1.0, 0.0, 1.0], vec![-1.0, 0.5, 1.0]],
        ],
        a_dist_pdf: vec![
            vec![vec![0.5, 0.5, 0.5], vec![0.5, 0.5, 0.5]],
            vec![vec![0.5, 0.5, 0.5], vec![0.4, 0.6, 0.4]],
        ],
        a_dist_cdf: vec![
            vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0]],
            vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.6, 1.0]],
        ],
    }
}

/// Inelastic level with a joint angle-energy (law 61) distribution.
pub fn law61_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(51, -1.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 61,
        data: EnergyDistData::JointAngleEnergy(joint_payload(vec![
            vec![-1.0, 0.0, 1.0],
            vec![-1.0, 0.0, 1.0],
        ])),
    });
    table.reactions.insert(51, rxn);
    Arc::new(table)
}

/// Law-61 table violating the per-outgoing-energy length invariant at
/// the lower incident energy.
pub fn law61_mismatch_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(51, -1.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 61,
        data: EnergyDistData::JointAngleEnergy(joint_payload(vec![vec![-1.0, 0.0, 1.0]])),
    });
    table.reactions.insert(51, rxn);
    Arc::new(table)
}

/// (n,2n) with a plain tabulated spectrum (law 4), no fission data.
pub fn tabulated_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(16, -7.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 4,
        data: EnergyDistData::Tabulated(TabulatedDist {
            energy_in: vec![1.0, 4.0],
            intt: Some(vec![2, 2]),
            energy_out: vec![vec![0.5, 1.0, 2.0], vec![0.6, 1.2, 2.4]],
            pdf: vec![vec![0.3, 0.4, 0.3], vec![0.3, 0.4, 0.3]],
            cdf: vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0]],
            frac: None,
            ang: None,
        }),
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// (n,2n) with a Kalbach-Mann spectrum (law 44): tabulated energies
/// plus precompound fractions and angular parameters.
pub fn kalbach_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(16, -7.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 44,
        data: EnergyDistData::Tabulated(TabulatedDist {
            energy_in: vec![1.0, 4.0],
            intt: Some(vec![2, 2]),
            energy_out: vec![vec![0.5, 1.0, 2.0], vec![0.6, 1.2, 2.4]],
            pdf: vec![vec![0.3, 0.4, 0.3], vec![0.3, 0.4, 0.3]],
            cdf: vec![vec![0.0, 0.5, 1.0], vec![0.0, 0.5, 1.0]],
            frac: Some(vec![vec![0.1, 0.2, 0.3], vec![0.2, 0.3, 0.4]]),
            ang: Some(vec![vec![0.4, 0.5, 0.6], vec![0.5, 0.6, 0.7]]),
        }),
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// (n,2n) with an evaporation spectrum (law 9).
pub fn evap_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(16, -7.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 9,
        data: EnergyDistData::Evaporation(EvaporationDist {
            energy_in: vec![1.0, 4.0],
            intt: None,
            t: vec![0.5, 0.7],
            u: 0.1,
        }),
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// Evaporation spectrum starting above the grid bottom, with the
/// reaction itself thresholded at E=2.
pub fn evap_threshold_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(16, -7.0, 1, vec![1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 9,
        data: EnergyDistData::Evaporation(EvaporationDist {
            energy_in: vec![2.0, 4.0],
            intt: None,
            t: vec![0.5, 0.7],
            u: 0.1,
        }),
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// (n,2n) with a Maxwellian spectrum (law 7).
pub fn maxwell_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(16, -7.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 7,
        data: EnergyDistData::Maxwellian(MaxwellianDist {
            energy_in: vec![1.0, 4.0],
            intt: None,
            t: vec![0.3, 0.5],
            u: 0.2,
        }),
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// (n,2n) with an energy-dependent Watt spectrum (law 11) whose a and
/// b axes differ.
pub fn watt_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(16, -7.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 11,
        data: EnergyDistData::Watt(WattDist::new(
            vec![1.0, 4.0],
            vec![0.9, 1.1],
            vec![1.0, 2.0, 4.0],
            vec![0.4, 0.5, 0.6],
            0.05,
        )),
    });
    table.reactions.insert(16, rxn);
    Arc::new(table)
}

/// Reaction carrying a law the packer has no payload for (N-body
/// phase space) but with an incident axis.
pub fn other_law_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(37, -10.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 66,
        data: EnergyDistData::Other(OtherDist {
            energy_in: Some(vec![1.0, 4.0]),
        }),
    });
    table.reactions.insert(37, rxn);
    Arc::new(table)
}

/// Level scattering (law 3): an energy distribution with no incident
/// axis at all.
pub fn level_table(name: &str) -> Arc<NuclideTable> {
    let mut table = bare_table(name, vec![1.0, 2.0, 4.0], vec![1.0, 2.0, 4.0]);
    let mut rxn = bare_reaction(91, -2.0, 0, vec![1.0, 1.0, 1.0]);
    rxn.energy_dist = Some(EnergyDist {
        law: 3,
        data: EnergyDistData::Other(OtherDist { energy_in: None }),
    });
    table.reactions.insert(91, rxn);
    Arc::new(table)
}
