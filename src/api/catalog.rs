use std::sync::Arc;

use log::info;

use crate::tables::NuclideTable;

//=====================================================================
// Reaction catalog
//
// Assigns every dense-table column. The first N columns are the
// per-nuclide totals, marked with a sentinel MT=1 and Q=0; after them
// come all retained reactions, nuclide-major in ascending MT. The
// downstream engine indexes by column, so this ordering must be
// reproducible run to run.
//=====================================================================
#[derive(Debug, Clone, Default)]
pub struct ReactionCatalog {
    /// Atomic weight ratio per nuclide.
    pub awr: Vec<f64>,
    /// Temperature per nuclide.
    pub temp: Vec<f64>,
    /// Q value per column (0 for the total sentinels).
    pub q: Vec<f64>,
    /// Raw MT per column; the totals carry the sentinel 1.
    pub reaction_numbers: Vec<u32>,
    /// Retained-reaction count per nuclide.
    pub reaction_numbers_total: Vec<u32>,
    pub num_isotopes: usize,
    pub num_reactions: usize,
}

/// Retention filter for the dense table: keep neutron-producing and
/// capture channels, drop summary MTs and everything at or above 200.
pub fn is_retained(mt: u32) -> bool {
    mt < 200 && !matches!(mt, 3 | 4 | 5 | 10 | 27)
}

/// Relabeling applied on emission for the downstream engine: elastic
/// moves to 50, fission channels shift by 800, captures by 1000.
pub fn remap_mt(mt: u32) -> u32 {
    if mt == 2 {
        50
    } else if (18..=21).contains(&mt) || mt == 38 {
        mt + 800
    } else if mt > 100 {
        mt + 1000
    } else {
        mt
    }
}

impl ReactionCatalog {
    pub fn build(tables: &[Arc<NuclideTable>]) -> Self {
        let mut catalog = Self {
            num_isotopes: tables.len(),
            ..Self::default()
        };

        // totals first: sentinel reaction numbers, per-nuclide data
        for table in tables {
            catalog.reaction_numbers.push(1);
            catalog.q.push(0.0);
            catalog.awr.push(table.awr);
            catalog.temp.push(table.temp);
        }

        // then every retained reaction, in ascending MT per nuclide
        for table in tables {
            let mut retained = 0u32;
            for (mt, rxn) in &table.reactions {
                if is_retained(*mt) {
                    catalog.reaction_numbers.push(*mt);
                    catalog.q.push(rxn.q);
                    catalog.num_reactions += 1;
                    retained += 1;
                }
            }
            catalog.reaction_numbers_total.push(retained);
        }

        info!(
            "catalog: {} isotopes, {} retained reactions",
            catalog.num_isotopes, catalog.num_reactions
        );
        catalog
    }

    /// Reaction numbers with the downstream relabeling applied.
    pub fn remapped_numbers(&self) -> Vec<u32> {
        self.reaction_numbers.iter().map(|&mt| remap_mt(mt)).collect()
    }

    /// Cumulative retained-reaction counts with a leading zero,
    /// length N+1.
    pub fn cumulative_totals(&self) -> Vec<u32> {
        let mut cum = Vec::with_capacity(self.reaction_numbers_total.len() + 1);
        cum.push(0);
        let mut acc = 0;
        for &n in &self.reaction_numbers_total {
            acc += n;
            cum.push(acc);
        }
        cum
    }

    /// Which nuclide owns a reaction column (col >= num_isotopes).
    pub fn isotope_of_column(&self, col: usize) -> usize {
        let target = (col - self.num_isotopes) as u32;
        let mut acc = 0;
        for (k, &n) in self.reaction_numbers_total.iter().enumerate() {
            acc += n;
            if target < acc {
                return k;
            }
        }
        panic!("column {} is beyond the reaction catalog", col);
    }
}
