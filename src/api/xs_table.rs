use std::sync::Arc;

use log::info;
use rayon::prelude::*;

use crate::api::catalog::{is_retained, ReactionCatalog};
use crate::api::union_grid::UnionGrid;
use crate::interpolation::resample_left_zero;
use crate::tables::{NuclideTable, Reaction};

//=====================================================================
// Dense cross-section table
//
// Row-major E_u x (N + R): one row per union-grid energy, the first N
// columns per-nuclide totals, the rest the retained reactions in
// catalog order. Values strictly below a reaction's threshold are
// zero. Columns are independent, so they resample in parallel.
//=====================================================================
#[derive(Debug, Clone)]
pub struct XsTable {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

enum ColumnSource<'a> {
    Total(&'a NuclideTable),
    Reaction(&'a NuclideTable, &'a Reaction),
}

impl XsTable {
    pub fn resample(
        grid: &UnionGrid,
        tables: &[Arc<NuclideTable>],
        catalog: &ReactionCatalog,
    ) -> Self {
        let rows = grid.len();
        let cols = catalog.num_isotopes + catalog.num_reactions;
        info!("resampling {} columns onto {} grid points", cols, rows);

        // column sources in catalog order: totals, then retained
        // reactions nuclide-major ascending-MT
        let mut sources: Vec<ColumnSource> = Vec::with_capacity(cols);
        for table in tables {
            sources.push(ColumnSource::Total(table.as_ref()));
        }
        for table in tables {
            for (mt, rxn) in &table.reactions {
                if is_retained(*mt) {
                    sources.push(ColumnSource::Reaction(table.as_ref(), rxn));
                }
            }
        }
        debug_assert_eq!(sources.len(), cols);

        let columns: Vec<Vec<f64>> = sources
            .par_iter()
            .map(|source| match source {
                ColumnSource::Total(table) => {
                    resample_left_zero(grid, &table.energy, &table.sigma_t)
                }
                ColumnSource::Reaction(table, rxn) => {
                    resample_left_zero(grid, &table.energy[rxn.ie..], &rxn.sigma)
                }
            })
            .collect();

        let mut data = vec![0.0; rows * cols];
        for (c, column) in columns.iter().enumerate() {
            for (r, &value) in column.iter().enumerate() {
                data[r * cols + c] = value;
            }
        }

        Self { data, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// The full row-major buffer in single precision.
    pub fn as_f32(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::utils::testing::{simple_table, threshold_table, two_grid_tables};

    #[test]
    fn test_single_nuclide_total_only() {
        let tables = vec![simple_table("1001.70c")];
        let grid = UnionGrid::unionize(&tables);
        let catalog = ReactionCatalog::build(&tables);
        let xs = XsTable::resample(&grid, &tables, &catalog);

        assert_eq!((xs.rows(), xs.cols()), (3, 1));
        assert_eq!(
            (0..3).map(|r| xs.value(r, 0)).collect::<Vec<_>>(),
            vec![10.0, 20.0, 40.0]
        );
    }

    #[test]
    fn test_two_nuclides_disjoint_grids() {
        let tables = two_grid_tables();
        let grid = UnionGrid::unionize(&tables);
        let catalog = ReactionCatalog::build(&tables);
        let xs = XsTable::resample(&grid, &tables, &catalog);

        // E* = [1,2,3,4,5]; nuclide A tabulated on [1,3,5]
        // row 2 is E=3, an exact grid point of A
        assert_abs_diff_eq!(xs.value(2, 0), 30.0);
        // row 3 is E=4, interpolated between A's 3 and 5
        assert_abs_diff_eq!(xs.value(3, 0), 40.0);
        // nuclide B tabulated on [2,4]: zero below, flat above
        assert_abs_diff_eq!(xs.value(0, 1), 0.0);
        assert_abs_diff_eq!(xs.value(4, 1), 40.0);
    }

    #[test]
    fn test_threshold_column_is_zero_below() {
        let tables = vec![threshold_table("26056.70c")];
        let grid = UnionGrid::unionize(&tables);
        let catalog = ReactionCatalog::build(&tables);
        let xs = XsTable::resample(&grid, &tables, &catalog);

        // reaction thresholded at E=3 (ie=2 on [1,2,3,4,5])
        let column: Vec<f64> = (0..5).map(|r| xs.value(r, 1)).collect();
        assert_eq!(column, vec![0.0, 0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_below_threshold_invariant() {
        let tables = vec![threshold_table("26056.70c")];
        let grid = UnionGrid::unionize(&tables);
        let catalog = ReactionCatalog::build(&tables);
        let xs = XsTable::resample(&grid, &tables, &catalog);

        let table = &tables[0];
        for (c, (mt, rxn)) in table.reactions.iter().enumerate() {
            assert!(is_retained(*mt));
            let threshold = table.reaction_threshold(rxn);
            for (r, &e) in grid.iter().enumerate() {
                if e < threshold {
                    assert_eq!(xs.value(r, catalog.num_isotopes + c), 0.0);
                }
            }
        }
    }
}
