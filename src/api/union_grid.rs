use std::ops::Deref;
use std::sync::Arc;

use log::info;

use crate::interpolation::union_sorted;
use crate::tables::{EnergyDistData, NuclideTable};

//=====================================================================
// Union energy grid
//
// Sorted set union of every energy axis the tables expose: the
// principal grids, the nu grids, and every distribution's incident
// axis. No retention filter applies here; a reaction dropped from the
// dense table still contributes its grid points.
//=====================================================================
#[derive(Debug, Clone, Default)]
pub struct UnionGrid(pub Vec<f64>);

impl Deref for UnionGrid {
    type Target = Vec<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl UnionGrid {
    pub fn unionize(tables: &[Arc<NuclideTable>]) -> Self {
        info!("unionizing grid over {} tables", tables.len());
        let mut grid: Vec<f64> = Vec::new();

        for table in tables {
            // main xs
            grid = union_sorted(&grid, &table.energy);

            // nu grids if present
            for nu in [table.nu_t.as_ref(), table.nu_d.as_ref(), table.nu_p.as_ref()]
                .into_iter()
                .flatten()
            {
                grid = union_sorted(&grid, &nu.energy);
            }

            // fold in the distribution energies as well
            for rxn in table.reactions.values() {
                if let Some(ang) = &rxn.angular {
                    grid = union_sorted(&grid, &ang.energy_in);
                }
                if let Some(dist) = &rxn.energy_dist {
                    match &dist.data {
                        // both raw parameter axes, not the derived union
                        EnergyDistData::Watt(w) => {
                            grid = union_sorted(&grid, &w.energya_in);
                            grid = union_sorted(&grid, &w.energyb_in);
                        }
                        other => {
                            if let Some(energy_in) = other.energy_in() {
                                grid = union_sorted(&grid, energy_in);
                            }
                        }
                    }
                }
            }
        }

        info!("union grid has {} points", grid.len());
        Self(grid)
    }

    /// First row at or above `energy`; the grid length when none is.
    pub fn first_at_or_above(&self, energy: f64) -> usize {
        self.0.partition_point(|&e| e < energy)
    }

    pub fn as_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&e| e as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::utils::testing::{fissile_table, simple_table, threshold_table, two_grid_tables};

    #[test]
    fn test_single_table_grid() {
        let tables = vec![simple_table("1001.70c")];
        let grid = UnionGrid::unionize(&tables);
        assert_eq!(grid.0, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_disjoint_grids_union() {
        let grid = UnionGrid::unionize(&two_grid_tables());
        assert_eq!(grid.0, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_grid_strictly_increasing() {
        let tables = vec![
            fissile_table("92235.70c"),
            threshold_table("26056.70c"),
            simple_table("1001.70c"),
        ];
        let grid = UnionGrid::unionize(&tables);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_nu_and_distribution_axes_folded_in() {
        let tables = vec![fissile_table("92235.70c")];
        let grid = UnionGrid::unionize(&tables);
        let table = &tables[0];
        for e in &table.nu_t.as_ref().unwrap().energy {
            assert!(grid.contains(e));
        }
        for e in &table.nu_d.as_ref().unwrap().energy {
            assert!(grid.contains(e));
        }
        for rxn in table.reactions.values() {
            if let Some(dist) = &rxn.energy_dist {
                for e in dist.data.energy_in().unwrap_or(&[]) {
                    assert!(grid.contains(e));
                }
            }
        }
    }

    #[test]
    fn test_first_at_or_above() {
        let grid = UnionGrid(vec![1.0, 2.0, 4.0]);
        assert_eq!(grid.first_at_or_above(0.5), 0);
        assert_eq!(grid.first_at_or_above(2.0), 1);
        assert_eq!(grid.first_at_or_above(2.5), 2);
        assert_eq!(grid.first_at_or_above(9.0), 3);
    }
}
