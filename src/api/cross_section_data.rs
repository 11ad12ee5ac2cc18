use anyhow::Result;
use log::info;

use crate::api::material::Material;
use crate::api::catalog::ReactionCatalog;
use crate::api::union_grid::UnionGrid;
use crate::api::xs_table::XsTable;
use crate::tables::LibraryProvider;
use crate::utils::to_f32;
use crate::xsdir::Xsdir;

const DEFAULT_ISOTROPIC_TOL: f64 = 1e-5;

//=====================================================================
// Prepared cross-section data
//
// The end product of the prepare pipeline: union grid, reaction
// catalog, and dense resampled table, with the loaded tables kept
// alive for on-demand record packing. Everything is immutable after
// assembly, so the record emitters are safe to call from any number
// of threads.
//=====================================================================
#[derive(Clone)]
pub struct CrossSectionData {
    pub(crate) material: Material,
    pub(crate) grid: UnionGrid,
    pub(crate) catalog: ReactionCatalog,
    pub(crate) xs: XsTable,
    pub(crate) isotropic_tol: f64,
}

impl CrossSectionData {
    /// Run the phases on an already-loaded material:
    /// union -> index -> allocate -> resample.
    pub fn assemble(material: Material) -> Self {
        let grid = UnionGrid::unionize(material.tables());
        let catalog = ReactionCatalog::build(material.tables());
        let xs = XsTable::resample(&grid, material.tables(), &catalog);
        info!(
            "assembled {} isotopes, {} grid points, {} reactions",
            catalog.num_isotopes,
            grid.len(),
            catalog.num_reactions
        );
        Self {
            material,
            grid,
            catalog,
            xs,
            isotropic_tol: DEFAULT_ISOTROPIC_TOL,
        }
    }

    /// Resolve, load, and assemble a comma-separated nuclide list in
    /// one call.
    pub fn prepare<P: LibraryProvider>(
        nuclide_list: &str,
        xsdir: &Xsdir,
        provider: &P,
    ) -> Result<Self> {
        let mut material = Material::from_list(nuclide_list);
        material.load(xsdir, provider)?;
        Ok(Self::assemble(material))
    }

    /// Tolerance below which a short tabulated angular cdf is treated
    /// as uniform when packing scatter records.
    pub fn with_isotropic_tol(mut self, tol: f64) -> Self {
        self.isotropic_tol = tol;
        self
    }

    //-----------------------------------------------------------------
    // Borrow accessors for the internal double-precision state
    //-----------------------------------------------------------------
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn grid(&self) -> &UnionGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &ReactionCatalog {
        &self.catalog
    }

    pub fn xs(&self) -> &XsTable {
        &self.xs
    }

    //-----------------------------------------------------------------
    // Contiguous buffers for the downstream engine
    //-----------------------------------------------------------------
    /// Union energy grid, length E_u.
    pub fn main_energy_grid(&self) -> Vec<f32> {
        self.grid.as_f32()
    }

    /// MT-remapped reaction numbers, length N+R.
    pub fn reaction_numbers(&self) -> Vec<u32> {
        self.catalog.remapped_numbers()
    }

    /// Atomic weight ratios, length N.
    pub fn awr_values(&self) -> Vec<f32> {
        to_f32(&self.catalog.awr)
    }

    /// Temperatures, length N.
    pub fn temperatures(&self) -> Vec<f32> {
        to_f32(&self.catalog.temp)
    }

    /// Q values, length N+R.
    pub fn q_values(&self) -> Vec<f32> {
        to_f32(&self.catalog.q)
    }

    /// Dense cross sections, row-major E_u x (N+R).
    pub fn xs_buffer(&self) -> Vec<f32> {
        self.xs.as_f32()
    }

    /// (N, E_u, R).
    pub fn lengths(&self) -> [u32; 3] {
        [
            self.catalog.num_isotopes as u32,
            self.grid.len() as u32,
            self.catalog.num_reactions as u32,
        ]
    }

    /// Cumulative retained-reaction counts with a leading zero,
    /// length N+1.
    pub fn reaction_numbers_cum(&self) -> Vec<u32> {
        self.catalog.cumulative_totals()
    }
}
