use std::path::PathBuf;

use thiserror::Error;

//=====================================================================
// Failure kinds for the prepare pipeline.
//
// The first three terminate the prepare phase; the last two surface at
// record-emission time and carry the full (nuclide, MT, row, col)
// position so a bad evaluation can be traced back to its table.
//=====================================================================
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("no xsdir found at '{}'", .0.display())]
    XsdirNotFound(PathBuf),

    #[error("nuclide '{nuclide}' not found in '{}'", .xsdir.display())]
    NuclideNotFound { nuclide: String, xsdir: PathBuf },

    #[error("nuclide '{nuclide}' not present in library '{}'", .path.display())]
    TableNotFound { nuclide: String, path: PathBuf },

    #[error(
        "angle table length mismatch for nuclide {nuclide} MT {mt} at row {row}, col {col}: \
         {mu_len} mu_out tables vs {e_out_len} energy_out tables"
    )]
    LengthMismatch {
        nuclide: usize,
        mt: u32,
        row: usize,
        col: usize,
        mu_len: usize,
        e_out_len: usize,
    },

    #[error(
        "unhandled energy distribution (law {law}) for nuclide {nuclide} MT {mt} at row {row}, col {col}"
    )]
    UnhandledEnergyDist {
        law: u32,
        nuclide: usize,
        mt: u32,
        row: usize,
        col: usize,
    },
}
