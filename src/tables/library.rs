use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::tables::NuclideTable;

//=====================================================================
// ACE parser contract
//
// Parsing library files is someone else's job. The assembler only
// needs to open a library, read it once, and pull tables out by
// nuclide identifier. Tables are shared as Arcs so a nuclide listed
// twice yields two entries without assuming distinct objects.
//=====================================================================
pub trait Library: Send + Sync {
    /// Parse the whole library. Called exactly once per library.
    fn read(&mut self) -> Result<()>;

    /// Look up one nuclide's table. None if the identifier is not in
    /// this library.
    fn find_table(&self, nuclide: &str) -> Option<Arc<NuclideTable>>;
}

pub trait LibraryProvider: Sync {
    type Lib: Library;

    /// Open the library file at `path` without reading it yet.
    fn open(&self, path: &Path) -> Result<Self::Lib>;
}
