use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use log::info;
use rayon::prelude::*;

use crate::error::PrepError;
use crate::tables::{Library, LibraryProvider, NuclideTable};
use crate::xsdir::Xsdir;

//=====================================================================
// Material assembler
//
// A material is an ordered list of nuclide identifiers. Loading
// resolves each identifier to its library file, opens and reads every
// distinct library exactly once, then extracts the tables in the
// user's original order. `tables[k]` always corresponds to nuclide
// `k` in the list; a nuclide listed twice gets two entries.
//=====================================================================
#[derive(Clone, Default)]
pub struct Material {
    nuclide_list: Vec<String>,
    tables: Vec<Arc<NuclideTable>>,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    // Assembles a material directly from tables, bypassing the
    // resolve and load phases. Test fixtures only.
    pub(crate) fn from_tables(tables: Vec<Arc<NuclideTable>>) -> Self {
        Self {
            nuclide_list: tables.iter().map(|t| t.name.clone()).collect(),
            tables,
        }
    }

    /// Build the nuclide list from a comma-separated string.
    pub fn from_list(list: &str) -> Self {
        Self {
            nuclide_list: list.split(',').map(|s| s.trim().to_string()).collect(),
            tables: Vec::new(),
        }
    }

    pub fn push_nuclide(&mut self, nuclide: &str) {
        self.nuclide_list.push(nuclide.to_string());
    }

    pub fn nuclides(&self) -> &[String] {
        &self.nuclide_list
    }

    pub fn tables(&self) -> &[Arc<NuclideTable>] {
        &self.tables
    }

    pub fn num_isotopes(&self) -> usize {
        self.tables.len()
    }

    /// Resolve, load, and extract every nuclide in list order.
    pub fn load<P: LibraryProvider>(&mut self, xsdir: &Xsdir, provider: &P) -> Result<()> {
        // Map each nuclide to its library path; keep the distinct
        // paths so every library is opened at most once.
        let mut resolved: Vec<PathBuf> = Vec::with_capacity(self.nuclide_list.len());
        let mut unique_paths: Vec<PathBuf> = Vec::new();
        for nuclide in &self.nuclide_list {
            let path = xsdir.resolve(nuclide)?;
            if !unique_paths.contains(&path) {
                unique_paths.push(path.clone());
            }
            resolved.push(path);
        }

        // Open and read the libraries, one parse per file
        info!("loading {} libraries", unique_paths.len());
        let cache: DashMap<PathBuf, P::Lib> = DashMap::new();
        unique_paths.par_iter().try_for_each(|path| -> Result<()> {
            info!("loading {}", path.display());
            let mut library = provider.open(path)?;
            library.read()?;
            cache.insert(path.clone(), library);
            Ok(())
        })?;

        // Extract the tables, preserving list order
        for (nuclide, path) in self.nuclide_list.iter().zip(&resolved) {
            info!("extracting {} from {}", nuclide, path.display());
            let library = cache.get(path).expect("library loaded above");
            let table = library
                .find_table(nuclide)
                .ok_or_else(|| PrepError::TableNotFound {
                    nuclide: nuclide.clone(),
                    path: path.clone(),
                })?;
            self.tables.push(table);
        }

        Ok(())
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Material({})", self.nuclide_list.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::Ordering;

    use crate::utils::testing::{simple_table, stub_setup, stub_setup_with_lines};

    #[test]
    fn test_tables_follow_list_order() {
        let (_dir, xsdir, provider) = stub_setup(vec![
            ("lib_a", vec![simple_table("2004.70c"), simple_table("1001.70c")]),
            ("lib_b", vec![simple_table("92235.70c")]),
        ]);

        let mut material = Material::from_list("92235.70c,1001.70c,2004.70c");
        material.load(&xsdir, &provider).unwrap();

        let names: Vec<&str> = material.tables().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["92235.70c", "1001.70c", "2004.70c"]);
    }

    #[test]
    fn test_each_library_opened_once() {
        let (_dir, xsdir, provider) = stub_setup(vec![(
            "lib_a",
            vec![simple_table("1001.70c"), simple_table("2004.70c")],
        )]);

        let mut material = Material::from_list("1001.70c,2004.70c,1001.70c");
        material.load(&xsdir, &provider).unwrap();

        assert_eq!(provider.open_count.load(Ordering::SeqCst), 1);
        assert_eq!(material.num_isotopes(), 3);
    }

    #[test]
    fn test_duplicate_nuclides_get_independent_entries() {
        let (_dir, xsdir, provider) =
            stub_setup(vec![("lib_a", vec![simple_table("1001.70c")])]);

        let mut material = Material::from_list("1001.70c,1001.70c");
        material.load(&xsdir, &provider).unwrap();

        assert_eq!(material.tables().len(), 2);
        assert_eq!(material.tables()[0].name, material.tables()[1].name);
    }

    #[test]
    fn test_missing_table_in_library() {
        let (_dir, xsdir, provider) = stub_setup_with_lines(
            vec![("lib_a", vec![simple_table("1001.70c")])],
            &["1002.70c 1.9968 lib_a 0 1 1 8192"],
        );

        // present in the xsdir but not in the library file
        let mut material = Material::from_list("1002.70c");
        let err = material.load(&xsdir, &provider).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::TableNotFound { .. })
        ));
    }
}
