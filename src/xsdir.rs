use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::info;

use crate::error::PrepError;

//=====================================================================
// Nuclide -> library path resolution
//
// An xsdir is a plain text index: one line per nuclide of the form
//
//   <id> <numeric fields...> <relative path> ...
//
// The caller may hand us either a directory containing an `xsdir`
// file, or the xsdir file itself. In the latter case the first line
// may carry a `datapath=<absolute path>` directive naming where the
// library files live; without one, entry paths are taken as absolute.
//=====================================================================
#[derive(Debug)]
pub struct Xsdir {
    datapath: PathBuf,
    body: String,
}

impl Xsdir {
    pub fn open<P: AsRef<Path>>(datapath: P) -> Result<Self> {
        let supplied = datapath.as_ref();

        let names_xsdir_file = supplied
            .file_name()
            .is_some_and(|n| n.to_string_lossy().contains("xsdir"));

        if names_xsdir_file {
            let body = fs::read_to_string(supplied)
                .map_err(|_| PrepError::XsdirNotFound(supplied.to_path_buf()))?;
            let datapath = match parse_datapath_directive(body.lines().next().unwrap_or("")) {
                Some(path) => {
                    info!("using datapath '{}' from '{}'", path.display(), supplied.display());
                    path
                }
                None => {
                    info!(
                        "no datapath in '{}', assuming full paths specified",
                        supplied.display()
                    );
                    PathBuf::new()
                }
            };
            return Ok(Self { datapath, body });
        }

        let xsdir_file = supplied.join("xsdir");
        let body = fs::read_to_string(&xsdir_file)
            .map_err(|_| PrepError::XsdirNotFound(supplied.to_path_buf()))?;
        info!("using xsdir in '{}'", supplied.display());
        Ok(Self {
            datapath: supplied.to_path_buf(),
            body,
        })
    }

    /// Effective datapath; empty when entry paths are absolute.
    pub fn datapath(&self) -> &Path {
        &self.datapath
    }

    /// Find the library file holding `nuclide`.
    ///
    /// A line matches when its first token is exactly the identifier,
    /// at least one numeric token follows, and a path token closes the
    /// match. The path is joined onto the datapath unless the datapath
    /// is empty.
    pub fn resolve(&self, nuclide: &str) -> Result<PathBuf> {
        for line in self.body.lines() {
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some(nuclide) {
                continue;
            }
            let mut saw_numeric = false;
            for token in tokens {
                if fast_float::parse::<f64, _>(token).is_ok() {
                    saw_numeric = true;
                    continue;
                }
                if saw_numeric {
                    return Ok(if self.datapath.as_os_str().is_empty() {
                        PathBuf::from(token)
                    } else {
                        self.datapath.join(token)
                    });
                }
                break;
            }
        }
        Err(PrepError::NuclideNotFound {
            nuclide: nuclide.to_string(),
            xsdir: self.datapath.clone(),
        }
        .into())
    }
}

// First line may read `datapath=/abs/path` in any case, possibly with
// trailing fields.
fn parse_datapath_directive(first_line: &str) -> Option<PathBuf> {
    let lowered = first_line.to_ascii_lowercase();
    let start = lowered.find("datapath=")?;
    let value = first_line[start + "datapath=".len()..]
        .split_whitespace()
        .next()?;
    if value.starts_with('/') {
        Some(PathBuf::from(value))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::TempDir;

    fn write_xsdir(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_open_directory() {
        let dir = TempDir::new().unwrap();
        write_xsdir(&dir, "xsdir", "1001.70c 0.999167 endf70a 0 1 1 8192\n");
        let xsdir = Xsdir::open(dir.path()).unwrap();
        assert_eq!(xsdir.datapath(), dir.path());
        assert_eq!(xsdir.resolve("1001.70c").unwrap(), dir.path().join("endf70a"));
    }

    #[test]
    fn test_open_xsdir_file_with_datapath_directive() {
        let dir = TempDir::new().unwrap();
        let path = write_xsdir(
            &dir,
            "my_xsdir",
            "DATAPATH=/opt/xsdata\n92235.70c 233.0248 endf70j 0 1 1 8192\n",
        );
        let xsdir = Xsdir::open(&path).unwrap();
        assert_eq!(xsdir.datapath(), Path::new("/opt/xsdata"));
        assert_eq!(
            xsdir.resolve("92235.70c").unwrap(),
            Path::new("/opt/xsdata/endf70j")
        );
    }

    #[test]
    fn test_open_xsdir_file_without_directive_is_absolute() {
        let dir = TempDir::new().unwrap();
        let path = write_xsdir(
            &dir,
            "xsdir_endf",
            "atomic weight ratios\n92235.70c 233.0248 /data/endf70j 0 1 1 8192\n",
        );
        let xsdir = Xsdir::open(&path).unwrap();
        assert!(xsdir.datapath().as_os_str().is_empty());
        assert_eq!(
            xsdir.resolve("92235.70c").unwrap(),
            Path::new("/data/endf70j")
        );
    }

    #[test]
    fn test_missing_xsdir() {
        let dir = TempDir::new().unwrap();
        let err = Xsdir::open(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::XsdirNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_nuclide() {
        let dir = TempDir::new().unwrap();
        write_xsdir(&dir, "xsdir", "1001.70c 0.999167 endf70a 0 1 1 8192\n");
        let xsdir = Xsdir::open(dir.path()).unwrap();
        let err = xsdir.resolve("92235.70c").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::NuclideNotFound { .. })
        ));
    }

    #[test]
    fn test_identifier_must_match_exactly() {
        let dir = TempDir::new().unwrap();
        write_xsdir(&dir, "xsdir", "1001.70c 0.999167 endf70a 0 1 1 8192\n");
        let xsdir = Xsdir::open(dir.path()).unwrap();
        assert!(xsdir.resolve("1001.70").is_err());
        assert!(xsdir.resolve("1001").is_err());
    }

    // This test should only be run locally against a real xsdir tree,
    // pointed at by XSUNION_LOCAL_XSDIR.
    // Turn it on with `cargo test --features local`
    #[cfg(feature = "local")]
    #[test]
    fn test_resolve_local_xsdir() {
        let datapath = std::env::var("XSUNION_LOCAL_XSDIR").unwrap();
        let xsdir = Xsdir::open(&datapath).unwrap();
        // Hydrogen should exist in any real library index
        assert!(xsdir.resolve("1001.70c").is_ok() || xsdir.resolve("1001.80c").is_ok());
    }
}
