//! Temporary working directory holding the fragments of a single sort run.

use std::fs;
use std::io;
use std::path::Path;

use log;

use crate::fragment::Fragment;
use crate::sort::SortError;

/// Owns the temporary directory and the fragment files created in it.
pub struct Workspace {
    dir: tempfile::TempDir,
    fragments: Vec<Fragment>,
}

impl Workspace {
    /// Creates a new uniquely named working directory inside `tmp_path`,
    /// or inside the default OS temporary directory.
    pub fn new(tmp_path: Option<&Path>) -> Result<Self, SortError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ext-line-sort-");

        let dir = if let Some(tmp_path) = tmp_path {
            builder.tempdir_in(tmp_path)
        } else {
            builder.tempdir()
        }
        .map_err(|err| SortError::TempDir(err))?;

        log::info!("using {} as a temporary directory", dir.path().display());

        return Ok(Workspace {
            dir,
            fragments: Vec::new(),
        });
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Deletes fragment files and the working directory.
    ///
    /// Deletion is best effort: failures are logged and counted but never fail the run.
    /// Returns the number of entries that could not be removed.
    pub fn cleanup(self) -> usize {
        let mut failures = 0;

        for fragment in self.fragments.iter() {
            match fs::remove_file(fragment.path()) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    log::warn!("fragment {} not removed: {}", fragment.path().display(), err);
                    failures += 1;
                }
            }
        }

        let dir_path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            log::warn!("temporary directory {} not removed: {}", dir_path.display(), err);
            failures += 1;
        } else {
            log::debug!("temporary directory {} removed", dir_path.display());
        }

        return failures;
    }
}
