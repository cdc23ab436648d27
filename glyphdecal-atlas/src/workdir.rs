use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};

/// Scratch directory for per-glyph rasterizer output; emptied on creation
/// and removed on drop unless intermediates are retained.
#[derive(Debug)]
pub(crate) struct WorkDir {
    path: PathBuf,
    retain: bool,
}

impl WorkDir {
    pub(crate) const DIR_NAME: &'static str = "sdfgen_tmp";

    pub(crate) fn prepare(parent: &Path, retain: bool) -> io::Result<Self> {
        let path = parent.join(Self::DIR_NAME);
        if path.exists() {
            debug!("clearing stale working directory {}", path.display());
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;

        Ok(Self { path, retain })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.retain {
            warn!("intermediate glyph images retained in {}", self.path.display());
        } else if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!("failed to remove working directory {}: {e}", self.path.display());
        }
    }
}
