use std::path::{Path, PathBuf};

use gatecfg_core::{GateError, Result};
use tracing::{debug, info};

use crate::ini::IniDocument;
use crate::view::{CaseMode, RawConfig};

/// Reads a configuration directory into merged views.
///
/// Files are merged in lexicographic order of their file names, so
/// `99-local.ini` overrides `10-misc.ini` for any `(section, option)` both
/// define. Only regular files ending in `.ini` are read.
pub struct ConfigAggregator {
    dir: PathBuf,
}

/// Both views of one read of the configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigViews {
    normalized: RawConfig,
    preserved: RawConfig,
    files: Vec<PathBuf>,
}

impl ConfigViews {
    /// Build both views from already-read `(path, text)` pairs, merged in
    /// the order given.
    pub fn from_sources<P: AsRef<Path>>(sources: &[(P, String)]) -> Result<Self> {
        let mut normalized = RawConfig::new(CaseMode::Normalize);
        let mut preserved = RawConfig::new(CaseMode::Preserve);
        let mut files = Vec::with_capacity(sources.len());
        for (path, text) in sources {
            let path = path.as_ref();
            let doc = IniDocument::parse(path, text)?;
            debug!(file = %path.display(), sections = doc.sections.len(), "parsed config file");
            normalized.merge(&doc);
            preserved.merge(&doc);
            files.push(path.to_path_buf());
        }
        Ok(Self {
            normalized,
            preserved,
            files,
        })
    }

    pub fn view(&self, mode: CaseMode) -> &RawConfig {
        match mode {
            CaseMode::Normalize => &self.normalized,
            CaseMode::Preserve => &self.preserved,
        }
    }

    pub fn normalized(&self) -> &RawConfig {
        &self.normalized
    }

    /// Files that were merged, in merge order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl ConfigAggregator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The `.ini` files of the directory, in merge order.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let read_err = |source| GateError::Read {
            path: self.dir.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            let is_ini = path.extension().is_some_and(|ext| ext == "ini");
            if is_ini && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Read and merge every source file.
    pub fn load(&self) -> Result<ConfigViews> {
        let files = self.source_files()?;
        info!(dir = %self.dir.display(), files = files.len(), "reading configuration");
        Self::load_files(&files)
    }

    /// Read and merge `files` in the order given.
    pub fn load_files(files: &[PathBuf]) -> Result<ConfigViews> {
        let mut sources = Vec::with_capacity(files.len());
        for path in files {
            let text = std::fs::read_to_string(path).map_err(|source| GateError::Read {
                path: path.clone(),
                source,
            })?;
            sources.push((path.clone(), text));
        }
        ConfigViews::from_sources(&sources)
    }
}
