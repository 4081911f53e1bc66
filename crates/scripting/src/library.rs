//! Script library
//!
//! Shared, thread-safe collection of parsed scripts keyed by script name.
//! `run script:block` statements resolve their target here.

use crate::error::{Result, ScriptError};
use crate::registry::Registry;
use crate::script::ParsedScript;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of loading a directory of scripts
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of scripts that parsed and were registered
    pub loaded: Vec<String>,
    /// Files that failed, with their error
    pub failed: Vec<(PathBuf, ScriptError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Parsed scripts indexed by name
#[derive(Debug, Default)]
pub struct ScriptLibrary {
    scripts: DashMap<String, Arc<ParsedScript>>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script under its own name, replacing any previous one
    pub fn insert(&self, script: ParsedScript) -> Arc<ParsedScript> {
        let script = Arc::new(script);
        self.scripts
            .insert(script.name().to_string(), Arc::clone(&script));
        script
    }

    pub fn get(&self, name: &str) -> Option<Arc<ParsedScript>> {
        self.scripts.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<ParsedScript>> {
        self.scripts.remove(name).map(|(_, script)| script)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Script names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scripts.iter().map(|entry| entry.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Parse one file and register it under its file stem
    pub fn load_file<P: AsRef<Path>>(&self, path: P, registry: &Registry) -> Result<Arc<ParsedScript>> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid script file name: {}", path.display()),
                )
            })?;

        let source = std::fs::read_to_string(path)?;
        let script = ParsedScript::parse_with(name, &source, registry)?;
        tracing::debug!("Loaded script {} from {}", name, path.display());
        Ok(self.insert(script))
    }

    /// Load every `*.{extension}` file in `dir`.
    ///
    /// A script that fails to parse is skipped and reported; only failing to
    /// read the directory itself is an error.
    pub fn load_dir<P: AsRef<Path>>(&self, dir: P, extension: &str, registry: &Registry) -> Result<LoadReport> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
            .collect();
        paths.sort();

        let mut report = LoadReport::default();
        for path in paths {
            match self.load_file(&path, registry) {
                Ok(script) => report.loaded.push(script.name().to_string()),
                Err(e) => {
                    tracing::warn!("Failed to load script {}: {}", path.display(), e);
                    report.failed.push((path, e));
                }
            }
        }

        tracing::info!(
            "Loaded {} script(s) from {} ({} failed)",
            report.loaded.len(),
            dir.display(),
            report.failed.len()
        );
        Ok(report)
    }
}
