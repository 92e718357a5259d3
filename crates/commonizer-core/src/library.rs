//! Native library artifacts and the loader seam.
//!
//! Actual archive parsing lives outside this crate; all the repository needs
//! from a loaded library is its manifest, in particular the exact set of
//! target names it was built for. [`ManifestFileLoader`] is the filesystem
//! implementation reading a library's TOML manifest.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Manifest metadata of one native library artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryManifest {
    /// Unique library name.
    pub name: String,
    /// Library version, if recorded.
    #[serde(default)]
    pub version: Option<String>,
    /// Names of the platforms this library was built for.
    #[serde(default)]
    pub targets: BTreeSet<String>,
}

impl LibraryManifest {
    /// Parse a manifest from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let manifest: LibraryManifest = toml::from_str(toml_str)?;
        if manifest.name.is_empty() {
            return Err(CoreError::InvalidManifest {
                detail: "library name is empty".into(),
            });
        }
        Ok(manifest)
    }

    /// Load a manifest from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        LibraryManifest::from_toml(&content)
    }
}

/// A loaded library artifact: its location plus manifest metadata.
///
/// Opaque beyond the manifest; ordering is by location first, so library
/// sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NativeLibrary {
    location: PathBuf,
    manifest: LibraryManifest,
}

impl NativeLibrary {
    /// Build a library value from its parts.
    pub fn new(location: PathBuf, manifest: LibraryManifest) -> Self {
        NativeLibrary { location, manifest }
    }

    /// Where the artifact was loaded from.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The artifact's manifest.
    pub fn manifest(&self) -> &LibraryManifest {
        &self.manifest
    }
}

/// Loads one library artifact from a location.
///
/// Fallible per artifact; implementations must be safe to invoke from
/// multiple threads at once (or be serialized by the caller).
pub trait LibraryLoader: Send + Sync {
    fn load(&self, location: &Path) -> Result<NativeLibrary>;
}

/// Loader that treats the location as a TOML manifest file on disk.
#[derive(Debug, Clone, Default)]
pub struct ManifestFileLoader;

impl LibraryLoader for ManifestFileLoader {
    fn load(&self, location: &Path) -> Result<NativeLibrary> {
        let manifest = LibraryManifest::from_file(location)?;
        Ok(NativeLibrary::new(location.to_path_buf(), manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let manifest = LibraryManifest::from_toml(
            r#"
name = "curl"
version = "7.61.0"
targets = ["linux_x64", "macos_x64"]
"#,
        )
        .unwrap();
        assert_eq!(manifest.name, "curl");
        assert_eq!(manifest.version.as_deref(), Some("7.61.0"));
        assert_eq!(manifest.targets.len(), 2);
    }

    #[test]
    fn version_and_targets_are_optional() {
        let manifest = LibraryManifest::from_toml(r#"name = "zlib""#).unwrap();
        assert!(manifest.version.is_none());
        assert!(manifest.targets.is_empty());
    }

    #[test]
    fn empty_name_rejected() {
        let err = LibraryManifest::from_toml(r#"name = """#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidManifest { .. }));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            LibraryManifest::from_toml("name = [[["),
            Err(CoreError::Toml(_))
        ));
    }

    #[test]
    fn loader_reads_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlite.klib.toml");
        std::fs::write(&path, "name = \"sqlite\"\ntargets = [\"linux_x64\"]\n").unwrap();

        let library = ManifestFileLoader.load(&path).unwrap();
        assert_eq!(library.location(), path);
        assert_eq!(library.manifest().name, "sqlite");
    }

    #[test]
    fn loader_missing_file_is_io_error() {
        let result = ManifestFileLoader.load(Path::new("/nonexistent/lib.klib.toml"));
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
