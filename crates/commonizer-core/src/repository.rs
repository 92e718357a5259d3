//! Library repository: partitioning artifacts by their exact target set.
//!
//! A [`FilesRepository`] owns a set of artifact locations and a loader. On
//! first access it loads every artifact, resolves the manifest's declared
//! target names through the platform registry, and buckets libraries by the
//! exact set of platforms they were built for. The loaded partition is
//! memoized; repeated queries never re-trigger loading.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use commonizer_targets::{PlatformId, PlatformRegistry};

use crate::error::{CoreError, LoadFailure, Result};
use crate::library::{LibraryLoader, NativeLibrary};

/// Grouping key: the exact set of platforms a library was built for.
///
/// Distinct from a shared commonizer target: this is a flat set with plain
/// set equality, used purely for bucketing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetSetKey(BTreeSet<PlatformId>);

impl TargetSetKey {
    /// Build a key from any iterator of platforms.
    pub fn new<I>(platforms: I) -> Self
    where
        I: IntoIterator<Item = PlatformId>,
    {
        TargetSetKey(platforms.into_iter().collect())
    }

    /// The platforms in this key.
    pub fn platforms(&self) -> &BTreeSet<PlatformId> {
        &self.0
    }
}

impl FromIterator<PlatformId> for TargetSetKey {
    fn from_iter<I: IntoIterator<Item = PlatformId>>(iter: I) -> Self {
        TargetSetKey::new(iter)
    }
}

/// Query interface over a pool of loaded libraries.
pub trait Repository {
    /// The full loaded pool.
    fn all_libraries(&self) -> Result<BTreeSet<NativeLibrary>>;

    /// Libraries whose declared target set equals `key` exactly.
    ///
    /// Libraries built for a strict subset or superset of `key` do not
    /// match. No match is an empty set, not an error.
    fn libraries_for(&self, key: &TargetSetKey) -> Result<BTreeSet<NativeLibrary>>;
}

#[derive(Debug)]
struct LoadedState {
    by_target_set: BTreeMap<TargetSetKey, BTreeSet<NativeLibrary>>,
    failures: Vec<LoadFailure>,
}

/// File-backed repository with lazy, at-most-once load-and-partition.
pub struct FilesRepository {
    library_files: BTreeSet<PathBuf>,
    loader: Arc<dyn LibraryLoader>,
    registry: Arc<dyn PlatformRegistry>,
    state: OnceLock<LoadedState>,
}

impl FilesRepository {
    /// Create a repository over the given artifact locations.
    ///
    /// Nothing is loaded here; the first query triggers loading.
    pub fn new<I>(
        library_files: I,
        loader: Arc<dyn LibraryLoader>,
        registry: Arc<dyn PlatformRegistry>,
    ) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        FilesRepository {
            library_files: library_files.into_iter().collect(),
            loader,
            registry,
            state: OnceLock::new(),
        }
    }

    /// Per-artifact failures from the load pass, if any.
    ///
    /// Forces loading on first call, like every other query.
    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.load_state().failures
    }

    fn load_state(&self) -> &LoadedState {
        self.state.get_or_init(|| self.load_and_partition())
    }

    fn loaded(&self) -> Result<&LoadedState> {
        let state = self.load_state();
        if state.failures.is_empty() {
            Ok(state)
        } else {
            Err(CoreError::LibraryLoad {
                failures: state.failures.clone(),
            })
        }
    }

    fn load_and_partition(&self) -> LoadedState {
        let mut by_target_set: BTreeMap<TargetSetKey, BTreeSet<NativeLibrary>> = BTreeMap::new();
        let mut failures = Vec::new();

        for file in &self.library_files {
            let library = match self.loader.load(file) {
                Ok(library) => library,
                Err(err) => {
                    warn!(location = %file.display(), error = %err, "library failed to load");
                    failures.push(LoadFailure {
                        location: file.clone(),
                        detail: err.to_string(),
                    });
                    continue;
                }
            };

            // The declared target names must all be known platforms.
            let mut platforms = BTreeSet::new();
            let mut unknown = None;
            for name in &library.manifest().targets {
                match self.registry.find(name) {
                    Some(platform) => {
                        platforms.insert(platform);
                    }
                    None => {
                        unknown = Some(name.clone());
                        break;
                    }
                }
            }
            if let Some(name) = unknown {
                warn!(location = %file.display(), platform = %name, "unknown platform in manifest");
                failures.push(LoadFailure {
                    location: file.clone(),
                    detail: format!("unknown platform in manifest: {name}"),
                });
                continue;
            }

            debug!(
                location = %file.display(),
                name = %library.manifest().name,
                targets = platforms.len(),
                "loaded library"
            );
            by_target_set
                .entry(TargetSetKey(platforms))
                .or_default()
                .insert(library);
        }

        LoadedState {
            by_target_set,
            failures,
        }
    }
}

impl Repository for FilesRepository {
    fn all_libraries(&self) -> Result<BTreeSet<NativeLibrary>> {
        let state = self.loaded()?;
        Ok(state
            .by_target_set
            .values()
            .flat_map(|libraries| libraries.iter().cloned())
            .collect())
    }

    fn libraries_for(&self, key: &TargetSetKey) -> Result<BTreeSet<NativeLibrary>> {
        let state = self.loaded()?;
        Ok(state.by_target_set.get(key).cloned().unwrap_or_default())
    }
}
