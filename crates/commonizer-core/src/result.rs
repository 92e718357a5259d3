//! Run results: the sealed outcome of one commonization run.
//!
//! A run either had nothing to do, or produced per-module outcomes for
//! every participating target: each configured leaf plus exactly one shared
//! target that is their union. The key-set invariant is checked when the
//! [`Commonized`] value is built, so an ill-shaped result never exists.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use commonizer_targets::{CommonizerTarget, LeafTarget, SharedTarget};

use crate::error::{CoreError, Result};

/// A declaration module produced by the merge engine.
///
/// External seam: the compiler-internal declaration model stays outside
/// this crate.
pub trait ModuleDeclaration: fmt::Debug + Send + Sync {
    /// Module name.
    fn name(&self) -> &str;
}

/// Outcome for one (target, module) pair.
#[derive(Debug, Clone)]
pub enum ModuleResult {
    /// The module did not exist for this target. A legitimate outcome,
    /// not an error; the location is kept for diagnostics.
    Absent { original_location: PathBuf },
    /// The module's resulting declarations for this target.
    Commonized(Arc<dyn ModuleDeclaration>),
}

/// Outcome of one commonization run.
#[derive(Debug)]
pub enum CommonizationResult {
    /// Fewer than two targets were configured; no output was produced.
    NothingToCommonize,
    /// Per-module outcomes for every participating target.
    Commonized(Commonized),
}

/// The per-target outcomes of a completed run.
#[derive(Debug)]
pub struct Commonized {
    modules_by_target: BTreeMap<CommonizerTarget, Vec<ModuleResult>>,
    shared_target: SharedTarget,
    leaf_targets: BTreeSet<LeafTarget>,
}

impl Commonized {
    /// Build a validated result from the engine's modules-by-target map.
    ///
    /// The key set must contain exactly one shared target, at least one
    /// leaf, and the shared target's direct sub-targets must be exactly the
    /// leaf keys. Anything else is a [`CoreError::ResultShape`].
    pub fn new(modules_by_target: BTreeMap<CommonizerTarget, Vec<ModuleResult>>) -> Result<Self> {
        let mut shared_targets = Vec::new();
        let mut leaf_targets = BTreeSet::new();
        for key in modules_by_target.keys() {
            match key {
                CommonizerTarget::Shared(shared) => shared_targets.push(shared.clone()),
                CommonizerTarget::Leaf(leaf) => {
                    leaf_targets.insert(leaf.clone());
                }
            }
        }

        if shared_targets.len() != 1 {
            return Err(CoreError::ResultShape {
                detail: format!(
                    "expected exactly one shared target among result keys, found {}",
                    shared_targets.len()
                ),
            });
        }
        let shared_target = shared_targets.remove(0);

        if leaf_targets.is_empty() {
            return Err(CoreError::ResultShape {
                detail: "no leaf targets among result keys".into(),
            });
        }

        let expected: BTreeSet<CommonizerTarget> = leaf_targets
            .iter()
            .cloned()
            .map(CommonizerTarget::Leaf)
            .collect();
        if shared_target.targets() != &expected {
            return Err(CoreError::ResultShape {
                detail: format!(
                    "shared target {} is not the union of the leaf keys",
                    shared_target.identity_string()
                ),
            });
        }

        Ok(Commonized {
            modules_by_target,
            shared_target,
            leaf_targets,
        })
    }

    /// The one shared target among the result keys.
    pub fn shared_target(&self) -> &SharedTarget {
        &self.shared_target
    }

    /// The leaf targets among the result keys.
    pub fn leaf_targets(&self) -> &BTreeSet<LeafTarget> {
        &self.leaf_targets
    }

    /// The full modules-by-target mapping.
    pub fn modules_by_target(&self) -> &BTreeMap<CommonizerTarget, Vec<ModuleResult>> {
        &self.modules_by_target
    }

    /// Module outcomes for one target; empty if the target did not
    /// participate.
    pub fn modules_for(&self, target: &CommonizerTarget) -> &[ModuleResult] {
        self.modules_by_target
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
