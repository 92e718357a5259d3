//! Leaf and shared commonizer targets.
//!
//! A [`CommonizerTarget`] is either a leaf (one platform, or none) or a
//! shared node over a non-empty set of sub-targets. Shared nodes store their
//! sub-targets in a `BTreeSet`, so equality, hashing, and ordering never
//! depend on construction order.

use std::collections::BTreeSet;

use crate::error::{Result, TargetError};
use crate::platform::PlatformId;

/// A target participating in commonization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommonizerTarget {
    /// Exactly one platform (or no platform, for non-native commonization).
    Leaf(LeafTarget),
    /// The union of a set of sub-targets.
    Shared(SharedTarget),
}

/// A leaf target wrapping at most one platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafTarget {
    platform: Option<PlatformId>,
}

/// A shared target: a set-valued tree node over leaf or shared sub-targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedTarget {
    targets: BTreeSet<CommonizerTarget>,
}

impl CommonizerTarget {
    /// Build a leaf target for the given platform.
    pub fn leaf(platform: PlatformId) -> Self {
        CommonizerTarget::Leaf(LeafTarget::new(Some(platform)))
    }

    /// Build a leaf target with no associated platform.
    pub fn leaf_without_platform() -> Self {
        CommonizerTarget::Leaf(LeafTarget::new(None))
    }

    /// Build a shared target over the given sub-targets.
    ///
    /// Fails with [`TargetError::EmptySharedTarget`] when the iterator yields
    /// nothing.
    pub fn shared<I>(sub_targets: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommonizerTarget>,
    {
        let shared = SharedTarget::from_targets(sub_targets);
        if shared.targets.is_empty() {
            return Err(TargetError::EmptySharedTarget);
        }
        Ok(CommonizerTarget::Shared(shared))
    }

    /// All platforms reachable by recursively flattening shared nodes.
    ///
    /// A leaf without a platform contributes nothing.
    pub fn flattened_leaves(&self) -> BTreeSet<PlatformId> {
        let mut leaves = BTreeSet::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, into: &mut BTreeSet<PlatformId>) {
        match self {
            CommonizerTarget::Leaf(leaf) => {
                if let Some(platform) = &leaf.platform {
                    into.insert(platform.clone());
                }
            }
            CommonizerTarget::Shared(shared) => {
                for sub in &shared.targets {
                    sub.collect_leaves(into);
                }
            }
        }
    }
}

impl LeafTarget {
    /// Build a leaf around an optional platform.
    pub fn new(platform: Option<PlatformId>) -> Self {
        LeafTarget { platform }
    }

    /// The associated platform, if any.
    pub fn platform(&self) -> Option<&PlatformId> {
        self.platform.as_ref()
    }
}

impl SharedTarget {
    /// Build a shared target from any iterator of sub-targets.
    ///
    /// Unlike [`CommonizerTarget::shared`], this permits the degenerate
    /// empty or singleton set. Degenerate values only arise as the pre-run
    /// view derived from run parameters with fewer than two targets; they
    /// never survive a `hasAnythingToCommonize` check.
    pub fn from_targets<I>(sub_targets: I) -> Self
    where
        I: IntoIterator<Item = CommonizerTarget>,
    {
        SharedTarget {
            targets: sub_targets.into_iter().collect(),
        }
    }

    /// The direct sub-targets, in structural order.
    pub fn targets(&self) -> &BTreeSet<CommonizerTarget> {
        &self.targets
    }

    /// All platforms reachable by recursively flattening this node.
    pub fn flattened_leaves(&self) -> BTreeSet<PlatformId> {
        let mut leaves = BTreeSet::new();
        for sub in &self.targets {
            sub.collect_leaves(&mut leaves);
        }
        leaves
    }
}

impl From<LeafTarget> for CommonizerTarget {
    fn from(leaf: LeafTarget) -> Self {
        CommonizerTarget::Leaf(leaf)
    }
}

impl From<SharedTarget> for CommonizerTarget {
    fn from(shared: SharedTarget) -> Self {
        CommonizerTarget::Shared(shared)
    }
}
