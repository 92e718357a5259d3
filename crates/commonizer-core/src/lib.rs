//! Commonizer run orchestration.
//!
//! Given the same library built separately for several native targets,
//! commonization determines which declarations are structurally identical
//! across the targets and produces one shared declaration set plus
//! per-target leftovers. This crate carries the orchestration core around
//! that process:
//!
//! - [`FilesRepository`] partitions library artifacts by the exact target
//!   set their manifests declare;
//! - [`Parameters`] configures one run (one provider per leaf target,
//!   optional dependee modules);
//! - [`TargetRoot`] roots each target's declaration tree and enforces the
//!   builtins-consistency invariant;
//! - [`run`] drives a run against an external [`MergeEngine`] and packages
//!   the outcome as a validated [`CommonizationResult`].
//!
//! The declaration merge algorithm itself, archive parsing, and builtins
//! construction are external collaborators behind trait seams.

pub mod error;
pub mod library;
pub mod parameters;
pub mod repository;
pub mod result;
pub mod root;
pub mod runner;

// Re-exports for convenience.
pub use error::{CoreError, LoadFailure, Result};
pub use library::{LibraryLoader, LibraryManifest, ManifestFileLoader, NativeLibrary};
pub use parameters::{ModuleInfo, ModulesProvider, Parameters, TargetProvider};
pub use repository::{FilesRepository, Repository, TargetSetKey};
pub use result::{CommonizationResult, Commonized, ModuleDeclaration, ModuleResult};
pub use root::{
    Builtins, BuiltinsProvider, TargetRoot, COMMON_BUILTINS_CLASS, NATIVE_BUILTINS_CLASS,
};
pub use runner::{run, MergeEngine, MergeInput};
