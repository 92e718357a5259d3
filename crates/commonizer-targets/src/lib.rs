//! Commonizer target model.
//!
//! Defines the two kinds of commonizer targets and their canonical textual
//! form:
//! - **Leaf targets** represent exactly one platform (or no platform at all,
//!   for non-native commonization).
//! - **Shared targets** represent the union of a set of sub-targets, which
//!   may themselves be leaf or shared, forming a tree.
//!
//! Shared-target equality is set-based: the same sub-targets in any
//! construction order produce the same value and the same identity string.

pub mod error;
pub mod identity;
pub mod platform;
pub mod target;

// Re-exports for convenience.
pub use error::{Result, TargetError};
pub use identity::{parse_identity_string, NO_PLATFORM_SENTINEL};
pub use platform::{PlatformId, PlatformRegistry, PredefinedPlatforms};
pub use target::{CommonizerTarget, LeafTarget, SharedTarget};
