//! Platform identifiers and the platform registry.
//!
//! A [`PlatformId`] names one concrete compilation target (one OS/architecture
//! pair). The set of valid platforms is supplied by a [`PlatformRegistry`];
//! [`PredefinedPlatforms`] carries the well-known native target table and is
//! what production callers use.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TargetError};

/// The well-known native platform names, in registry order.
const PREDEFINED_PLATFORM_NAMES: &[&str] = &[
    "android_arm32",
    "android_arm64",
    "android_x64",
    "android_x86",
    "ios_arm32",
    "ios_arm64",
    "ios_simulator_arm64",
    "ios_x64",
    "linux_arm32_hfp",
    "linux_arm64",
    "linux_mips32",
    "linux_mipsel32",
    "linux_x64",
    "macos_arm64",
    "macos_x64",
    "mingw_x64",
    "mingw_x86",
    "tvos_arm64",
    "tvos_simulator_arm64",
    "tvos_x64",
    "wasm32",
    "watchos_arm32",
    "watchos_arm64",
    "watchos_simulator_arm64",
    "watchos_x64",
    "watchos_x86",
];

/// An opaque identifier for one concrete compilation target.
///
/// Identity is the name: two `PlatformId`s are equal iff their names are.
/// Names are restricted to ASCII alphanumerics plus `_`, `-`, and `.`, so
/// they can never collide with identity-string delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId {
    name: String,
}

impl PlatformId {
    /// Create a platform identifier, validating the name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TargetError::InvalidPlatformName {
                name,
                detail: "name is empty".into(),
            });
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(TargetError::InvalidPlatformName {
                name: name.clone(),
                detail: format!("character '{bad}' is not allowed"),
            });
        }
        Ok(PlatformId { name })
    }

    /// The stable platform name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Name-based lookup over the enumerable set of known platforms.
///
/// This is the seam to the external platform registry: the target model only
/// needs equality, hashing, and lookup by name.
pub trait PlatformRegistry: Send + Sync {
    /// Look up a platform by its stable name.
    fn find(&self, name: &str) -> Option<PlatformId>;

    /// Enumerate all known platforms.
    fn all(&self) -> Vec<PlatformId>;

    /// Like [`find`](Self::find), but an unknown name is an error.
    fn resolve(&self, name: &str) -> Result<PlatformId> {
        self.find(name).ok_or_else(|| TargetError::UnknownPlatform {
            name: name.to_string(),
        })
    }
}

/// The standard registry of predefined native platforms.
#[derive(Debug, Clone)]
pub struct PredefinedPlatforms {
    by_name: BTreeMap<String, PlatformId>,
}

impl PredefinedPlatforms {
    /// Build a registry from an explicit name list.
    ///
    /// Mostly useful in tests; production callers want [`Default`].
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_name = BTreeMap::new();
        for name in names {
            let id = PlatformId::new(name)?;
            by_name.insert(id.name().to_string(), id);
        }
        Ok(PredefinedPlatforms { by_name })
    }
}

impl Default for PredefinedPlatforms {
    fn default() -> Self {
        // The predefined names are statically valid; no validation round.
        let by_name = PREDEFINED_PLATFORM_NAMES
            .iter()
            .map(|name| (name.to_string(), PlatformId { name: name.to_string() }))
            .collect();
        PredefinedPlatforms { by_name }
    }
}

impl PlatformRegistry for PredefinedPlatforms {
    fn find(&self, name: &str) -> Option<PlatformId> {
        self.by_name.get(name).cloned()
    }

    fn all(&self) -> Vec<PlatformId> {
        self.by_name.values().cloned().collect()
    }
}
