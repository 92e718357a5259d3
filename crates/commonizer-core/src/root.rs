//! Per-target root construction.
//!
//! Every target's intermediate declaration tree is rooted at a [`TargetRoot`]
//! tagged with the builtins implementation it resolves against. Construction
//! enforces the builtins-consistency invariant: a leaf target with a platform
//! must use the native builtins implementation, a platform-less leaf must
//! not. Builtins themselves are resolved lazily, only when first needed.

use std::fmt;
use std::sync::{Arc, OnceLock};

use commonizer_targets::CommonizerTarget;

use crate::error::{CoreError, Result};

/// Class identifier of the platform-specific (native) builtins.
pub const NATIVE_BUILTINS_CLASS: &str = "NativeBuiltIns";

/// Class identifier of the platform-independent builtins.
pub const COMMON_BUILTINS_CLASS: &str = "CommonBuiltIns";

/// The foundational declaration set a target's tree is rooted against.
///
/// Opaque to this crate; constructed elsewhere in the toolchain.
pub trait Builtins: Send + Sync {
    /// The class identifier this implementation answers to.
    fn class_name(&self) -> &str;
}

/// Resolves a builtins implementation for a class identifier.
pub trait BuiltinsProvider: Send + Sync {
    fn load_builtins(&self, builtins_class: &str) -> Arc<dyn Builtins>;
}

/// The root node of one target's declaration tree.
pub struct TargetRoot {
    target: CommonizerTarget,
    builtins_class: String,
    builtins_provider: Arc<dyn BuiltinsProvider>,
    builtins: OnceLock<Arc<dyn Builtins>>,
}

impl TargetRoot {
    /// Build a root for `target`, validating the builtins invariant.
    ///
    /// For a leaf target, the platform association and the builtins class
    /// must agree: a platform is present if and only if `builtins_class` is
    /// [`NATIVE_BUILTINS_CLASS`]. Shared targets accept any class.
    pub fn new(
        target: CommonizerTarget,
        builtins_class: impl Into<String>,
        builtins_provider: Arc<dyn BuiltinsProvider>,
    ) -> Result<Self> {
        let builtins_class = builtins_class.into();
        if let CommonizerTarget::Leaf(leaf) = &target {
            let has_platform = leaf.platform().is_some();
            let is_native = builtins_class == NATIVE_BUILTINS_CLASS;
            if has_platform != is_native {
                return Err(CoreError::BuiltinsMismatch {
                    target: target.identity_string(),
                    builtins_class,
                });
            }
        }
        Ok(TargetRoot {
            target,
            builtins_class,
            builtins_provider,
            builtins: OnceLock::new(),
        })
    }

    /// The target this root belongs to.
    pub fn target(&self) -> &CommonizerTarget {
        &self.target
    }

    /// The builtins class identifier this root was tagged with.
    pub fn builtins_class(&self) -> &str {
        &self.builtins_class
    }

    /// Resolve the builtins, invoking the provider on first call only.
    pub fn builtins(&self) -> Arc<dyn Builtins> {
        self.builtins
            .get_or_init(|| self.builtins_provider.load_builtins(&self.builtins_class))
            .clone()
    }
}

impl fmt::Debug for TargetRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRoot")
            .field("target", &self.target.identity_string())
            .field("builtins_class", &self.builtins_class)
            .field("builtins_resolved", &self.builtins.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use commonizer_targets::{PlatformRegistry, PredefinedPlatforms};

    #[derive(Debug)]
    struct FakeBuiltins {
        class: String,
    }

    impl Builtins for FakeBuiltins {
        fn class_name(&self) -> &str {
            &self.class
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Arc<Self> {
            Arc::new(CountingProvider {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl BuiltinsProvider for CountingProvider {
        fn load_builtins(&self, builtins_class: &str) -> Arc<dyn Builtins> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(FakeBuiltins {
                class: builtins_class.to_string(),
            })
        }
    }

    fn native_leaf() -> CommonizerTarget {
        let platform = PredefinedPlatforms::default().resolve("ios_arm64").unwrap();
        CommonizerTarget::leaf(platform)
    }

    #[test]
    fn native_leaf_requires_native_builtins() {
        let provider = CountingProvider::new();

        let ok = TargetRoot::new(native_leaf(), NATIVE_BUILTINS_CLASS, provider.clone());
        assert!(ok.is_ok());

        let err = TargetRoot::new(native_leaf(), COMMON_BUILTINS_CLASS, provider).unwrap_err();
        match err {
            CoreError::BuiltinsMismatch {
                target,
                builtins_class,
            } => {
                assert_eq!(target, "ios_arm64");
                assert_eq!(builtins_class, COMMON_BUILTINS_CLASS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn platformless_leaf_rejects_native_builtins() {
        let provider = CountingProvider::new();
        let leaf = CommonizerTarget::leaf_without_platform();

        assert!(TargetRoot::new(leaf.clone(), COMMON_BUILTINS_CLASS, provider.clone()).is_ok());
        assert!(matches!(
            TargetRoot::new(leaf, NATIVE_BUILTINS_CLASS, provider),
            Err(CoreError::BuiltinsMismatch { .. })
        ));
    }

    #[test]
    fn shared_target_accepts_any_builtins_class() {
        let registry = PredefinedPlatforms::default();
        let shared = CommonizerTarget::shared([
            CommonizerTarget::leaf(registry.resolve("linux_x64").unwrap()),
            CommonizerTarget::leaf(registry.resolve("macos_x64").unwrap()),
        ])
        .unwrap();
        let provider = CountingProvider::new();

        assert!(TargetRoot::new(shared.clone(), COMMON_BUILTINS_CLASS, provider.clone()).is_ok());
        assert!(TargetRoot::new(shared, NATIVE_BUILTINS_CLASS, provider).is_ok());
    }

    #[test]
    fn builtins_resolution_is_lazy_and_memoized() {
        let provider = CountingProvider::new();
        let root =
            TargetRoot::new(native_leaf(), NATIVE_BUILTINS_CLASS, provider.clone()).unwrap();

        // Not resolved at construction time.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let first = root.builtins();
        assert_eq!(first.class_name(), NATIVE_BUILTINS_CLASS);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let second = root.builtins();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
