//! Run parameters: one commonization run's configuration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use commonizer_targets::{CommonizerTarget, LeafTarget, SharedTarget};

use crate::error::{CoreError, Result};
use crate::root::BuiltinsProvider;

/// Name and expected location of one logical module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleInfo {
    /// Module name.
    pub name: String,
    /// Where the module's artifact was expected on disk.
    pub original_location: PathBuf,
}

/// Supplies the modules for one target (or the common dependee modules,
/// e.g. a standard library). External seam, opaque to this crate.
pub trait ModulesProvider: Send + Sync {
    fn module_infos(&self) -> Vec<ModuleInfo>;
}

/// The inputs needed to build one leaf target's declaration tree.
pub struct TargetProvider {
    target: LeafTarget,
    builtins_class: String,
    builtins_provider: Arc<dyn BuiltinsProvider>,
    modules_provider: Arc<dyn ModulesProvider>,
}

impl TargetProvider {
    /// Bundle the per-target inputs.
    pub fn new(
        target: LeafTarget,
        builtins_class: impl Into<String>,
        builtins_provider: Arc<dyn BuiltinsProvider>,
        modules_provider: Arc<dyn ModulesProvider>,
    ) -> Self {
        TargetProvider {
            target,
            builtins_class: builtins_class.into(),
            builtins_provider,
            modules_provider,
        }
    }

    /// The leaf target this provider serves.
    pub fn target(&self) -> &LeafTarget {
        &self.target
    }

    /// Builtins class identifier for this target's root.
    pub fn builtins_class(&self) -> &str {
        &self.builtins_class
    }

    /// Builtins resolver for this target's root.
    pub fn builtins_provider(&self) -> &Arc<dyn BuiltinsProvider> {
        &self.builtins_provider
    }

    /// The target's module source.
    pub fn modules_provider(&self) -> &Arc<dyn ModulesProvider> {
        &self.modules_provider
    }
}

impl fmt::Debug for TargetProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetProvider")
            .field("target", &self.target.identity_string())
            .field("builtins_class", &self.builtins_class)
            .finish()
    }
}

/// Configuration of one commonization run.
///
/// Providers are kept in registration order; that order only affects
/// reporting, never identity, since shared-target identity is
/// order-independent. Immutable once registration is complete: the run
/// driver takes `&Parameters` and may share it across worker threads.
#[derive(Default)]
pub struct Parameters {
    target_providers: Vec<TargetProvider>,
    dependee_modules_provider: Option<Arc<dyn ModulesProvider>>,
}

impl Parameters {
    pub fn new() -> Self {
        Parameters::default()
    }

    /// Register a provider under its leaf target.
    ///
    /// Each leaf target may be configured at most once per run.
    pub fn add_target(&mut self, provider: TargetProvider) -> Result<&mut Self> {
        if self
            .target_providers
            .iter()
            .any(|existing| existing.target() == provider.target())
        {
            return Err(CoreError::DuplicateTarget {
                target: provider.target().identity_string(),
            });
        }
        debug!(leaf = %provider.target(), "registered target");
        self.target_providers.push(provider);
        Ok(self)
    }

    /// The registered providers, in registration order.
    pub fn target_providers(&self) -> &[TargetProvider] {
        &self.target_providers
    }

    /// The registered leaf targets, in registration order.
    pub fn leaf_targets(&self) -> Vec<&LeafTarget> {
        self.target_providers.iter().map(TargetProvider::target).collect()
    }

    /// The shared target whose sub-targets are exactly the registered
    /// leaves.
    ///
    /// Always derivable; with zero or one registered targets this is the
    /// degenerate pre-run view used by callers that check
    /// [`has_anything_to_commonize`](Self::has_anything_to_commonize)
    /// before running.
    pub fn shared_target(&self) -> SharedTarget {
        SharedTarget::from_targets(
            self.target_providers
                .iter()
                .map(|provider| CommonizerTarget::Leaf(provider.target().clone())),
        )
    }

    /// Provider of the modules every target depends on (e.g. the standard
    /// library), if configured.
    pub fn dependee_modules_provider(&self) -> Option<&Arc<dyn ModulesProvider>> {
        self.dependee_modules_provider.as_ref()
    }

    /// Set the dependee modules provider. Settable exactly once.
    pub fn set_dependee_modules_provider(
        &mut self,
        provider: Arc<dyn ModulesProvider>,
    ) -> Result<()> {
        if self.dependee_modules_provider.is_some() {
            return Err(CoreError::DependeeProviderAlreadySet);
        }
        self.dependee_modules_provider = Some(provider);
        Ok(())
    }

    /// True iff at least two leaf targets are registered.
    pub fn has_anything_to_commonize(&self) -> bool {
        self.target_providers.len() >= 2
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("target_providers", &self.target_providers)
            .field(
                "has_dependee_modules_provider",
                &self.dependee_modules_provider.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use commonizer_targets::{PlatformRegistry, PredefinedPlatforms};

    use crate::root::{Builtins, COMMON_BUILTINS_CLASS, NATIVE_BUILTINS_CLASS};

    #[derive(Debug)]
    struct FakeBuiltins;

    impl Builtins for FakeBuiltins {
        fn class_name(&self) -> &str {
            NATIVE_BUILTINS_CLASS
        }
    }

    struct FakeBuiltinsProvider;

    impl BuiltinsProvider for FakeBuiltinsProvider {
        fn load_builtins(&self, _builtins_class: &str) -> Arc<dyn Builtins> {
            Arc::new(FakeBuiltins)
        }
    }

    struct NoModules;

    impl ModulesProvider for NoModules {
        fn module_infos(&self) -> Vec<ModuleInfo> {
            Vec::new()
        }
    }

    fn provider(platform_name: &str) -> TargetProvider {
        let platform = PredefinedPlatforms::default().resolve(platform_name).unwrap();
        TargetProvider::new(
            LeafTarget::new(Some(platform)),
            NATIVE_BUILTINS_CLASS,
            Arc::new(FakeBuiltinsProvider),
            Arc::new(NoModules),
        )
    }

    #[test]
    fn nothing_to_commonize_below_two_targets() {
        let mut parameters = Parameters::new();
        assert!(!parameters.has_anything_to_commonize());

        parameters.add_target(provider("linux_x64")).unwrap();
        assert!(!parameters.has_anything_to_commonize());

        parameters.add_target(provider("macos_x64")).unwrap();
        assert!(parameters.has_anything_to_commonize());
    }

    #[test]
    fn duplicate_target_rejected() {
        let mut parameters = Parameters::new();
        parameters.add_target(provider("linux_x64")).unwrap();

        let err = parameters.add_target(provider("linux_x64")).unwrap_err();
        match err {
            CoreError::DuplicateTarget { target } => assert_eq!(target, "linux_x64"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(parameters.target_providers().len(), 1);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut parameters = Parameters::new();
        parameters
            .add_target(provider("macos_x64"))
            .unwrap()
            .add_target(provider("linux_x64"))
            .unwrap()
            .add_target(provider("ios_arm64"))
            .unwrap();

        let names: Vec<_> = parameters
            .leaf_targets()
            .iter()
            .map(|leaf| leaf.identity_string())
            .collect();
        assert_eq!(names, ["macos_x64", "linux_x64", "ios_arm64"]);
    }

    #[test]
    fn shared_target_is_order_independent() {
        let mut forward = Parameters::new();
        forward
            .add_target(provider("linux_x64"))
            .unwrap()
            .add_target(provider("macos_x64"))
            .unwrap();

        let mut backward = Parameters::new();
        backward
            .add_target(provider("macos_x64"))
            .unwrap()
            .add_target(provider("linux_x64"))
            .unwrap();

        assert_eq!(forward.shared_target(), backward.shared_target());
        assert_eq!(
            forward.shared_target().identity_string(),
            "(linux_x64, macos_x64)"
        );
    }

    #[test]
    fn degenerate_shared_target_is_derivable() {
        let parameters = Parameters::new();
        assert!(parameters.shared_target().targets().is_empty());

        let mut one = Parameters::new();
        one.add_target(provider("wasm32")).unwrap();
        assert_eq!(one.shared_target().targets().len(), 1);
    }

    #[test]
    fn dependee_provider_settable_exactly_once() {
        let mut parameters = Parameters::new();
        assert!(parameters.dependee_modules_provider().is_none());

        parameters
            .set_dependee_modules_provider(Arc::new(NoModules))
            .unwrap();
        assert!(parameters.dependee_modules_provider().is_some());

        assert!(matches!(
            parameters.set_dependee_modules_provider(Arc::new(NoModules)),
            Err(CoreError::DependeeProviderAlreadySet)
        ));
    }

    #[test]
    fn platformless_provider_uses_common_builtins() {
        let mut parameters = Parameters::new();
        let provider = TargetProvider::new(
            LeafTarget::new(None),
            COMMON_BUILTINS_CLASS,
            Arc::new(FakeBuiltinsProvider),
            Arc::new(NoModules),
        );
        parameters.add_target(provider).unwrap();
        assert_eq!(parameters.leaf_targets()[0].identity_string(), "*");
    }
}
