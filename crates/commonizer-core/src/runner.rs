//! Run driver: wires parameters, per-target roots, and the merge engine
//! into one commonization run.
//!
//! Per-target work has no cross-target data dependency, so target roots are
//! built on scoped worker threads; the only shared values are the read-only
//! parameters. A failure in any target aborts the whole run. Result assembly
//! waits for all per-target construction, then validates the key-set
//! invariant before a `Commonized` value is returned.

use std::collections::BTreeMap;
use std::thread;

use tracing::{debug, info};

use commonizer_targets::{CommonizerTarget, SharedTarget};

use crate::error::{CoreError, Result};
use crate::parameters::{ModulesProvider, Parameters, TargetProvider};
use crate::result::{CommonizationResult, Commonized, ModuleResult};
use crate::root::TargetRoot;

/// Everything the merge engine receives for one run.
pub struct MergeInput<'a> {
    /// The shared target the run commonizes into.
    pub shared_target: &'a SharedTarget,
    /// One root per configured leaf target, in registration order.
    pub roots: &'a [TargetRoot],
    /// The configured providers, in registration order.
    pub providers: &'a [TargetProvider],
    /// Common dependee modules (e.g. the standard library), if configured.
    pub dependee_modules_provider: Option<&'a dyn ModulesProvider>,
}

/// The declaration merge engine. External seam: how two declarations are
/// judged equal and combined lives outside this crate.
///
/// The produced map must cover every configured leaf target plus the shared
/// target; [`run`] rejects anything else.
pub trait MergeEngine: Sync {
    fn merge(&self, input: MergeInput<'_>)
        -> Result<BTreeMap<CommonizerTarget, Vec<ModuleResult>>>;
}

/// Execute one commonization run.
///
/// Returns [`CommonizationResult::NothingToCommonize`] when fewer than two
/// targets are configured. Otherwise builds every leaf target's root
/// (concurrently, fail-fast), hands them to the engine, and packages the
/// engine's output as a validated [`Commonized`] value.
pub fn run(parameters: &Parameters, engine: &dyn MergeEngine) -> Result<CommonizationResult> {
    if !parameters.has_anything_to_commonize() {
        info!(
            targets = parameters.target_providers().len(),
            "nothing to commonize"
        );
        return Ok(CommonizationResult::NothingToCommonize);
    }

    let shared_target = parameters.shared_target();
    info!(
        shared = %shared_target,
        targets = parameters.target_providers().len(),
        "commonization run started"
    );

    let roots = thread::scope(|scope| -> Result<Vec<TargetRoot>> {
        let handles: Vec<_> = parameters
            .target_providers()
            .iter()
            .map(|provider| {
                scope.spawn(move || -> Result<TargetRoot> {
                    let root = TargetRoot::new(
                        CommonizerTarget::Leaf(provider.target().clone()),
                        provider.builtins_class(),
                        provider.builtins_provider().clone(),
                    )?;
                    debug!(leaf = %provider.target(), "built target root");
                    Ok(root)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })?;

    let modules_by_target = engine.merge(MergeInput {
        shared_target: &shared_target,
        roots: &roots,
        providers: parameters.target_providers(),
        dependee_modules_provider: parameters
            .dependee_modules_provider()
            .map(|provider| provider.as_ref()),
    })?;

    let commonized = Commonized::new(modules_by_target)?;
    if commonized.shared_target() != &shared_target {
        return Err(CoreError::ResultShape {
            detail: format!(
                "engine produced shared target {}, expected {}",
                commonized.shared_target().identity_string(),
                shared_target.identity_string()
            ),
        });
    }

    info!(
        shared = %shared_target,
        modules = commonized
            .modules_by_target()
            .values()
            .map(Vec::len)
            .sum::<usize>(),
        "commonization run finished"
    );
    Ok(CommonizationResult::Commonized(commonized))
}
