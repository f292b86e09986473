//! Orchestration (§2 "System overview" data flow): wires the CFG
//! preprocessor, backward propagator, inference engine, and conflict
//! formatter into one per-package analysis call.

use nilcheck_assert::{FullTrigger, Site};
use nilcheck_base::Symbol;
use nilcheck_cfg::{preprocess, Cfg, TrustedFunctionTable};
use nilcheck_infer::{InferenceEngine, InferredMap};
use nilcheck_propagate::{
    propagate_function, CancellationSignal, FunctionContext, PropagateConfig,
};
use nilcheck_report::{format_conflicts, Diagnostic};
use nilcheck_track::TypeInfo;

use crate::config::Config;
use crate::error::CoreError;

/// One function's raw inputs: an unprocessed CFG plus the frontend-supplied
/// context (declaration id, signature, named returns).
pub struct FunctionUnit {
    pub cfg: Cfg,
    pub context: FunctionContext,
}

pub struct PackageOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub inferred_map: InferredMap,
}

fn propagate_config(config: &Config) -> PropagateConfig {
    PropagateConfig {
        stable_round_limit: config.stable_round_limit,
        ..PropagateConfig::default()
    }
}

/// Runs the CFG preprocessor and backward propagator for one function,
/// returning its resolved full triggers.
pub fn analyze_function(
    unit: &FunctionUnit,
    info: &dyn TypeInfo,
    trusted: &dyn TrustedFunctionTable,
    config: &Config,
    cancel: &dyn CancellationSignal,
) -> Result<Vec<FullTrigger>, CoreError> {
    let pcfg = preprocess(&unit.cfg, trusted, info);
    let outcome = propagate_function(&pcfg, &unit.context, info, &propagate_config(config), cancel)?;
    Ok(outcome.full_triggers)
}

/// Runs every function in `units` through [`analyze_function`], feeds the
/// combined full-trigger set through the inference engine (after importing
/// `upstream` facts), and formats the resulting conflicts.
pub fn analyze_package(
    units: &[FunctionUnit],
    info: &dyn TypeInfo,
    trusted: &dyn TrustedFunctionTable,
    config: &Config,
    upstream: Vec<(Symbol, InferredMap)>,
    cancel: &dyn CancellationSignal,
) -> Result<PackageOutcome, CoreError> {
    let mut all_triggers = Vec::new();
    for unit in units {
        all_triggers.extend(analyze_function(unit, info, trusted, config, cancel)?);
    }

    let mut engine = InferenceEngine::with_mode(config.mode);
    engine.import_upstream(upstream);
    engine.process(all_triggers);

    let diagnostics = format_conflicts(engine.conflicts());
    log::debug!(
        "package analysis: {} diagnostics, {} sites",
        diagnostics.len(),
        engine.map().len()
    );

    Ok(PackageOutcome {
        diagnostics,
        inferred_map: engine.map().clone(),
    })
}

/// §4.6 "Export": runs the same pipeline as [`analyze_package`] but also
/// returns the minimal fact set reachable from `exported_sites`, suitable
/// for encoding via `nilcheck-facts` and publishing to downstream packages.
///
/// Kept distinct from `analyze_package` rather than always computing an
/// export, since `InferenceEngine::export`'s reachability walk is extra work
/// a driver only needs when actually emitting a package's public facts.
pub fn analyze_package_with_export(
    units: &[FunctionUnit],
    info: &dyn TypeInfo,
    trusted: &dyn TrustedFunctionTable,
    config: &Config,
    upstream: Vec<(Symbol, InferredMap)>,
    exported_sites: &[Site],
    cancel: &dyn CancellationSignal,
) -> Result<(PackageOutcome, InferredMap), CoreError> {
    let mut all_triggers = Vec::new();
    for unit in units {
        all_triggers.extend(analyze_function(unit, info, trusted, config, cancel)?);
    }

    let mut engine = InferenceEngine::with_mode(config.mode);
    engine.import_upstream(upstream);
    engine.process(all_triggers);

    let diagnostics = format_conflicts(engine.conflicts());
    let exported = engine.export(exported_sites);

    let outcome = PackageOutcome {
        diagnostics,
        inferred_map: engine.map().clone(),
    };
    Ok((outcome, exported))
}
