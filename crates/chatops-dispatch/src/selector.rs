//! Decides whether a repository's pipeline can run without asking the caller.

use chatops_domain::Pipeline;

/// Outcome of pipeline selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineDecision {
    NoPipelines,
    Run(Pipeline),
    AskUser(Vec<Pipeline>),
}

/// Runs the single default pipeline; any other shape asks the caller to choose.
///
/// More than one default breaks the directory invariant and is treated like no
/// default rather than picking one arbitrarily.
pub fn select_pipeline(pipelines: &[Pipeline]) -> PipelineDecision {
    if pipelines.is_empty() {
        return PipelineDecision::NoPipelines;
    }
    let mut defaults = pipelines.iter().filter(|pipeline| pipeline.is_default);
    match (defaults.next(), defaults.next()) {
        (Some(only_default), None) => PipelineDecision::Run(only_default.clone()),
        _ => PipelineDecision::AskUser(pipelines.to_vec()),
    }
}
