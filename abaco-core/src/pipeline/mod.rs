//! The data-quality remediation pipeline.
//!
//! A single synchronous pass per invocation: score the record set, remediate
//! when the score falls below the warn threshold, re-score the remediated
//! set, and distill the action log into a human-readable report. The
//! coordinator degrades gracefully on stage failure; it never crashes the
//! caller.

pub mod coordinator;
pub mod remediation;
pub mod scoring;
pub mod summarizer;

pub use coordinator::{
    PipelineCoordinator, PipelineIssue, PipelineRun, PipelineState, Remediator, RunStatus, Scorer,
};
pub use remediation::{RemediationEngine, RemediationOutcome};
pub use scoring::ScoringEngine;
pub use summarizer::Summarizer;

/// Placeholder written into fields whose value was missing. The scoring
/// engine accepts it as an explicit not-available marker so remediated sets
/// do not re-flag filled fields.
pub const MISSING_VALUE_PLACEHOLDER: &str = "N/A";

/// Field name subject to the format check.
pub(crate) const EMAIL_FIELD: &str = "email";

/// Field name used for duplicate detection.
pub(crate) const ID_FIELD: &str = "id";
