//! Pipeline orchestration.
//!
//! Drives one synchronous pass through the state machine
//! `Scoring -> (Clean | Remediating) -> Rescoring -> Summarizing -> Done`,
//! appending an action-log entry for every transition with the score and
//! defect count that justified it.
//!
//! Stage failures are caught at this boundary: the run records a FAILED
//! entry plus an issue and continues with the best-known records. The
//! pipeline degrades gracefully; it never crashes the caller.

use crate::error::PipelineError;
use crate::pipeline::remediation::{RemediationEngine, RemediationOutcome};
use crate::pipeline::scoring::ScoringEngine;
use crate::pipeline::summarizer::Summarizer;
use crate::types::{ActionLogEntry, Defect, QualityReport, QualityThresholds, RecordSet};
use serde::{Deserialize, Serialize};

/// Seam for the scoring stage, so coordinator failure handling is testable
/// with an injected failing stage.
pub trait Scorer: Send + Sync {
    fn score(
        &self,
        records: &RecordSet,
        thresholds: &QualityThresholds,
    ) -> Result<QualityReport, PipelineError>;
}

impl Scorer for ScoringEngine {
    fn score(
        &self,
        records: &RecordSet,
        thresholds: &QualityThresholds,
    ) -> Result<QualityReport, PipelineError> {
        Ok(ScoringEngine::score(self, records, thresholds))
    }
}

/// Seam for the remediation stage.
pub trait Remediator: Send + Sync {
    fn remediate(
        &self,
        records: &RecordSet,
        defects: &[Defect],
    ) -> Result<RemediationOutcome, PipelineError>;
}

impl Remediator for RemediationEngine {
    fn remediate(
        &self,
        records: &RecordSet,
        defects: &[Defect],
    ) -> Result<RemediationOutcome, PipelineError> {
        Ok(RemediationEngine::remediate(self, records, defects))
    }
}

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Scoring,
    Clean,
    Remediating,
    Rescoring,
    Summarizing,
    Done,
}

impl PipelineState {
    fn step_name(&self) -> &'static str {
        match self {
            PipelineState::Scoring => "scoring",
            PipelineState::Clean => "clean",
            PipelineState::Remediating => "remediation",
            PipelineState::Rescoring => "rescoring",
            PipelineState::Summarizing => "summarizing",
            PipelineState::Done => "done",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.step_name())
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Every stage completed.
    Success,
    /// At least one stage failed; the run carries best-effort output.
    Partial,
    /// The initial scoring itself was unavailable.
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Partial => "PARTIAL",
            RunStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// A non-fatal stage failure observed during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineIssue {
    pub stage: String,
    pub message: String,
}

/// Result of one pipeline run: best-known records, the full action log, the
/// rendered report, and every stage failure that was absorbed along the way.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub final_records: RecordSet,
    pub action_log: Vec<ActionLogEntry>,
    pub report: String,
    pub initial_report: Option<QualityReport>,
    pub final_report: Option<QualityReport>,
    pub issues: Vec<PipelineIssue>,
    pub status: RunStatus,
}

/// Step name used for entries recording an absorbed stage failure.
const FAILED_STEP: &str = "FAILED";

/// Orchestrates scoring, conditional remediation, re-scoring, and
/// summarization over one record set.
pub struct PipelineCoordinator {
    scorer: Box<dyn Scorer>,
    remediator: Box<dyn Remediator>,
    summarizer: Summarizer,
}

impl PipelineCoordinator {
    /// Coordinator over the standard engines.
    pub fn new() -> Self {
        Self::with_stages(
            Box::new(ScoringEngine::new()),
            Box::new(RemediationEngine::new()),
        )
    }

    /// Coordinator over injected stages.
    pub fn with_stages(scorer: Box<dyn Scorer>, remediator: Box<dyn Remediator>) -> Self {
        Self {
            scorer,
            remediator,
            summarizer: Summarizer::new(),
        }
    }

    /// Run one pass over the record set.
    ///
    /// Consumes the records; every stage works on owned data, so concurrent
    /// runs share nothing. The returned records are the originals when no
    /// remediation was needed or possible.
    pub fn run(&self, records: RecordSet, thresholds: &QualityThresholds) -> PipelineRun {
        let mut log = RunLog::new();
        let mut issues: Vec<PipelineIssue> = Vec::new();

        log.transition(PipelineState::Scoring, "Action: Assessing data quality.");
        let initial_report = match self.scorer.score(&records, thresholds) {
            Ok(report) => Some(report),
            Err(e) => {
                log.failed(format!(
                    "Scoring failed: {}. Continuing with unscored records.",
                    e
                ));
                issues.push(PipelineIssue {
                    stage: "scoring".to_string(),
                    message: e.to_string(),
                });
                None
            }
        };

        let mut final_records = records;
        let mut final_report = initial_report.clone();

        if let Some(ref initial) = initial_report {
            log.append(
                PipelineState::Scoring.step_name(),
                format!(
                    "Initial status: {} with score {:.2} ({} defects).",
                    initial.status,
                    initial.score,
                    initial.defects.len()
                ),
            );

            if initial.score < thresholds.warn {
                log.transition(
                    PipelineState::Remediating,
                    format!(
                        "Action: Triggering remediation; score {:.2} below warn threshold {:.2}.",
                        initial.score, thresholds.warn
                    ),
                );
                match self.remediator.remediate(&final_records, &initial.defects) {
                    Ok(outcome) => {
                        log.append(
                            PipelineState::Remediating.step_name(),
                            format!("Data cleaning complete: {} fixes applied.", outcome.log.len()),
                        );
                        for line in &outcome.log {
                            log.append(PipelineState::Remediating.step_name(), line.clone());
                        }
                        final_records = outcome.records;
                    }
                    Err(e) => {
                        log.failed(format!(
                            "Remediation failed: {}. Continuing with unremediated records.",
                            e
                        ));
                        issues.push(PipelineIssue {
                            stage: "remediation".to_string(),
                            message: e.to_string(),
                        });
                    }
                }

                log.transition(
                    PipelineState::Rescoring,
                    "Action: Re-assessing data quality after remediation.",
                );
                match self.scorer.score(&final_records, thresholds) {
                    Ok(report) => {
                        log.append(
                            PipelineState::Rescoring.step_name(),
                            format!(
                                "Final status: {} with score {:.2} ({} defects).",
                                report.status,
                                report.score,
                                report.defects.len()
                            ),
                        );
                        final_report = Some(report);
                    }
                    Err(e) => {
                        log.failed(format!("Re-scoring failed: {}.", e));
                        issues.push(PipelineIssue {
                            stage: "rescoring".to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            } else {
                log.transition(
                    PipelineState::Clean,
                    format!(
                        "Result: Data quality acceptable (score {:.2} >= warn threshold {:.2}); no cleaning needed.",
                        initial.score, thresholds.warn
                    ),
                );
            }
        }

        log.transition(
            PipelineState::Summarizing,
            format!("Action: Summarizing {} log entries.", log.entries.len()),
        );
        let report = self.summarizer.summarize(&log.entries);
        log.transition(PipelineState::Done, "Pipeline run complete.");

        let status = if issues.is_empty() {
            RunStatus::Success
        } else if initial_report.is_some() {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };

        PipelineRun {
            final_records,
            action_log: log.entries,
            report,
            initial_report,
            final_report,
            issues,
            status,
        }
    }
}

impl Default for PipelineCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only action log plus the current state, discarded after the run's
/// report is produced unless the caller keeps the returned entries.
struct RunLog {
    entries: Vec<ActionLogEntry>,
    state: PipelineState,
}

impl RunLog {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            state: PipelineState::Scoring,
        }
    }

    fn transition(&mut self, to: PipelineState, detail: impl Into<String>) {
        tracing::info!(from = %self.state, to = %to, "Pipeline transition");
        self.state = to;
        self.append(to.step_name(), detail);
    }

    fn append(&mut self, step_name: &str, detail: impl Into<String>) {
        self.entries.push(ActionLogEntry::new(step_name, detail));
    }

    fn failed(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::error!(state = %self.state, detail = %detail, "Pipeline stage failed");
        self.append(FAILED_STEP, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, Record};

    fn record(pairs: &[(&str, FieldValue)]) -> Record {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    fn clean_set() -> RecordSet {
        RecordSet::new(vec![
            record(&[("id", 1i64.into()), ("email", "a@b.com".into())]),
            record(&[("id", 2i64.into()), ("email", "c@d.org".into())]),
        ])
    }

    fn dirty_set() -> RecordSet {
        RecordSet::new(vec![
            record(&[("id", 1i64.into()), ("email", "a@b.com".into())]),
            record(&[("id", 1i64.into()), ("email", "bad".into())]),
            record(&[("id", 3i64.into()), ("email", FieldValue::Null)]),
        ])
    }

    struct FailingScorer;
    impl Scorer for FailingScorer {
        fn score(
            &self,
            _records: &RecordSet,
            _thresholds: &QualityThresholds,
        ) -> Result<QualityReport, PipelineError> {
            Err(PipelineError::StageFailed {
                stage: "scoring".into(),
                message: "synthetic scorer failure".into(),
            })
        }
    }

    struct FailingRemediator;
    impl Remediator for FailingRemediator {
        fn remediate(
            &self,
            _records: &RecordSet,
            _defects: &[Defect],
        ) -> Result<RemediationOutcome, PipelineError> {
            Err(PipelineError::StageFailed {
                stage: "remediation".into(),
                message: "synthetic remediator failure".into(),
            })
        }
    }

    fn log_details(run: &PipelineRun) -> Vec<&str> {
        run.action_log.iter().map(|e| e.detail.as_str()).collect()
    }

    #[test]
    fn test_clean_path_skips_remediation() {
        let run = PipelineCoordinator::new().run(clean_set(), &QualityThresholds::default());

        assert_eq!(run.status, RunStatus::Success);
        assert!(run.issues.is_empty());
        assert_eq!(run.final_records, clean_set());

        let details = log_details(&run);
        assert!(details.iter().any(|d| d.contains("Initial status: APPROVED")));
        assert!(details.iter().any(|d| d.contains("no cleaning needed")));
        assert!(!details.iter().any(|d| d.contains("Final status")));
        assert!(!details.iter().any(|d| d.contains("Data cleaning complete")));
    }

    #[test]
    fn test_clean_path_final_report_is_initial_report() {
        let run = PipelineCoordinator::new().run(clean_set(), &QualityThresholds::default());
        assert_eq!(run.initial_report, run.final_report);
        assert_eq!(run.final_report.unwrap().score, 100.0);
    }

    #[test]
    fn test_dirty_path_remediates_and_rescores() {
        let run = PipelineCoordinator::new().run(dirty_set(), &QualityThresholds::default());

        assert_eq!(run.status, RunStatus::Success);
        let initial = run.initial_report.as_ref().unwrap();
        assert_eq!(initial.score, 50.0);
        assert_eq!(initial.defects.len(), 3);

        let final_report = run.final_report.as_ref().unwrap();
        assert_eq!(final_report.score, 83.33);
        assert_eq!(final_report.defects.len(), 1);

        // Nullified email gone, missing email filled, duplicate untouched.
        assert!(!run.final_records.get(1).unwrap().contains_field("email"));
        assert_eq!(
            run.final_records.get(2).unwrap().get("email"),
            Some(&FieldValue::String("N/A".into()))
        );
        assert_eq!(
            run.final_records.get(1).unwrap().get("id"),
            Some(&FieldValue::Number(1.0))
        );

        let details = log_details(&run);
        assert!(details.iter().any(|d| d.contains("Initial status: REJECTED")));
        assert!(details.iter().any(|d| d.contains("Data cleaning complete: 2 fixes applied.")));
        assert!(details.iter().any(|d| d.contains("Final status: WARNING")));
    }

    #[test]
    fn test_report_carries_all_three_sections_on_dirty_path() {
        let run = PipelineCoordinator::new().run(dirty_set(), &QualityThresholds::default());
        assert!(run.report.contains("## 1. Initial Quality Assessment"));
        assert!(run.report.contains("## 2. Cleaning Action"));
        assert!(run.report.contains("## 3. Final Quality Verification"));
    }

    #[test]
    fn test_failing_remediator_degrades_to_partial() {
        let coordinator = PipelineCoordinator::with_stages(
            Box::new(ScoringEngine::new()),
            Box::new(FailingRemediator),
        );
        let run = coordinator.run(dirty_set(), &QualityThresholds::default());

        assert_eq!(run.status, RunStatus::Partial);
        assert_eq!(run.issues.len(), 1);
        assert_eq!(run.issues[0].stage, "remediation");
        // Best-known records are the originals.
        assert_eq!(run.final_records, dirty_set());
        // The run still re-scored and summarized.
        assert!(run.final_report.is_some());
        assert_eq!(run.final_report.as_ref().unwrap().score, 50.0);
        assert!(
            run.action_log
                .iter()
                .any(|e| e.step_name == "FAILED" && e.detail.contains("Remediation failed"))
        );
    }

    #[test]
    fn test_failing_scorer_degrades_to_failed() {
        let coordinator = PipelineCoordinator::with_stages(
            Box::new(FailingScorer),
            Box::new(RemediationEngine::new()),
        );
        let run = coordinator.run(dirty_set(), &QualityThresholds::default());

        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.initial_report.is_none());
        assert!(run.final_report.is_none());
        assert_eq!(run.final_records, dirty_set());
        // A report is still produced, even if only header and footer.
        assert!(run.report.starts_with("# Data Processing Report"));
        assert!(
            run.action_log
                .iter()
                .any(|e| e.step_name == "FAILED" && e.detail.contains("synthetic scorer failure"))
        );
    }

    #[test]
    fn test_remediation_triggered_by_warn_not_reject() {
        // One defect over 1x4 fields: score 75, WARNING, below warn 85 ->
        // remediation runs even though the set is not REJECTED.
        let set = RecordSet::new(vec![record(&[
            ("id", 1i64.into()),
            ("email", FieldValue::Null),
            ("name", "Ada".into()),
            ("balance", 1000i64.into()),
        ])]);
        let run = PipelineCoordinator::new().run(set, &QualityThresholds::default());

        assert_eq!(run.initial_report.as_ref().unwrap().score, 75.0);
        assert!(
            run.action_log
                .iter()
                .any(|e| e.detail.contains("Triggering remediation"))
        );
        assert_eq!(run.final_report.as_ref().unwrap().score, 100.0);
    }

    #[test]
    fn test_empty_set_is_rejected_and_rescored_without_fixes() {
        let run = PipelineCoordinator::new().run(RecordSet::default(), &QualityThresholds::default());

        // Score 0 triggers the remediation branch; with no defects the
        // remediation is a no-op and rescoring repeats the rejection.
        assert_eq!(run.status, RunStatus::Success);
        assert_eq!(run.initial_report.as_ref().unwrap().score, 0.0);
        assert_eq!(run.final_report.as_ref().unwrap().score, 0.0);
        let details = log_details(&run);
        assert!(details.iter().any(|d| d.contains("Data cleaning complete: 0 fixes applied.")));
    }

    #[test]
    fn test_every_transition_appends_log_entries() {
        let run = PipelineCoordinator::new().run(dirty_set(), &QualityThresholds::default());
        let steps: Vec<&str> = run.action_log.iter().map(|e| e.step_name.as_str()).collect();
        for expected in ["scoring", "remediation", "rescoring", "summarizing", "done"] {
            assert!(steps.contains(&expected), "missing step {}", expected);
        }
    }
}
