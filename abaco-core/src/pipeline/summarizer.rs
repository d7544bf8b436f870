//! Action-log summarization.
//!
//! Deterministic text assembly: no model calls. The first log line carrying
//! each known marker populates a fixed-section Markdown report; sections
//! whose marker never appeared are omitted rather than left as placeholders.

use crate::types::ActionLogEntry;

const INITIAL_MARKER: &str = "Initial status";
const CLEANING_MARKER: &str = "Data cleaning complete";
const FINAL_MARKER: &str = "Final status";

/// Converts a pipeline action log into a human-readable report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summarizer;

impl Summarizer {
    pub fn new() -> Self {
        Self
    }

    /// Render the fixed-section Markdown report.
    pub fn summarize(&self, action_log: &[ActionLogEntry]) -> String {
        let first_matching = |marker: &str| {
            action_log
                .iter()
                .find(|entry| entry.detail.contains(marker))
                .map(|entry| entry.detail.trim().to_string())
        };

        let mut sections = vec!["# Data Processing Report".to_string(), "---".to_string()];

        if let Some(line) = first_matching(INITIAL_MARKER) {
            sections.push(format!("## 1. Initial Quality Assessment\n- {}", line));
        }
        if let Some(line) = first_matching(CLEANING_MARKER) {
            sections.push(format!("\n## 2. Cleaning Action\n- {}", line));
        }
        if let Some(line) = first_matching(FINAL_MARKER) {
            sections.push(format!("\n## 3. Final Quality Verification\n- {}", line));
        }

        sections.push("\n---\n**End of Report.**".to_string());
        sections.join("\n")
    }
}
