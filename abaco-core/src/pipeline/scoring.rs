//! Data-quality scoring.
//!
//! A single pass over the record set detects duplicate ids, missing values,
//! and malformed email addresses, then converts the defect count into a
//! score in [0, 100]. Scoring is a pure function over its inputs: no side
//! effects, a fresh report per call.

use crate::pipeline::{EMAIL_FIELD, ID_FIELD, MISSING_VALUE_PLACEHOLDER};
use crate::types::{
    Defect, DefectKind, FieldValue, QualityReport, QualityStatus, QualityThresholds, RecordSet,
};
use regex::Regex;
use std::sync::LazyLock;

/// Minimal `local@domain.tld` shape; deliverability is not this layer's
/// concern.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Scores a record set against the defined quality rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score a record set and report its defects.
    ///
    /// An empty record set is a normal result, not an error: score 0.0,
    /// status REJECTED, no defects.
    pub fn score(&self, records: &RecordSet, thresholds: &QualityThresholds) -> QualityReport {
        if records.is_empty() {
            return QualityReport {
                score: 0.0,
                status: QualityStatus::Rejected,
                defects: Vec::new(),
                narrative: "invalid or empty dataset".to_string(),
            };
        }

        let defects = detect_defects(records);
        let score = compute_score(records, defects.len());
        let status = derive_status(score, thresholds);

        tracing::debug!(
            records = records.len(),
            defects = defects.len(),
            score,
            status = %status,
            "Scored record set"
        );

        QualityReport {
            score,
            status,
            narrative: format!("quality score: {:.2}/100 - {}", score, status),
            defects,
        }
    }
}

/// Detect all defects in a single pass, in record order.
fn detect_defects(records: &RecordSet) -> Vec<Defect> {
    let mut defects = Vec::new();
    let mut seen_ids: Vec<FieldValue> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        // Duplicate key check on the id field, when present and non-null.
        if let Some(id) = record.get(ID_FIELD) {
            if !id.is_null() {
                if seen_ids.contains(id) {
                    defects.push(Defect::new(
                        index,
                        ID_FIELD,
                        DefectKind::DuplicateId,
                        Some(id.clone()),
                        format!("Duplicate id '{}' already seen earlier in the set.", id),
                    ));
                } else {
                    seen_ids.push(id.clone());
                }
            }
        }

        for (field, value) in record.iter() {
            if value.is_null() {
                defects.push(Defect::new(
                    index,
                    field,
                    DefectKind::MissingValue,
                    None,
                    format!("Field '{}' has a missing value.", field),
                ));
            } else if field == EMAIL_FIELD {
                if let Some(text) = value.as_str() {
                    if text != MISSING_VALUE_PLACEHOLDER && !EMAIL_PATTERN.is_match(text) {
                        defects.push(Defect::new(
                            index,
                            field,
                            DefectKind::InvalidFormat,
                            Some(value.clone()),
                            format!("Value '{}' is not a valid email address.", text),
                        ));
                    }
                }
            }
        }
    }

    defects
}

/// Convert a defect count into a score in [0, 100], rounded to 2 decimals.
///
/// The denominator is `record_count * field_count_of_first_record`; a zero
/// denominator skips scoring and fixes the score at 100.
fn compute_score(records: &RecordSet, defect_count: usize) -> f64 {
    let field_count = records.get(0).map(|r| r.len()).unwrap_or(0);
    let total_possible = records.len() * field_count;
    if total_possible == 0 {
        return 100.0;
    }

    let penalty_per_defect = 100.0 / total_possible as f64;
    let raw = 100.0 - defect_count as f64 * penalty_per_defect;
    (raw.max(0.0) * 100.0).round() / 100.0
}

fn derive_status(score: f64, thresholds: &QualityThresholds) -> QualityStatus {
    if score == 100.0 {
        QualityStatus::Approved
    } else if score >= thresholds.reject {
        QualityStatus::Warning
    } else {
        QualityStatus::Rejected
    }
}
