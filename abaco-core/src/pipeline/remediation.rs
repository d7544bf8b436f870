//! Automated defect remediation.
//!
//! Applies rule-based fixes for the defect kinds automation can resolve.
//! Duplicate ids require business judgment and are deliberately left
//! untouched. Always produces a new record set; the caller's input is never
//! mutated.

use crate::pipeline::{EMAIL_FIELD, MISSING_VALUE_PLACEHOLDER};
use crate::types::{Defect, DefectKind, RecordSet};
use tracing::debug;

/// Result of one remediation pass: the fixed record set and a log of the
/// fixes applied.
#[derive(Debug, Clone)]
pub struct RemediationOutcome {
    pub records: RecordSet,
    pub log: Vec<String>,
}

/// Applies per-defect-kind fixes to a record set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemediationEngine;

impl RemediationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Remediate the given defects, returning a new record set.
    ///
    /// A no-op (input cloned unchanged, empty log) when there are no records
    /// or no defects. Defects whose `record_index` no longer aligns with the
    /// record set are skipped, never an error: scoring and remediation may
    /// observe different generations of the data.
    pub fn remediate(&self, records: &RecordSet, defects: &[Defect]) -> RemediationOutcome {
        if records.is_empty() || defects.is_empty() {
            return RemediationOutcome {
                records: records.clone(),
                log: Vec::new(),
            };
        }

        let mut fixed = records.to_records();
        let mut log = Vec::new();

        for defect in defects {
            let Some(record) = fixed.get_mut(defect.record_index) else {
                debug!(
                    record_index = defect.record_index,
                    field = %defect.field,
                    kind = %defect.kind,
                    "Skipping defect with out-of-range record index"
                );
                continue;
            };

            match defect.kind {
                DefectKind::MissingValue => {
                    record.insert(defect.field.as_str(), MISSING_VALUE_PLACEHOLDER);
                    log.push(format!(
                        "Fixed: Filled missing value in record {} for field '{}'.",
                        defect.record_index, defect.field
                    ));
                }
                DefectKind::InvalidFormat => {
                    if defect.field == EMAIL_FIELD {
                        record.remove(EMAIL_FIELD);
                        log.push(format!(
                            "Fixed: Nullified invalid email in record {}.",
                            defect.record_index
                        ));
                    } else {
                        log.push(format!(
                            "Info: No fix applied for invalid format on field '{}' in record {}.",
                            defect.field, defect.record_index
                        ));
                    }
                }
                // Resolving a duplicate id means deciding which record is
                // authoritative; that is business judgment, not automation.
                DefectKind::DuplicateId => {}
            }
        }

        RemediationOutcome {
            records: RecordSet::new(fixed),
            log,
        }
    }
}
