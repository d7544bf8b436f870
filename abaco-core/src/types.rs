//! Core type definitions for the Abaco pipeline.
//!
//! Defines the fundamental data structures used throughout the system:
//! field values, records, defects, quality reports, and action log entries.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar field value. Records tolerate heterogeneous value types per
/// field; JSON `null` maps to `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    String(String),
    Null,
}

impl FieldValue {
    /// Whether this value is the explicit null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the string content if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// An ordered mapping from field name to scalar value.
///
/// Field order is insertion order and is preserved through serialization,
/// so remediated output diffs cleanly against its input. Lookups are linear;
/// records in this domain carry a handful of fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field, replacing the value in place if the field exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Remove a field entirely; the field becomes absent.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Number of fields present in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of field names to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    record.insert(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// An ordered sequence of records sharing a loose schema (field union, not
/// strict). Owned by the caller; pipeline stages return new sets rather than
/// mutating in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Clone the underlying records, e.g. as the base of a remediated copy.
    pub fn to_records(&self) -> Vec<Record> {
        self.records.clone()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// The kind of a detected data-quality defect.
///
/// A closed enum so remediation dispatch is exhaustive: adding a kind is a
/// compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectKind {
    MissingValue,
    InvalidFormat,
    DuplicateId,
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefectKind::MissingValue => write!(f, "MISSING_VALUE"),
            DefectKind::InvalidFormat => write!(f, "INVALID_FORMAT"),
            DefectKind::DuplicateId => write!(f, "DUPLICATE_ID"),
        }
    }
}

/// A detected data-quality issue tied to a specific record and field.
///
/// `record_index` is valid for the RecordSet the defect was derived from;
/// consumers must skip, not crash on, indices that no longer align.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    pub record_index: usize,
    pub field: String,
    pub kind: DefectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    pub message: String,
}

impl Defect {
    pub fn new(
        record_index: usize,
        field: impl Into<String>,
        kind: DefectKind,
        value: Option<FieldValue>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            record_index,
            field: field.into(),
            kind,
            value,
            message: message.into(),
        }
    }
}

/// Quality verdict for a scored record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityStatus {
    Approved,
    Warning,
    Rejected,
}

impl std::fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityStatus::Approved => write!(f, "APPROVED"),
            QualityStatus::Warning => write!(f, "WARNING"),
            QualityStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Result of one scoring pass. Created fresh per call, immutable once
/// returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Quality score in [0, 100], rounded to 2 decimals.
    pub score: f64,
    pub status: QualityStatus,
    pub defects: Vec<Defect>,
    pub narrative: String,
}

/// Score thresholds. `warn` triggers remediation; `reject` is the hard
/// floor. Callers decide whether to block on REJECTED.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub warn: f64,
    pub reject: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            warn: 85.0,
            reject: 70.0,
        }
    }
}

/// One entry in a pipeline run's append-only action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub step_name: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionLogEntry {
    pub fn new(step_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_json_scalars() {
        let parsed: Vec<FieldValue> =
            serde_json::from_str(r#"["hello", 42, 1.5, true, null]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                FieldValue::String("hello".into()),
                FieldValue::Number(42.0),
                FieldValue::Number(1.5),
                FieldValue::Bool(true),
                FieldValue::Null,
            ]
        );
    }

    #[test]
    fn test_field_value_null_serializes_as_json_null() {
        assert_eq!(serde_json::to_string(&FieldValue::Null).unwrap(), "null");
    }

    #[test]
    fn test_record_preserves_insertion_order() {
        let mut record = Record::new();
        record.insert("id", 1i64);
        record.insert("email", "a@b.com");
        record.insert("active", true);

        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "email", "active"]);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":1.0,"email":"a@b.com","active":true}"#);
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = Record::new();
        record.insert("id", 1i64);
        record.insert("email", "bad");
        record.insert("email", FieldValue::Null);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("email"), Some(&FieldValue::Null));
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["id", "email"]);
    }

    #[test]
    fn test_record_remove_makes_field_absent() {
        let mut record = Record::new();
        record.insert("email", "bad");
        assert!(record.contains_field("email"));

        let removed = record.remove("email");
        assert_eq!(removed, Some(FieldValue::String("bad".into())));
        assert!(!record.contains_field("email"));
        assert_eq!(record.get("email"), None);
    }

    #[test]
    fn test_record_set_deserializes_from_json_array() {
        let set: RecordSet =
            serde_json::from_str(r#"[{"id": 1, "email": null}, {"id": 2}]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().get("email"), Some(&FieldValue::Null));
        assert!(!set.get(1).unwrap().contains_field("email"));
    }

    #[test]
    fn test_defect_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&DefectKind::MissingValue).unwrap(),
            r#""MISSING_VALUE""#
        );
        assert_eq!(
            serde_json::to_string(&DefectKind::InvalidFormat).unwrap(),
            r#""INVALID_FORMAT""#
        );
        assert_eq!(
            serde_json::to_string(&DefectKind::DuplicateId).unwrap(),
            r#""DUPLICATE_ID""#
        );
    }

    #[test]
    fn test_quality_status_display() {
        assert_eq!(QualityStatus::Approved.to_string(), "APPROVED");
        assert_eq!(QualityStatus::Warning.to_string(), "WARNING");
        assert_eq!(QualityStatus::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = QualityThresholds::default();
        assert_eq!(thresholds.warn, 85.0);
        assert_eq!(thresholds.reject, 70.0);
    }

    #[test]
    fn test_defect_optional_value_omitted_when_none() {
        let defect = Defect::new(0, "email", DefectKind::MissingValue, None, "missing");
        let json = serde_json::to_string(&defect).unwrap();
        assert!(!json.contains("\"value\""));
    }
}
