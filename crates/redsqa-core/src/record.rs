//! Incident record types.
//!
//! Records arrive from an external ingestion collaborator as rows with four
//! columns: `id` (the REDS number), `declared_code`, `declared_category`,
//! and `narrative`. Any field may be absent in the source data; only the id
//! is mandatory. [`RawRecord`] is the wire shape, [`IncidentRecord`] the
//! validated, immutable form the engine consumes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is missing its identifier")]
    MissingId,
}

/// A row as ingested, before validation. Field aliases accept the source
/// system's original column names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "reds")]
    pub id: Option<String>,
    #[serde(default, alias = "natureza_codigo")]
    pub declared_code: Option<String>,
    #[serde(default, alias = "natureza")]
    pub declared_category: Option<String>,
    #[serde(default, alias = "historico")]
    pub narrative: Option<String>,
}

/// A validated incident record. Immutable once constructed.
///
/// Missing narrative or category become empty strings; a missing or blank id
/// makes the row malformed and it is rejected, not defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: String,
    pub declared_code: String,
    pub declared_category: String,
    pub narrative: String,
}

impl IncidentRecord {
    pub fn from_raw(raw: RawRecord) -> Result<Self, RecordError> {
        let id = raw
            .id
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .ok_or(RecordError::MissingId)?;

        Ok(Self {
            id,
            declared_code: raw
                .declared_code
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_default(),
            declared_category: raw
                .declared_category
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_default(),
            narrative: raw.narrative.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<&str>, code: Option<&str>, narrative: Option<&str>) -> RawRecord {
        RawRecord {
            id: id.map(Into::into),
            declared_code: code.map(Into::into),
            declared_category: None,
            narrative: narrative.map(Into::into),
        }
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let rec = IncidentRecord::from_raw(raw(Some("2024-001"), None, None)).unwrap();
        assert_eq!(rec.id, "2024-001");
        assert_eq!(rec.declared_code, "");
        assert_eq!(rec.declared_category, "");
        assert_eq!(rec.narrative, "");
    }

    #[test]
    fn code_is_uppercased() {
        let rec = IncidentRecord::from_raw(raw(Some("r1"), Some("c01155"), None)).unwrap();
        assert_eq!(rec.declared_code, "C01155");
    }

    #[test]
    fn missing_id_is_malformed() {
        assert_eq!(
            IncidentRecord::from_raw(raw(None, Some("C01155"), Some("texto"))),
            Err(RecordError::MissingId)
        );
    }

    #[test]
    fn blank_id_is_malformed() {
        assert_eq!(
            IncidentRecord::from_raw(raw(Some("   "), None, None)),
            Err(RecordError::MissingId)
        );
    }

    #[test]
    fn deserializes_source_column_names() {
        let json = r#"{"reds": "R7", "natureza_codigo": "C01157",
                       "natureza": "ROUBO", "historico": "assalto a mão armada"}"#;
        let raw: RawRecord = serde_json::from_str(json).unwrap();
        let rec = IncidentRecord::from_raw(raw).unwrap();
        assert_eq!(rec.id, "R7");
        assert_eq!(rec.declared_code, "C01157");
        assert_eq!(rec.narrative, "assalto a mão armada");
    }
}
