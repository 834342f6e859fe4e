//! Persisted bracket record.
//!
//! A bracket is stored as one opaque JSON document. The field names here are
//! the schema a document store keeps, so changes must bump
//! [`SCHEMA_VERSION`] and translate older records.

use super::errors::RecordError;
use super::models::{Bracket, BracketId, Format, GenerationParams, GrandFinal, Match};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current record schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Serialized form of a [`Bracket`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRecord {
    pub schema_version: u32,
    pub id: BracketId,
    pub format: Format,
    pub participant_count: usize,
    pub participants: Vec<String>,
    pub params: GenerationParams,
    pub byes: usize,
    pub grand_final: Option<GrandFinal>,
    pub matches: Vec<Match>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bracket> for BracketRecord {
    fn from(bracket: Bracket) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id: bracket.id,
            format: bracket.format,
            participant_count: bracket.participants.len(),
            participants: bracket.participants,
            params: bracket.params,
            byes: bracket.byes,
            grand_final: bracket.grand_final,
            matches: bracket.matches,
            created_at: bracket.created_at,
            updated_at: bracket.updated_at,
        }
    }
}

impl TryFrom<BracketRecord> for Bracket {
    type Error = RecordError;

    fn try_from(record: BracketRecord) -> Result<Self, Self::Error> {
        if record.schema_version != SCHEMA_VERSION {
            return Err(RecordError::SchemaVersion {
                found: record.schema_version,
                expected: SCHEMA_VERSION,
            });
        }

        let mut bracket = Bracket {
            id: record.id,
            format: record.format,
            participants: record.participants,
            params: record.params,
            byes: record.byes,
            grand_final: record.grand_final,
            created_at: record.created_at,
            updated_at: record.updated_at,
            matches: record.matches,
            index: HashMap::new(),
        };
        bracket.reindex()?;
        Ok(bracket)
    }
}

/// Encode a bracket as a JSON document
pub fn encode(bracket: &Bracket) -> Result<String, RecordError> {
    Ok(serde_json::to_string_pretty(bracket)?)
}

/// Decode and validate a JSON document
pub fn decode(json: &str) -> Result<Bracket, RecordError> {
    let record: BracketRecord = serde_json::from_str(json)?;
    Bracket::try_from(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Team {i}")).collect()
    }

    #[test]
    fn test_record_preserves_graph() {
        let mut bracket = generate(Format::DoubleElim, &labels(8)).unwrap();
        let first = bracket.round(crate::Segment::Winner, 1)[0].id.clone();
        bracket.apply_result(&first, 2, 0, false).unwrap();

        let json = encode(&bracket).unwrap();
        let restored = decode(&json).unwrap();

        assert_eq!(restored.id, bracket.id);
        assert_eq!(restored.matches(), bracket.matches());
        assert_eq!(restored.grand_final, bracket.grand_final);
        assert!(restored.get(&first).unwrap().finished);
    }

    #[test]
    fn test_record_uses_schema_field_names() {
        let bracket = generate(Format::SingleElim, &labels(4)).unwrap();
        let value = serde_json::to_value(&bracket).unwrap();

        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["participantCount"], 4);
        let first = &value["matches"][0];
        assert!(first.get("opponentA").is_some());
        assert!(first.get("matchNumber").is_some());
        assert!(first.get("winnerTarget").is_some());
    }

    #[test]
    fn test_rejects_unknown_schema_version() {
        let bracket = generate(Format::SingleElim, &labels(2)).unwrap();
        let mut value = serde_json::to_value(&bracket).unwrap();
        value["schemaVersion"] = serde_json::json!(99);

        let result = decode(&value.to_string());
        assert!(matches!(
            result,
            Err(RecordError::SchemaVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_rejects_dangling_edges() {
        let bracket = generate(Format::SingleElim, &labels(4)).unwrap();
        let mut value = serde_json::to_value(&bracket).unwrap();
        value["matches"][0]["winnerTarget"]["matchId"] = serde_json::json!("R9-9");

        assert!(matches!(
            decode(&value.to_string()),
            Err(RecordError::DanglingEdge { .. })
        ));
    }
}
