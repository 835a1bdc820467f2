use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::migration::migrate_document;
use super::SAVE_VERSION;
use crate::career::Career;
use crate::error::{CareerError, Result};

/// Top-level shape of a career document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerDocument {
    pub schema_version: u32,
    pub career: Career,
}

#[derive(Serialize)]
struct CareerDocumentRef<'a> {
    schema_version: u32,
    career: &'a Career,
}

/// Pretty-printed JSON document for `career`.
pub fn encode(career: &Career) -> Result<String> {
    let doc = CareerDocumentRef { schema_version: SAVE_VERSION, career };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parses, migrates and validates a career document.
///
/// Unknown fields are ignored. A missing or mistyped required field, or a
/// table that does not add up to the played fixtures, is `MalformedData`.
pub fn decode(document: &str) -> Result<Career> {
    let raw: Value = serde_json::from_str(document)?;
    let current = migrate_document(raw)?;
    let doc: CareerDocument = serde_json::from_value(current)
        .map_err(|e| CareerError::MalformedData(format!("career document: {}", e)))?;
    doc.career.validate()?;
    doc.career.check_invariants().map_err(|e| match e {
        CareerError::SimulationInvariant(msg) => CareerError::MalformedData(msg),
        other => other,
    })?;
    Ok(doc.career)
}
