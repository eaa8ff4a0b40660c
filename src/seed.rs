//! JSON catalog import.
//!
//! Field types go straight into the store as reference data. Fields and their
//! availability windows go through the engine, so every window is subject to
//! the same validation and overlap rules as a live request.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{Engine, InMemoryStore};
use crate::model::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub field_types: Vec<FieldType>,
    #[serde(default)]
    pub fields: Vec<SeedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedField {
    pub name: String,
    pub size: String,
    pub field_type: u32,
    #[serde(default)]
    pub availabilities: Vec<AvailabilityRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub field_types: usize,
    pub fields_created: usize,
    pub availabilities_created: usize,
    /// One line per rejected entry: what was rejected and why.
    pub rejected: Vec<String>,
}

#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::Io(e) => write!(f, "cannot read seed file: {e}"),
            SeedError::Parse(e) => write!(f, "malformed seed file: {e}"),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Io(e) => Some(e),
            SeedError::Parse(e) => Some(e),
        }
    }
}

impl SeedFile {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        serde_json::from_str(json).map_err(SeedError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(SeedError::Io)?;
        Self::from_json(&json)
    }
}

/// Import `seed`. Rejected entries are recorded in the report; the rest of
/// the catalog still goes in. A rejected field skips its availabilities.
pub async fn apply(engine: &Engine, store: &InMemoryStore, seed: &SeedFile) -> SeedReport {
    let mut report = SeedReport::default();

    let mut seen = HashSet::new();
    for ft in &seed.field_types {
        let problem = if ft.id == 0 {
            Some("id must be positive")
        } else if ft.description.trim().is_empty() {
            Some("description is required")
        } else if !seen.insert(ft.id) {
            Some("duplicate id")
        } else {
            None
        };
        if let Some(problem) = problem {
            reject(&mut report, format!("field type {} {:?}: {problem}", ft.id, ft.description));
            continue;
        }
        store.insert_field_type(FieldType {
            id: ft.id,
            description: ft.description.trim().to_string(),
        });
        report.field_types += 1;
    }

    for entry in &seed.fields {
        let request = FieldRequest {
            name: entry.name.clone(),
            size: entry.size.clone(),
            field_type: entry.field_type,
        };
        let field = match engine.create_field(&request).await {
            Ok(field) => field,
            Err(e) => {
                reject(&mut report, format!("field {:?}: {e}", entry.name));
                continue;
            }
        };
        report.fields_created += 1;

        for av in &entry.availabilities {
            match engine.create_availability(field.id, av).await {
                Ok(_) => report.availabilities_created += 1,
                Err(e) => reject(
                    &mut report,
                    format!(
                        "availability {} {}-{} on {:?}: {e}",
                        av.day, av.open_hour, av.close_hour, entry.name
                    ),
                ),
            }
        }
    }

    info!(
        "seed applied: {} field types, {} fields, {} availabilities, {} rejected",
        report.field_types,
        report.fields_created,
        report.availabilities_created,
        report.rejected.len()
    );
    report
}

fn reject(report: &mut SeedReport, line: String) {
    warn!("seed entry rejected: {line}");
    metrics::counter!(crate::observability::SEED_REJECTED_TOTAL).increment(1);
    report.rejected.push(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "field_types": [
            { "id": 1, "description": "Football 5" },
            { "id": 2, "description": "Football 7" }
        ],
        "fields": [
            {
                "name": "Cancha 1", "size": "Small", "field_type": 1,
                "availabilities": [
                    { "day": "Monday", "open_hour": "08:00", "close_hour": "10:00" },
                    { "day": "Monday", "open_hour": "10:00", "close_hour": "12:00" },
                    { "day": "Monday", "open_hour": "09:00", "close_hour": "11:00" }
                ]
            },
            { "name": "Cancha 2", "size": "Large", "field_type": 9 },
            { "name": "Cancha 3", "size": "Medium", "field_type": 2 }
        ]
    }"#;

    #[tokio::test]
    async fn applies_catalog_and_reports_rejections() {
        let (engine, store) = Engine::in_memory();
        let seed = SeedFile::from_json(CATALOG).unwrap();
        let report = apply(&engine, &store, &seed).await;

        assert_eq!(report.field_types, 2);
        assert_eq!(report.fields_created, 2);
        assert_eq!(report.availabilities_created, 2);
        assert_eq!(report.rejected.len(), 2);
        assert!(report.rejected[0].contains("09:00"));
        assert!(report.rejected[1].contains("Field type not found"));
        assert_eq!(store.availability_count(), 2);
    }

    #[tokio::test]
    async fn rejects_unusable_field_types() {
        let json = r#"{
            "field_types": [
                { "id": 0, "description": "Zero" },
                { "id": 1, "description": "  " },
                { "id": 2, "description": " Paddle " },
                { "id": 2, "description": "Paddle again" }
            ],
            "fields": [{ "name": "Cancha 1", "size": "Small", "field_type": 1 }]
        }"#;
        let (engine, store) = Engine::in_memory();
        let report = apply(&engine, &store, &SeedFile::from_json(json).unwrap()).await;

        assert_eq!(report.field_types, 1);
        assert_eq!(report.fields_created, 0);
        assert_eq!(report.rejected.len(), 4);
        assert!(report.rejected[0].contains("id must be positive"));
        assert!(report.rejected[1].contains("description is required"));
        assert!(report.rejected[2].contains("duplicate id"));
        assert!(report.rejected[3].contains("Field type not found"));

        let paddle = engine.get_field_type_by_id(2).await.unwrap();
        assert_eq!(paddle.description, "Paddle");
    }

    #[test]
    fn missing_sections_default_empty() {
        let seed = SeedFile::from_json("{}").unwrap();
        assert_eq!(seed, SeedFile::default());
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(SeedFile::from_json("{"), Err(SeedError::Parse(_))));
        let bad_time = r#"{"fields":[{"name":"a","size":"b","field_type":1,
            "availabilities":[{"day":"Monday","open_hour":"8am","close_hour":"10:00"}]}]}"#;
        assert!(matches!(SeedFile::from_json(bad_time), Err(SeedError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("fieldbook_test_seed").join("does_not_exist.json");
        assert!(matches!(SeedFile::load(&path), Err(SeedError::Io(_))));
    }
}
