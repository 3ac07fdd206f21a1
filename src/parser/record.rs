use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Extension of recognized monster documents
pub const DATA_EXTENSION: &str = "json";

/// One monster document as found in the data directory.
///
/// The scalar attributes are required; the list fields default to empty.
/// Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonsterRecord {
    pub slug: String,
    pub category: String,
    pub shape: String,
    pub stage: String,
    pub height: f64,
    pub weight: f64,
    pub catch_rate: f64,
    pub lower_catch_resistance: f64,
    pub upper_catch_resistance: f64,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub terrains: Vec<String>,
    #[serde(default)]
    pub moveset: Vec<MoveEntry>,
    #[serde(default)]
    pub evolutions: Vec<EvolutionEntry>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoveEntry {
    pub level_learned: i64,
    pub technique: String,
}

/// Evolution into another monster, referenced by slug only
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvolutionEntry {
    #[serde(default)]
    pub at_level: Option<i64>,
    pub monster_slug: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub mon_slug: String,
    pub evo_stage: String,
}

/// Parse a monster document from JSON text
pub fn parse_monster(text: &str) -> serde_json::Result<MonsterRecord> {
    serde_json::from_str(text)
}

/// Read and parse one monster document, naming the file on failure
pub fn parse_monster_file(path: &Path) -> Result<MonsterRecord, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::ReadFile {
        file: path.to_path_buf(),
        source,
    })?;

    parse_monster(&text).map_err(|source| LoadError::Document {
        file: path.to_path_buf(),
        source,
    })
}

/// Whether a path has the monster document extension (case-insensitive)
pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATA_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROCKITTEN: &str = r#"{
        "slug": "rockitten",
        "category": "rock_cat",
        "shape": "brute",
        "stage": "basic",
        "height": 40,
        "weight": 12.5,
        "catch_rate": 100.0,
        "lower_catch_resistance": 0.95,
        "upper_catch_resistance": 1.25,
        "types": ["earth"],
        "moveset": [{"level_learned": 1, "technique": "ram"}],
        "evolutions": [{"at_level": 20, "monster_slug": "rockat", "path": "standard"}],
        "history": [{"mon_slug": "rockitten", "evo_stage": "basic"}]
    }"#;

    #[test]
    fn test_parse_full_document() {
        let record = parse_monster(ROCKITTEN).unwrap();
        assert_eq!(record.slug, "rockitten");
        assert_eq!(record.height, 40.0);
        assert_eq!(record.types, vec!["earth"]);
        assert!(record.tags.is_empty());
        assert!(record.terrains.is_empty());
        assert_eq!(record.moveset[0].technique, "ram");
        assert_eq!(record.evolutions[0].at_level, Some(20));
        assert_eq!(record.evolutions[0].monster_slug, "rockat");
        assert_eq!(record.history[0].evo_stage, "basic");
    }

    #[test]
    fn test_missing_required_key() {
        let err = parse_monster(r#"{"slug": "nameless"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_is_data_file() {
        assert!(is_data_file(Path::new("data/rockitten.json")));
        assert!(is_data_file(Path::new("data/ROCKAT.JSON")));
        assert!(!is_data_file(Path::new("data/readme.md")));
        assert!(!is_data_file(Path::new("data/json")));
    }
}
