//! Read side: the aggregated monster query and per-monster detail.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::collections::{BTreeSet, HashMap};

use crate::loader::LookupKind;

/// One monster with its type, tag and terrain names
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterRow {
    pub id: i64,
    pub slug: String,
    pub category: String,
    pub shape: String,
    pub stage: String,
    pub height: f64,
    pub weight: f64,
    pub catch_rate: f64,
    pub lower_catch_resistance: f64,
    pub upper_catch_resistance: f64,
    pub types: Vec<String>,
    pub tags: Vec<String>,
    pub terrains: Vec<String>,
}

impl MonsterRow {
    pub fn values(&self, kind: LookupKind) -> &[String] {
        match kind {
            LookupKind::Type => &self.types,
            LookupKind::Tag => &self.tags,
            LookupKind::Terrain => &self.terrains,
        }
    }

    /// Slug with its first letter capitalized
    pub fn display_name(&self) -> String {
        let mut chars = self.slug.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

// Each list is a correlated scalar subquery so monsters without links still
// produce a row, with '[]' for the empty category.
const MONSTERS_SQL: &str = "
    SELECT m.id, m.slug, m.category, m.shape, m.stage, m.height, m.weight, m.catch_rate,
           m.lower_catch_resistance, m.upper_catch_resistance,
           (SELECT json_group_array(DISTINCT t.name)
              FROM monster_types mt JOIN types t ON t.id = mt.type_id
             WHERE mt.monster_id = m.id) AS types,
           (SELECT json_group_array(DISTINCT tg.name)
              FROM monster_tags mtg JOIN tags tg ON tg.id = mtg.tag_id
             WHERE mtg.monster_id = m.id) AS tags,
           (SELECT json_group_array(DISTINCT tr.name)
              FROM monster_terrains mtr JOIN terrains tr ON tr.id = mtr.terrain_id
             WHERE mtr.monster_id = m.id) AS terrains
      FROM monsters m
     ORDER BY m.slug";

/// Fetch one row per monster, sorted by slug
pub fn fetch_monsters(conn: &Connection) -> rusqlite::Result<Vec<MonsterRow>> {
    let mut stmt = conn.prepare(MONSTERS_SQL)?;
    let rows = stmt.query_map([], row_to_monster)?;
    rows.collect()
}

fn row_to_monster(row: &Row<'_>) -> rusqlite::Result<MonsterRow> {
    Ok(MonsterRow {
        id: row.get("id")?,
        slug: row.get("slug")?,
        category: row.get("category")?,
        shape: row.get("shape")?,
        stage: row.get("stage")?,
        height: row.get("height")?,
        weight: row.get("weight")?,
        catch_rate: row.get("catch_rate")?,
        lower_catch_resistance: row.get("lower_catch_resistance")?,
        upper_catch_resistance: row.get("upper_catch_resistance")?,
        types: json_list(row, "types")?,
        tags: json_list(row, "tags")?,
        terrains: json_list(row, "terrains")?,
    })
}

/// Decode a `json_group_array` column into a sorted list
fn json_list(row: &Row<'_>, column: &str) -> rusqlite::Result<Vec<String>> {
    let text: Option<String> = row.get(column)?;
    let Some(text) = text else {
        return Ok(Vec::new());
    };

    let mut values: Vec<String> = serde_json::from_str(&text).map_err(|e| {
        let idx = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })?;
    values.sort();
    Ok(values)
}

/// The aggregated monster set with lookups by slug and id
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<MonsterRow>,
    by_slug: HashMap<String, usize>,
    by_id: HashMap<i64, usize>,
}

impl Dataset {
    pub fn new(rows: Vec<MonsterRow>) -> Self {
        let by_slug = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.slug.clone(), idx))
            .collect();
        let by_id = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.id, idx))
            .collect();

        Self {
            rows,
            by_slug,
            by_id,
        }
    }

    pub fn fetch(conn: &Connection) -> rusqlite::Result<Self> {
        Ok(Self::new(fetch_monsters(conn)?))
    }

    pub fn rows(&self) -> &[MonsterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a slug, including weak references from evolutions and history
    pub fn by_slug(&self, slug: &str) -> Option<&MonsterRow> {
        self.by_slug.get(slug).map(|&idx| &self.rows[idx])
    }

    pub fn by_id(&self, id: i64) -> Option<&MonsterRow> {
        self.by_id.get(&id).map(|&idx| &self.rows[idx])
    }

    /// Sorted distinct values of one category across all monsters
    pub fn options(&self, kind: LookupKind) -> Vec<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.values(kind))
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveRow {
    pub level_learned: i64,
    pub technique: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionRow {
    pub at_level: Option<i64>,
    pub evolves_to_slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub mon_slug: String,
    pub evo_stage: String,
}

/// Auxiliary rows of one monster, in load order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterDetail {
    pub moveset: Vec<MoveRow>,
    pub evolutions: Vec<EvolutionRow>,
    pub history: Vec<HistoryRow>,
}

impl MonsterDetail {
    /// Pair each evolution with its target, when the target is loaded
    pub fn resolved_evolutions<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> Vec<(&'a EvolutionRow, Option<&'a MonsterRow>)> {
        self.evolutions
            .iter()
            .map(|evo| (evo, dataset.by_slug(&evo.evolves_to_slug)))
            .collect()
    }
}

pub fn fetch_detail(conn: &Connection, monster_id: i64) -> rusqlite::Result<MonsterDetail> {
    let moveset = conn
        .prepare_cached(
            "SELECT level_learned, technique FROM movesets WHERE monster_id = ?1 ORDER BY id",
        )?
        .query_map(params![monster_id], |row| {
            Ok(MoveRow {
                level_learned: row.get(0)?,
                technique: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;

    let evolutions = conn
        .prepare_cached(
            "SELECT at_level, evolves_to_slug FROM evolutions WHERE monster_id = ?1 ORDER BY id",
        )?
        .query_map(params![monster_id], |row| {
            Ok(EvolutionRow {
                at_level: row.get(0)?,
                evolves_to_slug: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;

    let history = conn
        .prepare_cached(
            "SELECT mon_slug, evo_stage FROM history WHERE monster_id = ?1 ORDER BY id",
        )?
        .query_map(params![monster_id], |row| {
            Ok(HistoryRow {
                mon_slug: row.get(0)?,
                evo_stage: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()?;

    Ok(MonsterDetail {
        moveset,
        evolutions,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::loader::{apply_monster, LoadSummary};
    use crate::parser::parse_monster;

    fn load(db: &Database, json: &str) -> i64 {
        let record = parse_monster(json).unwrap();
        apply_monster(db.conn(), &record, &mut LoadSummary::default()).unwrap()
    }

    fn doc(slug: &str, lists: &str) -> String {
        format!(
            r#"{{"slug": "{slug}", "category": "c", "shape": "s", "stage": "basic",
                "height": 10, "weight": 5, "catch_rate": 50,
                "lower_catch_resistance": 1, "upper_catch_resistance": 1{lists}}}"#
        )
    }

    #[test]
    fn test_monster_without_links_has_empty_lists() {
        let db = Database::open_in_memory().unwrap();
        load(&db, &doc("bare", ""));

        let rows = fetch_monsters(db.conn()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].types.is_empty());
        assert!(rows[0].tags.is_empty());
        assert!(rows[0].terrains.is_empty());
    }

    #[test]
    fn test_one_row_per_monster_sorted_by_slug() {
        let db = Database::open_in_memory().unwrap();
        load(
            &db,
            &doc(
                "zeta",
                r#", "types": ["fire", "earth"], "tags": ["a", "b"], "terrains": ["x", "y"]"#,
            ),
        );
        load(&db, &doc("alpha", r#", "types": ["fire"]"#));

        let rows = fetch_monsters(db.conn()).unwrap();
        let slugs: Vec<_> = rows.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "zeta"]);
        assert_eq!(rows[1].types, vec!["earth", "fire"]);
        assert_eq!(rows[1].tags, vec!["a", "b"]);
        assert_eq!(rows[1].terrains, vec!["x", "y"]);
    }

    #[test]
    fn test_dataset_options_and_lookups() {
        let db = Database::open_in_memory().unwrap();
        load(&db, &doc("one", r#", "types": ["water", "fire"]"#));
        load(&db, &doc("two", r#", "types": ["fire"]"#));

        let dataset = Dataset::fetch(db.conn()).unwrap();
        assert_eq!(dataset.options(LookupKind::Type), vec!["fire", "water"]);
        assert!(dataset.options(LookupKind::Tag).is_empty());
        let two = dataset.by_slug("two").unwrap();
        assert_eq!(dataset.by_id(two.id).unwrap().slug, "two");
        assert!(dataset.by_slug("three").is_none());
    }

    #[test]
    fn test_detail_resolves_evolutions_lazily() {
        let db = Database::open_in_memory().unwrap();
        let id = load(
            &db,
            &doc(
                "baby",
                r#", "moveset": [{"level_learned": 1, "technique": "tackle"},
                                  {"level_learned": 5, "technique": "bite"}],
                    "evolutions": [{"at_level": 16, "monster_slug": "grown"},
                                   {"at_level": 30, "monster_slug": "missing"}],
                    "history": [{"mon_slug": "baby", "evo_stage": "basic"}]"#,
            ),
        );
        load(&db, &doc("grown", ""));

        let dataset = Dataset::fetch(db.conn()).unwrap();
        let detail = fetch_detail(db.conn(), id).unwrap();
        let techniques: Vec<_> = detail.moveset.iter().map(|m| m.technique.as_str()).collect();
        assert_eq!(techniques, vec!["tackle", "bite"]);

        let resolved = detail.resolved_evolutions(&dataset);
        assert_eq!(resolved[0].1.map(|m| m.slug.as_str()), Some("grown"));
        assert!(resolved[1].1.is_none());
        assert_eq!(detail.history[0].evo_stage, "basic");
    }

    #[test]
    fn test_display_name() {
        let db = Database::open_in_memory().unwrap();
        load(&db, &doc("rockitten", ""));
        let rows = fetch_monsters(db.conn()).unwrap();
        assert_eq!(rows[0].display_name(), "Rockitten");
    }
}
