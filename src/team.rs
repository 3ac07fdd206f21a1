//! Team builder: selection of up to six monsters, summary stats, persistence.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::TeamError;
use crate::query::{Dataset, MonsterRow};

/// Largest team the builder accepts
pub const MAX_TEAM_SIZE: usize = 6;

/// Ordered set of monster slugs, at most [`MAX_TEAM_SIZE`] long
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSelection {
    slugs: Vec<String>,
}

impl TeamSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from slugs, ignoring repeats
    pub fn from_slugs<I, S>(slugs: I) -> Result<Self, TeamError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for slug in slugs {
            selection.add(slug)?;
        }
        Ok(selection)
    }

    /// Add a slug. Adding one already present is a no-op.
    pub fn add(&mut self, slug: impl Into<String>) -> Result<(), TeamError> {
        let slug = slug.into();
        if self.contains(&slug) {
            return Ok(());
        }
        if self.slugs.len() >= MAX_TEAM_SIZE {
            return Err(TeamError::TooManyMembers { max: MAX_TEAM_SIZE });
        }
        self.slugs.push(slug);
        Ok(())
    }

    pub fn remove(&mut self, slug: &str) -> bool {
        let before = self.slugs.len();
        self.slugs.retain(|s| s != slug);
        self.slugs.len() != before
    }

    /// Add if absent, remove if present
    pub fn toggle(&mut self, slug: &str) -> Result<bool, TeamError> {
        if self.remove(slug) {
            Ok(false)
        } else {
            self.add(slug)?;
            Ok(true)
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.iter().any(|s| s == slug)
    }

    pub fn slugs(&self) -> &[String] {
        &self.slugs
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    pub fn clear(&mut self) {
        self.slugs.clear();
    }

    /// Resolve every slug against the dataset
    pub fn resolve<'a>(&self, dataset: &'a Dataset) -> Result<Vec<&'a MonsterRow>, TeamError> {
        self.slugs
            .iter()
            .map(|slug| {
                dataset
                    .by_slug(slug)
                    .ok_or_else(|| TeamError::UnknownMonster(slug.clone()))
            })
            .collect()
    }
}

/// Mean height, weight and catch rate of a team
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamStats {
    pub avg_height: f64,
    pub avg_weight: f64,
    pub avg_catch_rate: f64,
}

impl TeamStats {
    /// `None` for an empty team
    pub fn compute(members: &[&MonsterRow]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        let n = members.len() as f64;
        let mean = |f: fn(&MonsterRow) -> f64| members.iter().map(|&m| f(m)).sum::<f64>() / n;

        Some(Self {
            avg_height: mean(|m| m.height),
            avg_weight: mean(|m| m.weight),
            avg_catch_rate: mean(|m| m.catch_rate),
        })
    }

    /// Labelled means formatted to one decimal place
    pub fn display_fields(&self) -> [(&'static str, String); 3] {
        [
            ("Average Height", format!("{:.1} cm", self.avg_height)),
            ("Average Weight", format!("{:.1} kg", self.avg_weight)),
            ("Average Catch Rate", format!("{:.1}", self.avg_catch_rate)),
        ]
    }
}

/// A saved team, as listed for loading
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub id: i64,
    pub team_name: String,
    pub created_at: DateTime<Utc>,
}

/// Persist a named team and its members in one transaction.
///
/// User-input errors are detected before anything is written.
pub fn save_team(
    conn: &Connection,
    dataset: &Dataset,
    name: &str,
    selection: &TeamSelection,
) -> Result<i64, TeamError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TeamError::EmptyName);
    }
    if selection.is_empty() {
        return Err(TeamError::NoMembers);
    }
    let members = selection.resolve(dataset)?;

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO teams (team_name, created_at) VALUES (?1, ?2)",
        params![name, created_at],
    )?;
    let team_id = tx.last_insert_rowid();
    {
        let mut stmt =
            tx.prepare_cached("INSERT INTO team_members (team_id, monster_id) VALUES (?1, ?2)")?;
        for member in &members {
            stmt.execute(params![team_id, member.id])?;
        }
    }
    tx.commit()?;

    info!(team_id, team = name, members = members.len(), "saved team");
    Ok(team_id)
}

/// Monsters of a saved team, resolved against the loaded dataset
pub fn load_team<'a>(
    conn: &Connection,
    dataset: &'a Dataset,
    team_id: i64,
) -> Result<Vec<&'a MonsterRow>, TeamError> {
    let exists = conn
        .query_row("SELECT 1 FROM teams WHERE id = ?1", params![team_id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Err(TeamError::NotFound(team_id));
    }

    let mut stmt =
        conn.prepare_cached("SELECT monster_id FROM team_members WHERE team_id = ?1")?;
    let ids = stmt
        .query_map(params![team_id], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(ids.into_iter().filter_map(|id| dataset.by_id(id)).collect())
}

/// Saved teams, most recent first
pub fn list_teams(conn: &Connection) -> Result<Vec<TeamSummary>, TeamError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, team_name, created_at FROM teams ORDER BY created_at DESC, id DESC",
    )?;
    let teams = stmt
        .query_map([], |row| {
            let created_at: String = row.get(2)?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
            Ok(TeamSummary {
                id: row.get(0)?,
                team_name: row.get(1)?,
                created_at,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::loader::{apply_monster, LoadSummary};
    use crate::parser::parse_monster;

    fn setup(monsters: &[(&str, f64, f64, f64)]) -> (Database, Dataset) {
        let db = Database::open_in_memory().unwrap();
        for (slug, height, weight, catch_rate) in monsters {
            let record = parse_monster(&format!(
                r#"{{"slug": "{slug}", "category": "c", "shape": "s", "stage": "basic",
                    "height": {height}, "weight": {weight}, "catch_rate": {catch_rate},
                    "lower_catch_resistance": 1, "upper_catch_resistance": 1}}"#
            ))
            .unwrap();
            apply_monster(db.conn(), &record, &mut LoadSummary::default()).unwrap();
        }
        let dataset = Dataset::fetch(db.conn()).unwrap();
        (db, dataset)
    }

    #[test]
    fn test_selection_caps_at_six() {
        let mut selection =
            TeamSelection::from_slugs(["a", "b", "c", "d", "e", "f"]).unwrap();
        assert!(matches!(
            selection.add("g"),
            Err(TeamError::TooManyMembers { max: 6 })
        ));
        // Re-adding an existing member is not an overflow
        selection.add("a").unwrap();
        assert_eq!(selection.len(), 6);
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = TeamSelection::new();
        assert!(selection.toggle("a").unwrap());
        assert!(!selection.toggle("a").unwrap());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_stats_mean() {
        let (_db, dataset) = setup(&[
            ("a", 10.0, 1.0, 100.0),
            ("b", 20.0, 2.0, 50.0),
            ("c", 30.0, 4.0, 25.0),
        ]);
        let selection = TeamSelection::from_slugs(["a", "b", "c"]).unwrap();
        let members = selection.resolve(&dataset).unwrap();
        let stats = TeamStats::compute(&members).unwrap();
        assert_eq!(stats.avg_height, 20.0);

        let fields = stats.display_fields();
        assert_eq!(fields[0].1, "20.0 cm");
        assert_eq!(fields[1].1, "2.3 kg");
        assert_eq!(fields[2].1, "58.3");
    }

    #[test]
    fn test_stats_display_ties_round_to_even() {
        let (_db, dataset) = setup(&[("a", 1.0, 0.2, 1.0), ("b", 1.0, 0.3, 1.0)]);
        let selection = TeamSelection::from_slugs(["a", "b"]).unwrap();
        let members = selection.resolve(&dataset).unwrap();
        let stats = TeamStats::compute(&members).unwrap();

        assert_eq!(stats.avg_weight, 0.25);
        assert_eq!(stats.display_fields()[1].1, "0.2 kg");
    }

    #[test]
    fn test_failed_member_insert_rolls_back_team() {
        let (db, dataset) = setup(&[("a", 1.0, 1.0, 1.0), ("b", 1.0, 1.0, 1.0)]);
        // The dataset still lists "b", but its row is gone
        db.conn()
            .execute("DELETE FROM monsters WHERE slug = 'b'", [])
            .unwrap();

        let selection = TeamSelection::from_slugs(["a", "b"]).unwrap();
        let err = save_team(db.conn(), &dataset, "Stale", &selection).unwrap_err();
        assert!(matches!(err, TeamError::Store(_)));
        assert!(!err.is_user_error());

        assert_eq!(db.count("teams").unwrap(), 0);
        assert_eq!(db.count("team_members").unwrap(), 0);
    }

    #[test]
    fn test_stats_empty_team() {
        assert!(TeamStats::compute(&[]).is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (db, dataset) = setup(&[
            ("a", 1.0, 1.0, 1.0),
            ("b", 1.0, 1.0, 1.0),
            ("c", 1.0, 1.0, 1.0),
            ("d", 1.0, 1.0, 1.0),
        ]);
        let selection = TeamSelection::from_slugs(["a", "b", "c"]).unwrap();
        let id = save_team(db.conn(), &dataset, "Alpha", &selection).unwrap();

        assert_eq!(db.count("teams").unwrap(), 1);
        assert_eq!(db.count("team_members").unwrap(), 3);

        let mut slugs: Vec<_> = load_team(db.conn(), &dataset, id)
            .unwrap()
            .into_iter()
            .map(|m| m.slug.as_str())
            .collect();
        slugs.sort();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_name_writes_nothing() {
        let (db, dataset) = setup(&[("a", 1.0, 1.0, 1.0)]);
        let selection = TeamSelection::from_slugs(["a"]).unwrap();
        let err = save_team(db.conn(), &dataset, "   ", &selection).unwrap_err();
        assert!(matches!(err, TeamError::EmptyName));
        assert!(err.is_user_error());
        assert_eq!(db.count("teams").unwrap(), 0);
        assert_eq!(db.count("team_members").unwrap(), 0);
    }

    #[test]
    fn test_unknown_member_writes_nothing() {
        let (db, dataset) = setup(&[("a", 1.0, 1.0, 1.0)]);
        let selection = TeamSelection::from_slugs(["a", "ghost"]).unwrap();
        let err = save_team(db.conn(), &dataset, "Haunted", &selection).unwrap_err();
        assert!(matches!(err, TeamError::UnknownMonster(ref s) if s == "ghost"));
        assert_eq!(db.count("teams").unwrap(), 0);
    }

    #[test]
    fn test_load_missing_team() {
        let (db, dataset) = setup(&[]);
        assert!(matches!(
            load_team(db.conn(), &dataset, 42),
            Err(TeamError::NotFound(42))
        ));
    }

    #[test]
    fn test_list_teams_newest_first() {
        let (db, dataset) = setup(&[("a", 1.0, 1.0, 1.0)]);
        let selection = TeamSelection::from_slugs(["a"]).unwrap();
        save_team(db.conn(), &dataset, "First", &selection).unwrap();
        save_team(db.conn(), &dataset, "Second", &selection).unwrap();

        let names: Vec<_> = list_teams(db.conn())
            .unwrap()
            .into_iter()
            .map(|t| t.team_name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
