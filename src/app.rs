use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::db::Database;
use crate::error::TeamError;
use crate::query::{fetch_detail, Dataset, MonsterDetail, MonsterRow};
use crate::team::{self, TeamSelection, TeamSummary};

/// Application context shared by the CLI and the interactive browser.
///
/// Owns the database and the aggregated dataset. The dataset is fetched on
/// first use and kept for the life of the process; team writes touch other
/// tables and leave it untouched.
pub struct AppContext {
    db: Database,
    dataset: OnceCell<Dataset>,
}

impl AppContext {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            dataset: OnceCell::new(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn dataset(&self) -> rusqlite::Result<&Dataset> {
        self.dataset.get_or_try_init(|| {
            debug!("fetching aggregated monster dataset");
            Dataset::fetch(self.db.conn())
        })
    }

    pub fn detail(&self, monster: &MonsterRow) -> rusqlite::Result<MonsterDetail> {
        fetch_detail(self.db.conn(), monster.id)
    }

    pub fn save_team(&self, name: &str, selection: &TeamSelection) -> Result<i64, TeamError> {
        team::save_team(self.db.conn(), self.dataset()?, name, selection)
    }

    pub fn load_team(&self, team_id: i64) -> Result<Vec<&MonsterRow>, TeamError> {
        team::load_team(self.db.conn(), self.dataset()?, team_id)
    }

    pub fn list_teams(&self) -> Result<Vec<TeamSummary>, TeamError> {
        team::list_teams(self.db.conn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_is_cached_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let ctx = AppContext::new(Database::open(&path).unwrap());
        assert!(ctx.dataset().unwrap().is_empty());

        ctx.db()
            .conn()
            .execute(
                "INSERT INTO monsters (slug, category, shape, stage, height, weight, catch_rate,
                                       lower_catch_resistance, upper_catch_resistance)
                 VALUES ('late', 'c', 's', 'basic', 1, 1, 1, 1, 1)",
                [],
            )
            .unwrap();

        // Cached until restart
        assert!(ctx.dataset().unwrap().is_empty());
        drop(ctx);
        let restarted = AppContext::new(Database::open(&path).unwrap());
        assert_eq!(restarted.dataset().unwrap().len(), 1);
    }

    #[test]
    fn test_save_team_reports_user_error() {
        let ctx = AppContext::new(Database::open_in_memory().unwrap());
        let err = ctx.save_team("", &TeamSelection::new()).unwrap_err();
        assert!(err.is_user_error());
    }
}
