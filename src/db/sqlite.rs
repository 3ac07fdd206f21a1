use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema_gen::{generate_create_table, generate_drop_table, generate_indexes};
use crate::schema::DependencyResolver;

/// SQLite database holding the monster catalog and saved teams
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database at `path` and provision the schema
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.configure()?;
        db.provision()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, path: None };
        db.configure()?;
        db.provision()?;
        Ok(db)
    }

    fn configure(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        // WAL is not available for in-memory databases
        if self.path.is_some() {
            self.conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }

        Ok(())
    }

    /// Create every table and index that does not exist yet
    pub fn provision(&self) -> rusqlite::Result<()> {
        let tables = DependencyResolver::new()
            .creation_order()
            .map_err(rusqlite::Error::InvalidParameterName)?;

        for schema in tables {
            debug!(table = schema.name, "provisioning table");
            self.conn.execute(&generate_create_table(schema), [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        Ok(())
    }

    /// Drop every table and provision an empty schema
    pub fn reset(&mut self) -> rusqlite::Result<()> {
        let tables = DependencyResolver::new()
            .drop_order()
            .map_err(rusqlite::Error::InvalidParameterName)?;

        let tx = self.conn.transaction()?;
        for schema in tables {
            tx.execute(&generate_drop_table(schema), [])?;
        }
        tx.commit()?;

        info!("dropped all tables");
        self.provision()
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Row count of a catalog table
    pub fn count(&self, table: &str) -> rusqlite::Result<i64> {
        if crate::schema::get_table(table).is_none() {
            return Err(rusqlite::Error::InvalidParameterName(table.to_string()));
        }
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
    }
}
