//! Batch loader: one monster document per file, one transaction per run.

use rusqlite::{params, Connection, ErrorCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::LoadError;
use crate::parser::{
    is_data_file, parse_monster_file, EvolutionEntry, HistoryEntry, MonsterRecord, MoveEntry,
};
use crate::ui::{Phase, Ui};

/// Lookup tables referenced by monsters through an association table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Type,
    Tag,
    Terrain,
}

impl LookupKind {
    pub const ALL: [LookupKind; 3] = [LookupKind::Type, LookupKind::Tag, LookupKind::Terrain];

    /// Lookup table name
    pub fn table(self) -> &'static str {
        match self {
            LookupKind::Type => "types",
            LookupKind::Tag => "tags",
            LookupKind::Terrain => "terrains",
        }
    }

    /// Association table linking monsters to this lookup
    pub fn link_table(self) -> &'static str {
        match self {
            LookupKind::Type => "monster_types",
            LookupKind::Tag => "monster_tags",
            LookupKind::Terrain => "monster_terrains",
        }
    }

    /// Lookup id column in the association table
    pub fn link_column(self) -> &'static str {
        match self {
            LookupKind::Type => "type_id",
            LookupKind::Tag => "tag_id",
            LookupKind::Terrain => "terrain_id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Type => "Type",
            LookupKind::Tag => "Tag",
            LookupKind::Terrain => "Terrain",
        }
    }
}

/// Counts for one loader run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub monsters: u64,
    pub links: u64,
    pub movesets: u64,
    pub evolutions: u64,
    pub history: u64,
    /// Files without the data extension
    pub skipped: u64,
}

/// Return the id of `name` in the lookup table, inserting it first if absent
pub fn resolve_or_create_lookup(
    conn: &Connection,
    kind: LookupKind,
    name: &str,
) -> rusqlite::Result<i64> {
    let table = kind.table();
    conn.prepare_cached(&format!(
        "INSERT INTO {} (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        table
    ))?
    .execute(params![name])?;

    conn.prepare_cached(&format!("SELECT id FROM {} WHERE name = ?1", table))?
        .query_row(params![name], |row| row.get(0))
}

/// Insert the core monster row. Fails on a duplicate slug.
pub fn insert_monster(conn: &Connection, record: &MonsterRecord) -> rusqlite::Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO monsters (slug, category, shape, stage, height, weight, catch_rate,
                               lower_catch_resistance, upper_catch_resistance)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    stmt.execute(params![
        record.slug,
        record.category,
        record.shape,
        record.stage,
        record.height,
        record.weight,
        record.catch_rate,
        record.lower_catch_resistance,
        record.upper_catch_resistance,
    ])?;
    Ok(conn.last_insert_rowid())
}

/// Link a monster to each named lookup row, creating lookups as needed.
/// Duplicate links are ignored. Returns the number of new links.
pub fn link_many_to_many(
    conn: &Connection,
    kind: LookupKind,
    monster_id: i64,
    names: &[String],
) -> rusqlite::Result<u64> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (monster_id, {}) VALUES (?1, ?2)",
        kind.link_table(),
        kind.link_column()
    );

    let mut inserted = 0;
    for name in names {
        let lookup_id = resolve_or_create_lookup(conn, kind, name)?;
        inserted += conn
            .prepare_cached(&sql)?
            .execute(params![monster_id, lookup_id])? as u64;
    }
    Ok(inserted)
}

pub fn insert_movesets(
    conn: &Connection,
    monster_id: i64,
    entries: &[MoveEntry],
) -> rusqlite::Result<u64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO movesets (monster_id, level_learned, technique) VALUES (?1, ?2, ?3)",
    )?;
    for entry in entries {
        stmt.execute(params![monster_id, entry.level_learned, entry.technique])?;
    }
    Ok(entries.len() as u64)
}

/// Evolution targets are stored by slug and never checked against `monsters`
pub fn insert_evolutions(
    conn: &Connection,
    monster_id: i64,
    entries: &[EvolutionEntry],
) -> rusqlite::Result<u64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO evolutions (monster_id, at_level, evolves_to_slug) VALUES (?1, ?2, ?3)",
    )?;
    for entry in entries {
        stmt.execute(params![monster_id, entry.at_level, entry.monster_slug])?;
    }
    Ok(entries.len() as u64)
}

pub fn insert_history(
    conn: &Connection,
    monster_id: i64,
    entries: &[HistoryEntry],
) -> rusqlite::Result<u64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO history (monster_id, mon_slug, evo_stage) VALUES (?1, ?2, ?3)",
    )?;
    for entry in entries {
        stmt.execute(params![monster_id, entry.mon_slug, entry.evo_stage])?;
    }
    Ok(entries.len() as u64)
}

/// Apply one monster document: core row, associations, auxiliary rows
pub fn apply_monster(
    conn: &Connection,
    record: &MonsterRecord,
    summary: &mut LoadSummary,
) -> rusqlite::Result<i64> {
    let monster_id = insert_monster(conn, record)?;

    summary.links += link_many_to_many(conn, LookupKind::Type, monster_id, &record.types)?;
    summary.links += link_many_to_many(conn, LookupKind::Tag, monster_id, &record.tags)?;
    summary.links += link_many_to_many(conn, LookupKind::Terrain, monster_id, &record.terrains)?;
    summary.movesets += insert_movesets(conn, monster_id, &record.moveset)?;
    summary.evolutions += insert_evolutions(conn, monster_id, &record.evolutions)?;
    summary.history += insert_history(conn, monster_id, &record.history)?;
    summary.monsters += 1;

    Ok(monster_id)
}

/// List the directory's monster documents in file-name order.
/// Returns the documents and the number of skipped entries.
pub fn collect_data_files(dir: &Path) -> Result<(Vec<PathBuf>, u64), LoadError> {
    let read_dir_err = |source: std::io::Error| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    let mut skipped = 0;

    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_file() && is_data_file(&path) {
            files.push(path);
        } else {
            skipped += 1;
        }
    }

    files.sort();
    Ok((files, skipped))
}

/// Load every monster document in `dir` within a single transaction.
///
/// Any failure rolls back the whole run.
pub fn load_directory(
    db: &mut Database,
    dir: &Path,
    ui: &mut impl Ui,
) -> Result<LoadSummary, LoadError> {
    ui.set_phase(Phase::Scanning);
    let (files, skipped) = collect_data_files(dir)?;
    info!(files = files.len(), skipped, dir = ?dir, "found monster documents");

    let mut summary = LoadSummary {
        skipped,
        ..LoadSummary::default()
    };

    ui.set_phase(Phase::Loading);
    let total = files.len() as u64;
    // Dropping the transaction on an early return rolls it back
    let tx = db.conn_mut().transaction()?;

    for (idx, file) in files.iter().enumerate() {
        let record = parse_monster_file(file)?;
        debug!(slug = %record.slug, file = ?file, "loading monster");

        apply_monster(&tx, &record, &mut summary).map_err(|source| {
            if is_duplicate_slug(&source) {
                LoadError::DuplicateSlug {
                    file: file.clone(),
                    slug: record.slug.clone(),
                }
            } else {
                LoadError::Database {
                    file: file.clone(),
                    source,
                }
            }
        })?;

        ui.set_progress(idx as u64 + 1, total, record.slug);
    }

    ui.set_phase(Phase::Committing);
    tx.commit()?;
    ui.clear_progress();

    ui.set_phase(Phase::Complete);
    ui.log(format!(
        "Loaded {} monsters ({} links, {} moves, {} evolutions, {} history rows)",
        summary.monsters, summary.links, summary.movesets, summary.evolutions, summary.history
    ));
    info!(?summary, "load committed");

    Ok(summary)
}

fn is_duplicate_slug(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == ErrorCode::ConstraintViolation && msg.contains("monsters.slug")
    )
}
