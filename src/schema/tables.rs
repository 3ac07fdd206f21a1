//! Table schema definitions for the monster catalog and saved teams

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static MONSTERS: TableSchema = TableSchema {
    name: "monsters",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("slug", ColumnType::Text).unique(),
        Column::required("category", ColumnType::Text),
        Column::required("shape", ColumnType::Text),
        Column::required("stage", ColumnType::Text),
        Column::required("height", ColumnType::Real),
        Column::required("weight", ColumnType::Real),
        Column::required("catch_rate", ColumnType::Real),
        Column::required("lower_catch_resistance", ColumnType::Real),
        Column::required("upper_catch_resistance", ColumnType::Real),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static TYPES: TableSchema = TableSchema {
    name: "types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).unique(),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static TAGS: TableSchema = TableSchema {
    name: "tags",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).unique(),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static TERRAINS: TableSchema = TableSchema {
    name: "terrains",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text).unique(),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static TEAMS: TableSchema = TableSchema {
    name: "teams",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("team_name", ColumnType::Text),
        Column::required("created_at", ColumnType::Timestamp),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[Index::on(&["created_at"])],
};

// =============================================================================
// Association Tables (monster <-> lookup)
// =============================================================================

pub static MONSTER_TYPES: TableSchema = TableSchema {
    name: "monster_types",
    columns: &[
        Column::required("monster_id", ColumnType::Integer),
        Column::required("type_id", ColumnType::Integer),
    ],
    primary_key: &["monster_id", "type_id"],
    foreign_keys: &[
        ForeignKey::new("monster_id", "monsters"),
        ForeignKey::new("type_id", "types"),
    ],
    indexes: &[],
};

pub static MONSTER_TAGS: TableSchema = TableSchema {
    name: "monster_tags",
    columns: &[
        Column::required("monster_id", ColumnType::Integer),
        Column::required("tag_id", ColumnType::Integer),
    ],
    primary_key: &["monster_id", "tag_id"],
    foreign_keys: &[
        ForeignKey::new("monster_id", "monsters"),
        ForeignKey::new("tag_id", "tags"),
    ],
    indexes: &[],
};

pub static MONSTER_TERRAINS: TableSchema = TableSchema {
    name: "monster_terrains",
    columns: &[
        Column::required("monster_id", ColumnType::Integer),
        Column::required("terrain_id", ColumnType::Integer),
    ],
    primary_key: &["monster_id", "terrain_id"],
    foreign_keys: &[
        ForeignKey::new("monster_id", "monsters"),
        ForeignKey::new("terrain_id", "terrains"),
    ],
    indexes: &[],
};

// =============================================================================
// Auxiliary Monster Rows
// =============================================================================

pub static MOVESETS: TableSchema = TableSchema {
    name: "movesets",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("monster_id", ColumnType::Integer),
        Column::required("level_learned", ColumnType::Integer),
        Column::required("technique", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("monster_id", "monsters")],
    indexes: &[],
};

/// `evolves_to_slug` is a plain name, never a foreign key: targets may be
/// loaded after the monster that references them.
pub static EVOLUTIONS: TableSchema = TableSchema {
    name: "evolutions",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("monster_id", ColumnType::Integer),
        Column::new("at_level", ColumnType::Integer),
        Column::required("evolves_to_slug", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("monster_id", "monsters")],
    indexes: &[Index::on(&["evolves_to_slug"])],
};

pub static HISTORY: TableSchema = TableSchema {
    name: "history",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("monster_id", ColumnType::Integer),
        Column::required("mon_slug", ColumnType::Text),
        Column::required("evo_stage", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("monster_id", "monsters")],
    indexes: &[],
};

// =============================================================================
// Teams
// =============================================================================

pub static TEAM_MEMBERS: TableSchema = TableSchema {
    name: "team_members",
    columns: &[
        Column::required("team_id", ColumnType::Integer),
        Column::required("monster_id", ColumnType::Integer),
    ],
    primary_key: &["team_id", "monster_id"],
    foreign_keys: &[
        ForeignKey::new("team_id", "teams"),
        ForeignKey::new("monster_id", "monsters"),
    ],
    indexes: &[],
};

/// All tables, parents listed before children
pub static ALL_TABLES: &[&TableSchema] = &[
    // Wave 1: No dependencies
    &MONSTERS,
    &TYPES,
    &TAGS,
    &TERRAINS,
    &TEAMS,
    // Wave 2: Depends on wave 1
    &MONSTER_TYPES,
    &MONSTER_TAGS,
    &MONSTER_TERRAINS,
    &MOVESETS,
    &EVOLUTIONS,
    &HISTORY,
    &TEAM_MEMBERS,
];

/// Get a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_foreign_key_targets_a_known_table() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                let parent = get_table(fk.references_table)
                    .unwrap_or_else(|| panic!("{} references unknown table", table.name));
                assert!(parent.has_column(fk.references_column));
                assert!(table.has_column(fk.column));
            }
        }
    }

    #[test]
    fn test_table_names_cover_catalog() {
        let names = table_names();
        assert_eq!(names.len(), 12);
        for expected in ["monsters", "types", "tags", "terrains", "teams", "team_members"] {
            assert!(names.contains(&expected));
        }
    }
}
