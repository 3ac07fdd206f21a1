use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if col.name == "id" && schema.primary_key.is_empty() {
            " PRIMARY KEY"
        } else {
            ""
        };
        let unique = if col.unique { " UNIQUE" } else { "" };

        columns.push(format!(
            "    {} {}{}{}{}",
            col.name,
            col.col_type.sql_type(),
            pk,
            null_constraint,
            unique
        ));
    }

    if !schema.primary_key.is_empty() {
        columns.push(format!(
            "    PRIMARY KEY ({})",
            schema.primary_key.join(", ")
        ));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns and explicit indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    // The leading primary key column is already indexed
    let leading_pk = schema.primary_key.first().copied();

    let fk_indexes = schema
        .foreign_keys
        .iter()
        .filter(|fk| Some(fk.column) != leading_pk)
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        });

    let explicit = schema.indexes.iter().map(|index| {
        format!(
            "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            if index.unique { "UNIQUE " } else { "" },
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        )
    });

    fk_indexes.chain(explicit).collect()
}

/// Generate DROP TABLE SQL for a table schema
pub fn generate_drop_table(schema: &TableSchema) -> String {
    format!("DROP TABLE IF EXISTS {}", schema.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{MONSTERS, MONSTER_TYPES, TEAMS};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&MONSTERS);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS monsters"));
        assert!(sql.contains("id INTEGER PRIMARY KEY"));
        assert!(sql.contains("slug TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("height REAL NOT NULL"));
    }

    #[test]
    fn test_composite_primary_key() {
        let sql = generate_create_table(&MONSTER_TYPES);
        assert!(sql.contains("PRIMARY KEY (monster_id, type_id)"));
        assert!(sql.contains("FOREIGN KEY (type_id) REFERENCES types(id)"));
        assert!(!sql.contains("INTEGER PRIMARY KEY"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&MONSTER_TYPES);
        assert!(indexes.iter().any(|i| i.contains("idx_monster_types_type_id")));
        assert!(!indexes.iter().any(|i| i.contains("idx_monster_types_monster_id")));

        let indexes = generate_indexes(&TEAMS);
        assert!(indexes.iter().any(|i| i.contains("idx_teams_created_at")));
    }
}
