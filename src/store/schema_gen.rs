use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE \"{}\" (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Boolean => "INTEGER",
            ColumnType::Timestamp => "TEXT",
        };

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };

        columns.push(format!("    \"{}\" {}{}", col.name, sql_type, null_constraint));
    }

    if schema.has_key() {
        let key: Vec<String> = schema
            .primary_key
            .iter()
            .map(|col| format!("\"{}\"", col))
            .collect();
        columns.push(format!("    PRIMARY KEY ({})", key.join(", ")));
    }

    // Not enforced: foreign_keys pragma stays off
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY (\"{}\") REFERENCES \"{}\"(\"{}\")",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX \"idx_{}_{}\" ON \"{}\"(\"{}\")",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}
