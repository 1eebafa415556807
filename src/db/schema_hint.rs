use duckdb::Connection;

/// Builds the plain-text schema description fed into the prompt, one
/// `Table <name>:` block with ` - <column> (<type>)` lines per table.
///
/// Read live on every call; the chart pipeline may swap the database file
/// underneath a long-running server, so nothing here is cached.
pub fn schema_hint(conn: &Connection) -> Result<String, duckdb::Error> {
    let mut hint = String::new();

    let mut tables_stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
    let tables: Vec<String> = tables_stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    for table in tables {
        hint.push_str(&format!("\nTable {}:\n", table));

        let mut cols_stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let columns: Vec<(String, String)> = cols_stmt
            .query_map([], |row| Ok((row.get(1)?, row.get(2)?)))?
            .collect::<Result<_, _>>()?;

        for (name, dtype) in columns {
            hint.push_str(&format!(" - {} ({})\n", name, dtype));
        }
    }

    Ok(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_lists_tables_and_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE table1 (telemanasid VARCHAR, state_name VARCHAR, gender VARCHAR);",
        )
        .unwrap();

        let hint = schema_hint(&conn).unwrap();
        assert!(hint.contains("Table table1:"));
        assert!(hint.contains(" - telemanasid (VARCHAR)"));
        assert!(hint.contains(" - state_name (VARCHAR)"));
    }
}
