use duckdb::types::ValueRef;
use duckdb::Connection;
use serde_json::Value;

/// Result of executing one sanitized statement. A statement that returns
/// no result set at all is distinct from one that returns zero rows.
#[derive(Debug, PartialEq)]
pub enum QueryOutcome {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    NonRowReturning,
}

/// Runs a single statement and collects the full result set. Errors from
/// DuckDB propagate unchanged; there is no retry.
pub fn execute(conn: &Connection, sql: &str) -> Result<QueryOutcome, duckdb::Error> {
    let mut stmt = conn.prepare(sql)?;

    let column_count = stmt.column_count();
    if column_count == 0 {
        stmt.execute([])?;
        return Ok(QueryOutcome::NonRowReturning);
    }

    let mut columns = Vec::with_capacity(column_count);
    for i in 0..column_count {
        columns.push(stmt.column_name(i)?.to_string());
    }

    let mut collected = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = match row.get_ref(i)? {
                ValueRef::Null => Value::Null,
                ValueRef::Boolean(b) => Value::from(b),
                ValueRef::TinyInt(v) => Value::from(v),
                ValueRef::SmallInt(v) => Value::from(v),
                ValueRef::Int(v) => Value::from(v),
                ValueRef::BigInt(v) => Value::from(v),
                ValueRef::UTinyInt(v) => Value::from(v),
                ValueRef::USmallInt(v) => Value::from(v),
                ValueRef::UInt(v) => Value::from(v),
                ValueRef::UBigInt(v) => Value::from(v),
                ValueRef::Float(v) => Value::from(v),
                ValueRef::Double(v) => Value::from(v),
                ValueRef::Text(bytes) => Value::from(String::from_utf8_lossy(bytes).into_owned()),
                // Timestamps, decimals and the rest render via their string form
                _ => match row.get::<_, String>(i) {
                    Ok(v) => Value::from(v),
                    Err(_) => Value::Null,
                },
            };
            cells.push(value);
        }
        collected.push(cells);
    }

    Ok(QueryOutcome::Rows {
        columns,
        rows: collected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE table1 (telemanasid VARCHAR, state_name VARCHAR, gender VARCHAR);
             INSERT INTO table1 VALUES ('t1', 'KERALA', 'MALE'), ('t2', 'KERALA', 'FEMALE'), ('t3', 'GOA', 'MALE');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn select_returns_columns_and_rows() {
        let outcome = execute(
            &conn(),
            "SELECT state_name, COUNT(telemanasid) AS count FROM table1 GROUP BY state_name ORDER BY count DESC",
        )
        .unwrap();
        assert_eq!(
            outcome,
            QueryOutcome::Rows {
                columns: vec!["state_name".to_string(), "count".to_string()],
                rows: vec![vec![json!("KERALA"), json!(2)], vec![json!("GOA"), json!(1)]],
            }
        );
    }

    #[test]
    fn empty_result_set_is_still_rows() {
        let outcome = execute(
            &conn(),
            "SELECT state_name FROM table1 WHERE state_name = 'SIKKIM'",
        )
        .unwrap();
        match outcome {
            QueryOutcome::Rows { columns, rows } => {
                assert_eq!(columns, vec!["state_name".to_string()]);
                assert!(rows.is_empty());
            }
            QueryOutcome::NonRowReturning => panic!("expected a row-returning outcome"),
        }
    }

    #[test]
    fn invalid_sql_propagates_error() {
        assert!(execute(&conn(), "SELECT definitely_not_a_column FROM table1").is_err());
    }
}
