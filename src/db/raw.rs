// src/db/raw.rs
//
// Raw-SQL pass-through for ad hoc inspection.
//
// This is a trusted internal tool, not a public surface: the SQL is
// executed as given, with no injection defense.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Number, Value};

use crate::error::AppResult;

/// Execute an arbitrary read-only query and render every row as a JSON
/// object keyed by column name.
pub fn raw_query(conn: &Connection, sql: &str) -> AppResult<Vec<Map<String, Value>>> {
    let mut stmt = conn.prepare(sql)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        let mut object = Map::new();
        for (i, name) in column_names.iter().enumerate() {
            object.insert(name.clone(), value_ref_to_json(row.get_ref(i)?));
        }
        out.push(object);
    }

    Ok(out)
}

fn value_ref_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;
    use crate::db::migrations::initialize_database;

    #[test]
    fn test_rows_render_as_json_objects() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        conn.execute(
            "INSERT INTO teams (team_id, name, short_name) VALUES (2, 'Australia', 'AUS')",
            [],
        )
        .unwrap();

        let rows = raw_query(&conn, "SELECT team_id, name FROM teams").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["team_id"], Value::Number(2.into()));
        assert_eq!(rows[0]["name"], Value::String("Australia".to_string()));
    }

    #[test]
    fn test_bad_sql_is_an_error() {
        let conn = create_test_connection().unwrap();
        assert!(raw_query(&conn, "SELECT nope FROM nowhere").is_err());
    }
}
