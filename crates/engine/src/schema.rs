//! Schema reader: builds a [`TableDescriptor`] for one table.
//!
//! Two independent queries: `SHOW CREATE TABLE` for the creation DDL and
//! the `INFORMATION_SCHEMA.COLUMNS` catalog for the ordered column-name
//! list. The DDL query echoes the table name it resolved; a mismatch with
//! the requested name is fatal, since it means the driver answered for a
//! different object.

use dumpstream_core::{Connection, Error, Param, Result, TableDescriptor};

/// Fetch the schema metadata for `table` in `database`.
///
/// Fails with [`Error::SchemaMismatch`] if the DDL query echoes a different
/// table name, and with [`Error::NoColumns`] if the catalog reports zero
/// columns for the table.
pub fn describe<C>(conn: &C, table: &str, database: &str) -> Result<TableDescriptor>
where
    C: Connection + ?Sized,
{
    let create_sql = table_create_sql(conn, table)?;
    let columns = table_columns(conn, table, database)?;
    if columns.is_empty() {
        return Err(Error::NoColumns(table.to_string()));
    }

    Ok(TableDescriptor::new(table, database, create_sql, columns))
}

fn table_create_sql<C>(conn: &C, table: &str) -> Result<String>
where
    C: Connection + ?Sized,
{
    let row = conn
        .query_row(&format!("SHOW CREATE TABLE {table}"), &[])?
        .ok_or_else(|| {
            Error::Connection(format!("SHOW CREATE TABLE {table} returned no row"))
        })?;

    // The result is a (table name, create statement) pair.
    let reported = row.first_value().unwrap_or_default();
    if reported != table {
        return Err(Error::SchemaMismatch {
            requested: table.to_string(),
            reported: reported.to_string(),
        });
    }

    Ok(row
        .values()
        .get(1)
        .and_then(|v| v.clone())
        .unwrap_or_default())
}

fn table_columns<C>(conn: &C, table: &str, database: &str) -> Result<Vec<String>>
where
    C: Connection + ?Sized,
{
    let result = conn.query(
        "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_NAME = ? AND TABLE_SCHEMA = ? ORDER BY ORDINAL_POSITION",
        &[Param::from(table), Param::from(database)],
    )?;

    let mut columns = Vec::new();
    for row in result {
        let row = row?;
        let name = row.first_value().ok_or_else(|| {
            Error::Connection(format!("NULL column name reported for table {table}"))
        })?;
        columns.push(name.to_string());
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTable, ScriptedConnection};

    fn conn_with_users() -> ScriptedConnection {
        let mut conn = ScriptedConnection::new("8.0.36", "app");
        conn.add_table(FakeTable::new(
            "users",
            "CREATE TABLE users (id INT, name TEXT)",
            &["id", "name"],
        ));
        conn
    }

    #[test]
    fn test_describe_builds_descriptor() {
        let conn = conn_with_users();
        let desc = describe(&conn, "users", "app").unwrap();
        assert_eq!(desc.name, "users");
        assert_eq!(desc.schema, "app");
        assert_eq!(desc.columns, vec!["id".to_string(), "name".to_string()]);
        assert!(desc.create_sql.starts_with("CREATE TABLE users"));
    }

    #[test]
    fn test_describe_unknown_table_is_connection_error() {
        let conn = conn_with_users();
        let err = describe(&conn, "missing", "app").unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_describe_rejects_echoed_name_mismatch() {
        let mut conn = conn_with_users();
        conn.echo_create_table_name("users", "users_v2");
        let err = describe(&conn, "users", "app").unwrap_err();
        match err {
            Error::SchemaMismatch {
                requested,
                reported,
            } => {
                assert_eq!(requested, "users");
                assert_eq!(reported, "users_v2");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_describe_zero_columns_is_fatal() {
        let mut conn = ScriptedConnection::new("8.0.36", "app");
        conn.add_table(FakeTable::new("ghost", "CREATE TABLE ghost ()", &[]));
        let err = describe(&conn, "ghost", "app").unwrap_err();
        assert!(matches!(err, Error::NoColumns(t) if t == "ghost"));
    }

    #[test]
    fn test_columns_filtered_by_database() {
        let conn = conn_with_users();
        // Wrong database: catalog returns no columns for the pair.
        let err = describe(&conn, "users", "other_db").unwrap_err();
        assert!(matches!(err, Error::NoColumns(_)));
    }
}
