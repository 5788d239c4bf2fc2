use nlq_core::SchemaSnapshot;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Load `CREATE TABLE` text for every table of the current database, or for
/// `table` only. A `table` that does not exist yields an empty snapshot.
pub async fn load_schema(pool: &MySqlPool, table: Option<&str>) -> anyhow::Result<SchemaSnapshot> {
    let tables = list_tables(pool).await?;

    let wanted: Vec<&str> = match table {
        Some(name) => tables
            .iter()
            .map(String::as_str)
            .filter(|t| *t == name)
            .collect(),
        None => tables.iter().map(String::as_str).collect(),
    };

    let mut schema = SchemaSnapshot::new();
    for name in wanted {
        if let Some(ddl) = show_create_table(pool, name).await? {
            schema.insert(name.to_string(), ddl);
        }
    }
    Ok(schema)
}

/// Table names of the connection's default database.
pub async fn list_tables(pool: &MySqlPool) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query("SHOW TABLES").fetch_all(pool).await?;
    rows.iter().map(|row| text_column(row, 0)).collect()
}

/// `SHOW CREATE TABLE` output for one table.
pub async fn show_create_table(pool: &MySqlPool, table: &str) -> anyhow::Result<Option<String>> {
    let sql = format!("SHOW CREATE TABLE {}", quote_identifier(table));
    let row = sqlx::query(sqlx::AssertSqlSafe(sql.as_str())).fetch_optional(pool).await?;
    row.map(|r| text_column(&r, 1)).transpose()
}

/// Backtick-quote an identifier, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

// Metadata statements report names as VARCHAR or VARBINARY depending on the
// server version and collation.
fn text_column(row: &MySqlRow, idx: usize) -> anyhow::Result<String> {
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Ok(s);
    }
    let bytes: Vec<u8> = row.try_get(idx)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("course"), "`course`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }
}
