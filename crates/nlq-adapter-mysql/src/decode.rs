//! MySQL row to JSON conversion.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use nlq_core::Row as JsonRow;
use serde_json::{Value, json};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, ColumnOrigin, Row, TypeInfo, ValueRef};

/// Convert a row to a JSON object, keeping the select-list column order.
///
/// Decimals are rendered as strings to keep their exact digits; temporal
/// values use ISO 8601 text. A label already present in the row is keyed
/// `table.label` instead, so joins returning `s.name` and `i.name` keep both.
pub fn row_to_json(row: &MySqlRow) -> JsonRow {
    let mut obj = JsonRow::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let table = match col.origin() {
            ColumnOrigin::Table(origin) => Some(origin.table),
            _ => None,
        };
        let key = column_key(&obj, col.name(), table.as_deref(), idx);
        obj.insert(key, column_value(row, idx, col.type_info().name()));
    }
    obj
}

/// Key for column `idx` labelled `name`: the bare label when free, then
/// `table.name`, then `name_<idx>`.
fn column_key(taken: &JsonRow, name: &str, table: Option<&str>, idx: usize) -> String {
    if !taken.contains_key(name) {
        return name.to_string();
    }
    if let Some(table) = table.filter(|t| !t.is_empty()) {
        let qualified = format!("{table}.{name}");
        if !taken.contains_key(&qualified) {
            return qualified;
        }
    }
    let mut key = format!("{name}_{idx}");
    while taken.contains_key(&key) {
        key.push('_');
    }
    key
}

fn column_value(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Err(_) => return Value::Null,
        _ => {}
    }

    match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(idx).map(Value::Bool).ok(),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            row.try_get::<i64, _>(idx).map(|v| json!(v)).ok()
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<u64, _>(idx).map(|v| json!(v)).ok(),
        "FLOAT" => row
            .try_get::<f32, _>(idx)
            .ok()
            .and_then(|v| serde_json::Number::from_f64(f64::from(v)))
            .map(Value::Number),
        "DOUBLE" => row
            .try_get::<f64, _>(idx)
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        "DECIMAL" => row
            .try_get::<BigDecimal, _>(idx)
            .map(|v| Value::String(v.to_string()))
            .ok(),
        "DATE" => row
            .try_get::<NaiveDate, _>(idx)
            .map(|v| Value::String(v.to_string()))
            .ok(),
        "TIME" => row
            .try_get::<NaiveTime, _>(idx)
            .map(|v| Value::String(v.to_string()))
            .ok(),
        "DATETIME" => row
            .try_get::<NaiveDateTime, _>(idx)
            .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .ok(),
        "TIMESTAMP" => row
            .try_get::<DateTime<Utc>, _>(idx)
            .map(|v| Value::String(v.to_rfc3339()))
            .ok(),
        "JSON" => row.try_get::<Value, _>(idx).ok(),
        _ => None,
    }
    .or_else(|| text_fallback(row, idx))
    .unwrap_or(Value::Null)
}

// Text types, ENUM/SET, and anything the typed decoders refused.
fn text_fallback(row: &MySqlRow, idx: usize) -> Option<Value> {
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Some(Value::String(s));
    }
    row.try_get::<Vec<u8>, _>(idx)
        .ok()
        .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keys: &[&str]) -> JsonRow {
        keys.iter().map(|k| (k.to_string(), Value::Null)).collect()
    }

    #[test]
    fn test_first_label_stays_bare() {
        assert_eq!(column_key(&row(&[]), "name", Some("student"), 0), "name");
        assert_eq!(column_key(&row(&["title"]), "name", None, 1), "name");
    }

    #[test]
    fn test_duplicate_label_takes_table_prefix() {
        let taken = row(&["name"]);
        assert_eq!(column_key(&taken, "name", Some("instructor"), 1), "instructor.name");
    }

    #[test]
    fn test_duplicate_without_table_takes_index_suffix() {
        assert_eq!(column_key(&row(&["name"]), "name", None, 2), "name_2");
        assert_eq!(column_key(&row(&["name"]), "name", Some(""), 2), "name_2");
        assert_eq!(
            column_key(&row(&["name", "t.name", "name_2"]), "name", Some("t"), 2),
            "name_2_"
        );
    }
}
