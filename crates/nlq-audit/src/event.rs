//! Query log entries.
//!
//! One entry records one executed pipeline run: the question, the SQL that
//! ran, when, and whether the database accepted it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of an executed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A query log entry. Entries are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    /// Unique entry ID.
    pub id: Uuid,

    /// Natural-language question as submitted.
    pub question: String,

    /// Generated SQL (before the row window was applied).
    pub sql: String,

    /// When the run completed (UTC).
    pub timestamp: DateTime<Utc>,

    pub status: LogStatus,

    /// Database error detail for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl QueryLogEntry {
    pub fn success(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(question, sql, LogStatus::Success, None)
    }

    pub fn failure(
        question: impl Into<String>,
        sql: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(question, sql, LogStatus::Error, Some(error.into()))
    }

    fn new(
        question: impl Into<String>,
        sql: impl Into<String>,
        status: LogStatus,
        error_message: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            sql: sql.into(),
            timestamp: Utc::now(),
            status,
            error_message,
        }
    }

    /// Format the entry as a human-readable log line.
    ///
    /// Format: `[timestamp] STATUS question="..." sql="..." [error="..."]`
    pub fn to_log_line(&self) -> String {
        let mut line = format!(
            "[{}] {} question=\"{}\"",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.status,
            self.question.replace('"', "'"),
        );

        // Truncate long SQL for console output
        let sql_preview: String = if self.sql.chars().count() > 100 {
            format!("{}...", self.sql.chars().take(100).collect::<String>())
        } else {
            self.sql.clone()
        };
        line.push_str(&format!(" sql=\"{}\"", sql_preview.replace('\n', " ")));

        if let Some(ref error) = self.error_message {
            line.push_str(&format!(" error=\"{}\"", error.replace('"', "'")));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_entry_serialization() {
        let entry = QueryLogEntry::success("List all courses", "SELECT title FROM course");
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["question"], "List all courses");
        assert!(value.get("error_message").is_none());
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_failure_entry_keeps_detail() {
        let entry = QueryLogEntry::failure(
            "List all courses",
            "SELECT title FROM courses",
            "Table 'university.courses' doesn't exist",
        );
        assert_eq!(entry.status, LogStatus::Error);

        let line = entry.to_log_line();
        assert!(line.contains("ERROR"));
        assert!(line.contains("error=\"Table 'university.courses' doesn't exist\""));
    }

    #[test]
    fn test_log_line_truncates_long_sql() {
        let sql = format!("SELECT {} FROM t", "a, ".repeat(60));
        let entry = QueryLogEntry::success("q", sql);
        assert!(entry.to_log_line().contains("..."));
    }
}
