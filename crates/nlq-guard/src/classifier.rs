//! Read-only statement classification.

use crate::parser::{SqlAnalyzer, SqlOperation};

/// Decides whether generated SQL consists solely of SELECT statements.
#[derive(Clone, Default)]
pub struct ReadOnlyClassifier {
    analyzer: SqlAnalyzer,
}

impl ReadOnlyClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `sql` parses into one or more statements and every one of
    /// them is a SELECT. Empty or unparsable text is not read-only.
    pub fn is_read_only(&self, sql: &str) -> bool {
        let statements = match self.analyzer.parse_non_empty(sql) {
            Ok(statements) => statements,
            Err(e) => {
                tracing::warn!(sql = %sql, error = %e, "Rejected non-read-only query");
                return false;
            }
        };

        for stmt in &statements {
            let operation = self.analyzer.get_operation(stmt);
            if operation != SqlOperation::Select {
                tracing::warn!(sql = %sql, operation = %operation, "Rejected non-read-only query");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_read_only() {
        let classifier = ReadOnlyClassifier::new();
        assert!(classifier.is_read_only("SELECT title, credits FROM course ORDER BY title, credits;"));
        assert!(classifier.is_read_only(
            "SELECT T.title FROM course AS T LEFT JOIN prereq AS P ON T.course_id = P.course_id WHERE P.prereq_id IS NULL"
        ));
    }

    #[test]
    fn test_batch_of_selects_is_read_only() {
        let classifier = ReadOnlyClassifier::new();
        assert!(classifier.is_read_only("SELECT 1; SELECT name FROM student;"));
    }

    #[test]
    fn test_any_write_fails() {
        let classifier = ReadOnlyClassifier::new();
        for sql in [
            "INSERT INTO student (name) VALUES ('x')",
            "UPDATE student SET name = 'x'",
            "DELETE FROM student",
            "DROP TABLE student",
            "ALTER TABLE student ADD COLUMN age INT",
            "CREATE TABLE t (id INT)",
            "TRUNCATE TABLE student",
            "SELECT name FROM student; DROP TABLE student",
            "SELECT name FROM student; DELETE FROM student",
        ] {
            assert!(!classifier.is_read_only(sql), "accepted: {sql}");
        }
    }

    #[test]
    fn test_select_into_fails() {
        let classifier = ReadOnlyClassifier::new();
        assert!(!classifier.is_read_only("SELECT * INTO backup FROM student"));
    }

    #[test]
    fn test_fails_closed_on_bad_input() {
        let classifier = ReadOnlyClassifier::new();
        assert!(!classifier.is_read_only(""));
        assert!(!classifier.is_read_only("   ;  "));
        assert!(!classifier.is_read_only("SELEC name FRM student"));
        assert!(!classifier.is_read_only("Error: Cannot answer the question with the given schema."));
    }
}
