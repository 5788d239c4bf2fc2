//! Prompt construction and response cleanup.

use nlq_core::SchemaSnapshot;

/// Sentinel the model is told to answer with when the schema cannot answer
/// the question.
pub const CANNOT_ANSWER: &str = "Error: Cannot answer the question with the given schema.";

const SYSTEM_PROMPT: &str = "You are a database expert who translates natural-language questions \
into MySQL queries. Reply with a single SQL statement and nothing else.";

const FEW_SHOT_EXAMPLES: &str = "\
# Question: List the names of all courses ordered by their titles and credits.
SELECT title, credits FROM course ORDER BY title, credits;

# Question: What are the titles of courses without prerequisites?
SELECT T.title FROM course AS T LEFT JOIN prereq AS P ON T.course_id = P.course_id WHERE P.prereq_id IS NULL;

# Question: What are the names of students who have more than one advisor?
SELECT name FROM student WHERE ID IN (SELECT s_ID FROM advisor GROUP BY s_ID HAVING count(*) > 1);";

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Build the user prompt: task, schema DDL, rules, examples, question.
pub fn build_prompt(question: &str, schema: &SchemaSnapshot) -> String {
    let schema_text = schema.values().map(String::as_str).collect::<Vec<_>>().join("\n\n");

    format!(
        r#"### Task
Translate the user question into an accurate, efficient MySQL query over the tables below.

### Database schema (CREATE TABLE statements):
{schema_text}

### Rules
1. Only generate `SELECT` queries.
2. The SQL must be syntactically valid MySQL.
3. Never use statements that modify the database (such as UPDATE or DELETE).
4. If the question cannot be answered from the schema above, reply with "{CANNOT_ANSWER}"

### Examples:
{FEW_SHOT_EXAMPLES}

### User question
{question}

### SQL query:
"#
    )
}

/// Strip surrounding whitespace and Markdown code fences from model output.
pub fn clean_sql(text: &str) -> String {
    let mut sql = text.trim();
    if let Some(rest) = sql.strip_prefix("```sql") {
        sql = rest.trim();
    } else if let Some(rest) = sql.strip_prefix("```") {
        sql = rest.trim();
    }
    if let Some(rest) = sql.strip_suffix("```") {
        sql = rest.trim();
    }
    sql.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_contains_schema_and_question() {
        let mut schema = SchemaSnapshot::new();
        schema.insert("course".to_string(), "CREATE TABLE `course` (`title` varchar(50))".to_string());
        schema.insert("dept".to_string(), "CREATE TABLE `dept` (`name` varchar(20))".to_string());

        let prompt = build_prompt("List all courses", &schema);
        assert!(prompt.contains(
            "CREATE TABLE `course` (`title` varchar(50))\n\nCREATE TABLE `dept` (`name` varchar(20))"
        ));
        assert!(prompt.contains("### User question\nList all courses\n"));
        assert!(prompt.contains(CANNOT_ANSWER));
        assert_eq!(prompt.matches("# Question:").count(), 3);
    }

    #[test]
    fn test_clean_sql_strips_fences() {
        assert_eq!(
            clean_sql("```sql\nSELECT title FROM course;\n```"),
            "SELECT title FROM course;"
        );
        assert_eq!(clean_sql("```\nSELECT 1\n```\n"), "SELECT 1");
        assert_eq!(clean_sql("  SELECT 1  "), "SELECT 1");
        assert_eq!(clean_sql(CANNOT_ANSWER), CANNOT_ANSWER);
    }
}
