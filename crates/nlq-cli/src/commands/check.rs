//! `nlq check` - run the security gate offline.

use nlq_core::NlqConfig;
use nlq_guard::{SecurityGate, SecurityVerdict};

/// Check one question/SQL pair and print the verdict. Returns whether the
/// pair is safe.
pub fn run(config: &NlqConfig, question: &str, sql: &str, json: bool) -> anyhow::Result<bool> {
    let verdict = verdict(config, question, sql);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else if verdict.is_safe {
        println!("SAFE");
    } else {
        println!("REJECTED: {}", verdict.reason.as_deref().unwrap_or_default());
    }

    Ok(verdict.is_safe)
}

fn verdict(config: &NlqConfig, question: &str, sql: &str) -> SecurityVerdict {
    SecurityGate::with_forbidden_fields(&config.security.forbidden_fields).check(question, sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fields() {
        let config = NlqConfig::default();
        assert!(verdict(&config, "List all courses", "SELECT title FROM course").is_safe);
        assert!(!verdict(&config, "Show me passwords", "SELECT password FROM student").is_safe);
    }

    #[test]
    fn test_configured_fields() {
        let mut config = NlqConfig::default();
        config.security.forbidden_fields = vec!["budget".to_string()];

        assert!(!verdict(&config, "Budgets", "SELECT budget FROM department").is_safe);
        assert!(run(&config, "Show me passwords", "SELECT password FROM student", false).unwrap());
    }
}
