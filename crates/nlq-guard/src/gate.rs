//! Composed security decision over a question and its generated SQL.

use crate::classifier::ReadOnlyClassifier;
use crate::scanner::SensitiveFieldScanner;
use crate::screener::InputScreener;
use serde::Serialize;

/// Why a query was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The question matched the injection screener.
    InjectionAttempt,
    /// The SQL is not a SELECT-only statement.
    NotReadOnly,
    /// The SQL references a forbidden column.
    ForbiddenField,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InjectionAttempt => "Invalid input detected. Potential SQL injection attempt.",
            Self::NotReadOnly => "Security check failed: Only SELECT queries are allowed.",
            Self::ForbiddenField => {
                "Security check failed: Query attempts to access forbidden fields."
            }
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a gate check. `reason` is set iff `is_safe` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityVerdict {
    pub is_safe: bool,
    pub reason: Option<String>,
    #[serde(skip)]
    rejection: Option<Rejection>,
}

impl SecurityVerdict {
    pub fn safe() -> Self {
        Self {
            is_safe: true,
            reason: None,
            rejection: None,
        }
    }

    pub fn rejected(rejection: Rejection) -> Self {
        Self {
            is_safe: false,
            reason: Some(rejection.message().to_string()),
            rejection: Some(rejection),
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection
    }
}

/// Runs the screener, the classifier and the scanner in that order and
/// stops at the first failure.
#[derive(Clone, Default)]
pub struct SecurityGate {
    screener: InputScreener,
    classifier: ReadOnlyClassifier,
    scanner: SensitiveFieldScanner,
}

impl SecurityGate {
    pub fn new(scanner: SensitiveFieldScanner) -> Self {
        Self {
            screener: InputScreener::new(),
            classifier: ReadOnlyClassifier::new(),
            scanner,
        }
    }

    /// Gate using the given forbidden column names.
    pub fn with_forbidden_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(SensitiveFieldScanner::new(fields))
    }

    pub fn check(&self, question: &str, sql: &str) -> SecurityVerdict {
        if self.screener.is_potential_injection(question) {
            return SecurityVerdict::rejected(Rejection::InjectionAttempt);
        }
        if !self.classifier.is_read_only(sql) {
            return SecurityVerdict::rejected(Rejection::NotReadOnly);
        }
        if self.scanner.contains_forbidden_fields(sql) {
            return SecurityVerdict::rejected(Rejection::ForbiddenField);
        }
        SecurityVerdict::safe()
    }
}
