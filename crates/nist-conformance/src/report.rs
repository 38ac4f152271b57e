//! Accumulated conformance findings: per-severity and per-category counts
//! plus the individual [`Finding`]s (spec §4.9).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Something about the run itself (I/O, decode) rather than the data.
    Exec,
    /// The loaded specification lacks a record/field/item definition needed to check further.
    Config,
    /// A data value violated a declared rule (range, enum, required/duplicate).
    Check,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Exec => "exec",
            Category::Config => "config",
            Category::Check => "check",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub record_type: Option<u16>,
    pub field_id: Option<u16>,
    pub message: String,
}

#[derive(Debug, Default, Clone)]
pub struct Report {
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub fn push(
        &mut self,
        severity: Severity,
        category: Category,
        record_type: Option<u16>,
        field_id: Option<u16>,
        message: impl Into<String>,
    ) {
        self.findings.push(Finding { severity, category, record_type, field_id, message: message.into() });
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.findings.iter().filter(|f| f.category == category).count()
    }

    pub fn is_conformant(&self) -> bool {
        self.count(Severity::Fatal) == 0 && self.count(Severity::Error) == 0
    }

    /// Reset the accumulator for reuse across file walks (spec §5: "the
    /// conformance-checker's result accumulator may be shared across
    /// multiple file walks by being reset between runs").
    pub fn clear(&mut self) {
        self.findings.clear();
    }
}
