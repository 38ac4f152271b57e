use std::fmt;

/// Which 29109-2 rule produced a finding. Grouped the way the header rule
/// block and the per-FVMR rule block are grouped in spec §4.5/§4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    FormatMagic,
    SpecVersion,
    RecordLength,
    ReservedByte,
    CbeffOwner,
    Resolution,
    FvmrStructural,
    ViewMonotonic,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rule::FormatMagic => "format-magic",
            Rule::SpecVersion => "spec-version",
            Rule::RecordLength => "record-length",
            Rule::ReservedByte => "reserved-byte",
            Rule::CbeffOwner => "cbeff-owner",
            Rule::Resolution => "resolution",
            Rule::FvmrStructural => "fvmr-structural",
            Rule::ViewMonotonic => "view-monotonic",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
}

/// The accumulated outcome of one `validate` call. Unlike `fmr_core`'s
/// first-failure `Result`, this keeps every finding from the whole pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn push(&mut self, rule: Rule, severity: Severity, message: impl Into<String>) {
        self.findings.push(Finding { rule, severity, message: message.into() });
    }

    pub fn is_conformant(&self) -> bool {
        !self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}
