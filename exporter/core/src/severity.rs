use std::fmt;

/// A human-readable risk level, derived from a result's `total_risk` property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    Important,
    Moderate,
    Low,
    Unknown,
}

// === impl Severity ===

impl Severity {
    /// Classifies a `total_risk` value. Anything other than `1` through `4`, including a missing
    /// value, is `Unknown`.
    pub fn from_total_risk(total_risk: Option<&str>) -> Self {
        match total_risk {
            Some("4") => Self::Critical,
            Some("3") => Self::Important,
            Some("2") => Self::Moderate,
            Some("1") => Self::Low,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
