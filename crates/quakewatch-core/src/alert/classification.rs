//! Route-derived alert classification.

use std::fmt;

/// Fixed severity/type tag, determined by the receiving route only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    General,
    Critical,
    Warning,
    Quakewatch,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::General,
        Classification::Critical,
        Classification::Warning,
        Classification::Quakewatch,
    ];

    /// Lowercase tag used in file summary lines and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::General => "general",
            Classification::Critical => "critical",
            Classification::Warning => "warning",
            Classification::Quakewatch => "quakewatch",
        }
    }

    /// Route path that receives this classification.
    pub fn route(self) -> &'static str {
        match self {
            Classification::General => "/",
            Classification::Critical => "/critical",
            Classification::Warning => "/warning",
            Classification::Quakewatch => "/quakewatch",
        }
    }

    /// `status` value of the success response body.
    pub fn ack(self) -> &'static str {
        match self {
            Classification::General => "received",
            Classification::Critical => "critical alert received",
            Classification::Warning => "warning alert received",
            Classification::Quakewatch => "quakewatch alert received",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
