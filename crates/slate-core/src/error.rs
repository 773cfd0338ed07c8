use crate::model::RecordId;
use chrono::NaiveDateTime;

use crate::model::format_start;

/// Unified error surface of the record store.
///
/// Every variant carries a stable `E####` code so transport adapters can map
/// outcomes without string matching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The operation referenced an id with no live record.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// Malformed input, e.g. a child created against a nonexistent group.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The schedule overlaps another schedulable record.
    #[error("schedule overlaps record {other}")]
    SchedulingConflict { other: RecordId },

    /// The schedule falls beyond the fixed planning window.
    #[error("schedule ends at {}, beyond the planning horizon {}", format_start(*end), format_start(*horizon))]
    HorizonExceeded {
        end: NaiveDateTime,
        horizon: NaiveDateTime,
    },

    /// External I/O failed during save or load. The in-memory store stays
    /// authoritative.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl StoreError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E2001",
            Self::Validation(_) => "E2002",
            Self::SchedulingConflict { .. } => "E3001",
            Self::HorizonExceeded { .. } => "E3002",
            Self::Persistence(_) => "E5001",
        }
    }

    /// Optional remediation hint surfaced by the CLI.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) | Self::Validation(_) => None,
            Self::SchedulingConflict { .. } => {
                Some("Pick a start time outside the conflicting record's window.")
            }
            Self::HorizonExceeded { .. } => {
                Some("Schedules must fall within one year of the first scheduled record.")
            }
            Self::Persistence(_) => Some("Check disk space and write permissions."),
        }
    }
}

/// Result alias used across the store surface.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::model::RecordId;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            StoreError::NotFound(RecordId(1)).code(),
            StoreError::Validation(String::new()).code(),
            StoreError::SchedulingConflict {
                other: RecordId(2),
            }
            .code(),
            StoreError::HorizonExceeded {
                end: chrono::NaiveDateTime::default(),
                horizon: chrono::NaiveDateTime::default(),
            }
            .code(),
            StoreError::Persistence(String::new()).code(),
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code), "duplicate code {code}");
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = StoreError::NotFound(RecordId(9)).code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn messages_name_the_offender() {
        let err = StoreError::SchedulingConflict {
            other: RecordId(42),
        };
        assert!(err.to_string().contains("42"));

        let err = StoreError::NotFound(RecordId(7));
        assert!(err.to_string().contains('7'));
    }
}
