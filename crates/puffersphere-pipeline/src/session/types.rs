//! Session bookkeeping: metadata, audit log, export records.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// [`ProblemType::name`](super::ProblemType::name) of the owning session.
    pub problem_type: String,
    pub schema_version: u32,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub last_modified: u64,
}

impl SessionMetadata {
    pub fn new(problem_type: impl Into<String>, schema_version: u32) -> Self {
        let now = current_timestamp();
        Self {
            problem_type: problem_type.into(),
            schema_version,
            created_at: now,
            last_modified: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = current_timestamp();
    }
}

/// One step of the session's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: u64,
    /// Step name, e.g. `"filter"` or `"fit"`.
    pub operation: String,
    pub success: bool,
    /// Summary on success, error message on failure.
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn success(operation: impl Into<String>) -> Self {
        Self::entry(operation.into(), true, None)
    }

    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self::entry(operation.into(), true, Some(notes.into()))
    }

    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self::entry(operation.into(), false, Some(error.into()))
    }

    fn entry(operation: String, success: bool, notes: Option<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation,
            success,
            notes,
        }
    }
}

/// An export together with when it was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord<E> {
    pub timestamp: u64,
    pub export: E,
}

impl<E> ExportRecord<E> {
    pub fn new(export: E) -> Self {
        Self {
            timestamp: current_timestamp(),
            export,
        }
    }
}

/// Seconds since the Unix epoch; `0` if the system clock is before it.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
