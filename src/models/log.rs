//! Run log data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log detail line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
    Debug,
}

/// One detail line of a log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDetail {
    pub level: LogLevel,
    pub message: String,
}

/// Summary of one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub datetime: DateTime<Utc>,
    /// Command or exporter that produced the entry
    pub source: String,
    pub message: String,
    pub has_error: bool,
    #[serde(default)]
    pub details: Vec<LogDetail>,
}

impl LogEntry {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            datetime: Utc::now(),
            source: source.into(),
            message: message.into(),
            has_error: false,
            details: vec![],
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.details.push(LogDetail {
            level: LogLevel::Info,
            message: message.into(),
        });
    }

    /// Add an error line; marks the whole entry as failed
    pub fn error(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.details.push(LogDetail {
            level: LogLevel::Error,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_marks_entry() {
        let mut entry = LogEntry::new("checkmk-export", "Export finished");
        entry.info("srv1 exported");
        assert!(!entry.has_error);

        entry.error("srv2: no pool folder");
        assert!(entry.has_error);
        assert_eq!(entry.details.len(), 2);
        assert_eq!(entry.details[1].level, LogLevel::Error);
    }
}
