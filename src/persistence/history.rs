use super::files::{append_to_file, read_file};
use crate::domain::FocusSessionRecord;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Sink for completed (or explicitly recorded) focus sessions
pub trait SessionHistory {
    fn record(&mut self, record: &FocusSessionRecord) -> Result<()>;
}

impl SessionHistory for Vec<FocusSessionRecord> {
    fn record(&mut self, record: &FocusSessionRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// JSON-lines history file, one record per line
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<FocusSessionRecord>> {
        load_history(&self.path)
    }
}

impl SessionHistory for FileHistory {
    fn record(&mut self, record: &FocusSessionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        append_to_file(&self.path, &line).map_err(|e| Error::Persistence(format!("{:#}", e)))
    }
}

/// Read all records, skipping lines that do not parse
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<Vec<FocusSessionRecord>> {
    let content = read_file(path.as_ref()).map_err(|e| Error::Persistence(format!("{:#}", e)))?;
    let mut records = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<FocusSessionRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(line = line_no + 1, error = %e, "skipping focus history entry"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(task_id: &str, completed: bool) -> FocusSessionRecord {
        FocusSessionRecord {
            task_id: task_id.to_string(),
            start_time: 1_700_000_000_000,
            duration: 25 * 60 * 1000,
            completed,
            sessions_completed: 1,
        }
    }

    #[test]
    fn test_record_and_load() {
        let dir = tempdir().unwrap();
        let mut history = FileHistory::new(dir.path().join("focus-history.jsonl"));
        history.record(&record("a", true)).unwrap();
        history.record(&record("b", false)).unwrap();

        let loaded = history.load().unwrap();
        assert_eq!(loaded, vec![record("a", true), record("b", false)]);
    }

    #[test]
    fn test_load_skips_bad_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("focus-history.jsonl");
        let good = serde_json::to_string(&record("a", true)).unwrap();
        std::fs::write(&path, format!("{}\ngarbage\n\n{}\n", good, good)).unwrap();

        assert_eq!(load_history(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        assert!(load_history(dir.path().join("none.jsonl")).unwrap().is_empty());
    }

    #[test]
    fn test_record_uses_camel_case() {
        let json = serde_json::to_string(&record("a", true)).unwrap();
        assert!(json.contains("\"taskId\":\"a\""));
        assert!(json.contains("\"sessionsCompleted\":1"));
    }
}
