use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the workspace directory
pub const WORKSPACE_DIR_NAME: &str = ".focusboard";

/// Environment variable that pins the workspace directory
pub const WORKSPACE_DIR_ENV: &str = "FOCUSBOARD_DIR";

/// Get the workspace directory - `$FOCUSBOARD_DIR`, then a local .focusboard
/// found walking up from the current directory, then ~/.focusboard
pub fn get_workspace_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(WORKSPACE_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_workspace(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(WORKSPACE_DIR_NAME))
}

/// Find a local workspace directory by walking up the directory tree
fn find_local_workspace(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let candidate = current.join(WORKSPACE_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Ensure the workspace directory exists
pub fn ensure_workspace_dir() -> Result<PathBuf> {
    let dir = get_workspace_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local workspace directory in the current directory
pub fn init_local_workspace() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let dir = current_dir.join(WORKSPACE_DIR_NAME);

    if dir.exists() {
        anyhow::bail!("Workspace directory already exists: {}", dir.display());
    }

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    Ok(dir)
}

/// Board snapshot file inside a workspace directory
pub fn board_file(dir: &Path) -> PathBuf {
    dir.join("board.json")
}

/// Workspace configuration file
pub fn config_file(dir: &Path) -> PathBuf {
    dir.join("config.json")
}

/// Append-only focus session history
pub fn history_file(dir: &Path) -> PathBuf {
    dir.join("focus-history.jsonl")
}

/// Log file used while the terminal UI owns stderr
pub fn log_file(dir: &Path) -> PathBuf {
    dir.join("focusboard.log")
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().context("File path has no parent directory")?;

    let mut temp_file = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

/// Read file content, return empty string if file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Copy a file aside with a timestamp, e.g. board.bak.20240101_120000.json
pub fn backup_file<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bak")
        .to_string();
    let backup_path = path.with_extension(format!("bak.{}.{}", timestamp, extension));

    fs::copy(path, &backup_path)
        .with_context(|| format!("Failed to backup file: {}", path.display()))?;

    Ok(backup_path)
}

/// Append content to a file, creating it if needed
pub fn append_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open file for appending: {}", path.display()))?;

    file.write_all(content.as_bytes())
        .context("Failed to append to file")?;

    file.sync_all().context("Failed to sync file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_local_workspace_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path().join(WORKSPACE_DIR_NAME);
        fs::create_dir_all(&workspace).unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_workspace(&nested), Some(workspace));
    }

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("board.json");

        atomic_write(&test_file, "{}").unwrap();
        assert_eq!(read_file(&test_file).unwrap(), "{}");

        atomic_write(&test_file, "{\"tasks\":[]}").unwrap();
        assert_eq!(read_file(&test_file).unwrap(), "{\"tasks\":[]}");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("nonexistent.json");
        assert_eq!(read_file(&test_file).unwrap(), "");
    }

    #[test]
    fn test_append_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("history.jsonl");

        append_to_file(&test_file, "Line 1\n").unwrap();
        append_to_file(&test_file, "Line 2\n").unwrap();

        assert_eq!(read_file(&test_file).unwrap(), "Line 1\nLine 2\n");
    }

    #[test]
    fn test_backup_file_keeps_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("board.json");

        atomic_write(&test_file, "not json").unwrap();
        let backup_path = backup_file(&test_file).unwrap();

        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().ends_with(".json"));
        assert_eq!(read_file(&backup_path).unwrap(), "not json");
    }
}
