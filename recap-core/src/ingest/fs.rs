//! File discovery and line-delimited JSON reading.
//!
//! Both operations degrade to empty results: a missing directory, an
//! unreadable file, or a malformed line is never an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Find files matching glob patterns under a base directory.
pub fn find_files(patterns: &[&str], base: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        match glob::glob(&full_pattern.to_string_lossy()) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    if entry.is_file() {
                        files.push(entry);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "Invalid glob pattern");
            }
        }
    }

    files
}

/// Iterate parsed JSON values from a JSONL file, one per non-blank line.
///
/// Malformed lines are skipped individually; an unreadable file yields an
/// empty sequence.
pub fn read_jsonl(path: &Path) -> Box<dyn Iterator<Item = serde_json::Value>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable file");
            return Box::new(std::iter::empty());
        }
    };

    let reader = BufReader::new(file);
    Box::new(reader.lines().filter_map(|line| {
        let line = line.ok()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }))
}

/// File name without its extension.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_files_missing_dir_is_empty() {
        let files = find_files(&["**/*.jsonl"], Path::new("/definitely/not/here"));
        assert!(files.is_empty());
    }

    #[test]
    fn test_read_jsonl_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"ok": 1}}"#).unwrap();
        writeln!(f, "not json").unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"ok": 2}}"#).unwrap();

        let values: Vec<_> = read_jsonl(&path).collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1]["ok"], 2);
    }

    #[test]
    fn test_read_jsonl_unreadable_file_is_empty() {
        let values: Vec<_> = read_jsonl(Path::new("/nope/missing.jsonl")).collect();
        assert!(values.is_empty());
    }
}
