//! Subject identifier file.
//!
//! The experimenter writes the current subject id into a small text file
//! before a session. The last non-blank line wins.

use crate::LogError;
use std::fs;
use std::path::Path;

/// Extract the subject id from the file contents.
///
/// Returns an empty string when every line is blank.
pub fn parse_subject_id(contents: &str) -> String {
    contents
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Read the subject id from `path`.
pub fn read_subject_id(path: impl AsRef<Path>) -> Result<String, LogError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| LogError::SubjectFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_subject_id(&contents))
}

/// Read the subject id, falling back to an empty id on any failure.
pub fn load_subject_id(path: impl AsRef<Path>) -> String {
    match read_subject_id(path) {
        Ok(id) if id.is_empty() => {
            log::warn!("Subject is empty");
            id
        }
        Ok(id) => {
            log::info!("Subject id: {}", id);
            id
        }
        Err(e) => {
            log::warn!("{}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_non_blank_line_wins() {
        assert_eq!(parse_subject_id("S01\nS02\n  S07  \n\n   \n"), "S07");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(parse_subject_id("S07"), "S07");
        assert_eq!(parse_subject_id("S07\r\n"), "S07");
    }

    #[test]
    fn test_blank_contents() {
        assert_eq!(parse_subject_id(""), "");
        assert_eq!(parse_subject_id("\n \n\t\n"), "");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("subject_id.txt");

        let err = read_subject_id(&missing).unwrap_err();
        assert!(matches!(err, LogError::SubjectFile { .. }));
        assert_eq!(load_subject_id(&missing), "");
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject_id.txt");
        fs::write(&path, "S03\nS07\n").unwrap();

        assert_eq!(read_subject_id(&path).unwrap(), "S07");
    }
}
