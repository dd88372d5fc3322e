use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the frame-time logging core.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to read subject file {}: {source}", path.display())]
    SubjectFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log writer queue is closed")]
    QueueClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LogError = io_err.into();
        assert!(matches!(err, LogError::Io(_)));
    }

    #[test]
    fn test_subject_file_message_names_path() {
        let err = LogError::SubjectFile {
            path: PathBuf::from("/data/subject_id.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let message = err.to_string();
        assert!(message.contains("/data/subject_id.txt"));
        assert!(message.contains("missing"));
    }
}
