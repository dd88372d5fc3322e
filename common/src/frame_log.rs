//! Append-only, day-stamped frame log file.

use crate::clock;
use crate::record::{HEADER, local_time_stamp, log_file_path};
use chrono::{Local, NaiveDate};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Outcome of [`FrameLog::write`]. I/O failures never escape the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Failed,
}

impl WriteStatus {
    pub fn is_written(self) -> bool {
        self == Self::Written
    }
}

/// Per-day, per-subject log file kept open in append mode.
#[derive(Debug)]
pub struct FrameLog {
    base: String,
    extension: String,
    subject: String,
    day: NaiveDate,
    path: PathBuf,
    file: File,
}

impl FrameLog {
    /// Open today's log for `subject`, creating it with a header if needed.
    pub fn open(
        base: impl Into<String>,
        extension: impl Into<String>,
        subject: impl Into<String>,
    ) -> io::Result<Self> {
        let base = base.into();
        let extension = extension.into();
        let subject = subject.into();

        let day = Local::now().date_naive();
        let path = log_file_path(&base, &subject, day, &extension);
        let file = open_append(&path)?;

        log::info!("Frame log: {}", path.display());

        Ok(Self {
            base,
            extension,
            subject,
            day,
            path,
            file,
        })
    }

    /// Append `"<requestTime> <localTime> <subject> <data>"` as one line.
    pub fn write(&mut self, data: &str) -> WriteStatus {
        match self.try_write(data) {
            Ok(()) => WriteStatus::Written,
            Err(e) => {
                log::warn!("Failed to write to {}: {}", self.path.display(), e);
                WriteStatus::Failed
            }
        }
    }

    fn try_write(&mut self, data: &str) -> io::Result<()> {
        let now = Local::now();
        self.roll_to(now.date_naive())?;
        self.reopen_if_missing()?;

        let line = format!(
            "{:.7} {} {} {}\n",
            clock::unix_time(),
            local_time_stamp(&now.naive_local()),
            self.subject,
            data
        );
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }

    /// Switch to the file for `day` if it differs from the current one.
    fn roll_to(&mut self, day: NaiveDate) -> io::Result<()> {
        if day == self.day {
            return Ok(());
        }

        let path = log_file_path(&self.base, &self.subject, day, &self.extension);
        self.file = open_append(&path)?;
        log::info!(
            "Day changed, frame log moved from {} to {}",
            self.path.display(),
            path.display()
        );
        self.day = day;
        self.path = path;
        Ok(())
    }

    /// Recreate the file (with header) if it was deleted or rotated away.
    fn reopen_if_missing(&mut self) -> io::Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        log::warn!("{} disappeared, reopening", self.path.display());
        self.file = open_append(&self.path)?;
        Ok(())
    }

    /// Path of the file currently written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Open `path` for appending, writing [`HEADER`] only when the file is new.
fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(HEADER.as_bytes())?;
            log::debug!("Created {} with header", path.display());
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    OpenOptions::new().append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_in(dir: &Path) -> String {
        format!("{}/movielog_", dir.display())
    }

    #[test]
    fn test_open_creates_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = FrameLog::open(base_in(dir.path()), ".txt", "S07").unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents, HEADER);
        assert_eq!(log.subject(), "S07");
    }

    #[test]
    fn test_open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = format!("{}/timing/nested/movielog_", dir.path().display());
        let log = FrameLog::open(base, ".txt", "").unwrap();
        assert!(log.path().exists());
    }

    #[test]
    fn test_write_appends_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FrameLog::open(base_in(dir.path()), ".txt", "S07").unwrap();

        let status = log.write("movieA.mp4 0.42 123456.789");
        assert_eq!(status, WriteStatus::Written);

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" S07 movieA.mp4 0.42 123456.789"));
        assert_eq!(lines[0].split(' ').count(), 6);
    }

    #[test]
    fn test_write_recreates_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FrameLog::open(base_in(dir.path()), ".txt", "S07").unwrap();
        log.write("movieA.mp4 0.1 1.0");

        fs::remove_file(log.path()).unwrap();
        assert_eq!(log.write("movieA.mp4 0.42 123456.789"), WriteStatus::Written);

        let contents = fs::read_to_string(log.path()).unwrap();
        assert!(contents.starts_with(HEADER));
        let lines: Vec<&str> = contents.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" S07 movieA.mp4 0.42 123456.789"));
    }

    #[test]
    fn test_roll_to_new_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FrameLog::open(base_in(dir.path()), ".txt", "S07").unwrap();
        let first = log.path().to_path_buf();

        let tomorrow = log.day.succ_opt().unwrap();
        log.roll_to(tomorrow).unwrap();

        assert_ne!(log.path(), first);
        assert_eq!(fs::read_to_string(log.path()).unwrap(), HEADER);
    }
}
