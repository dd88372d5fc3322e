use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};

/// Comment block written once at the top of every new log file.
pub const HEADER: &str = "\
#Movie recorder. Marks the time at which each video frame is presented
#(the playback position changed).
#frame is the playback position as a fraction of the movie (zero to one).
#frameTime (last column) is in seconds since the UTC epoch 1/1/1601 at 12am.
#requestTime is seconds since 1/1/1970 when the line was written.
#
#requestTime localTime subject movie frame frameTime
";

/// One position-change event, as submitted by the media callback.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Movie path with spaces replaced, see [`movie_name`]
    pub movie: String,

    /// Normalized playback position in [0, 1]
    pub position: f64,

    /// High-resolution presentation timestamp, see [`crate::clock::precise_time`]
    pub frame_time: f64,
}

impl FrameRecord {
    pub fn new(movie: impl Into<String>, position: f64, frame_time: f64) -> Self {
        Self {
            movie: movie.into(),
            position: position.clamp(0.0, 1.0),
            frame_time,
        }
    }
}

/// Caller-supplied part of a log line: `movie frame frameTime`.
impl fmt::Display for FrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.7}",
            self.movie, self.position, self.frame_time
        )
    }
}

/// Make a media path safe to use as a single space-separated field.
pub fn movie_name(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().replace(' ', "_")
}

/// Day-stamped log path: `<base><subject><Month>_<day>_<year><extension>`.
///
/// `base` is a prefix, not a directory: `/data/movielog_` yields files such
/// as `/data/movielog_S07March_5_2024.txt`.
pub fn log_file_path(base: &str, subject: &str, date: NaiveDate, extension: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}{}{}{}",
        base,
        subject,
        date.format("%B_%-d_%Y"),
        extension
    ))
}

/// ctime-style local time with spaces replaced, e.g. `Tue_Mar__5_14:03:22_2024`.
pub fn local_time_stamp(time: &NaiveDateTime) -> String {
    time.format("%a %b %e %H:%M:%S %Y")
        .to_string()
        .replace(' ', "_")
}
