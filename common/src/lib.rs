//! Frame-time logging core for movielog.
//!
//! This crate holds everything the player needs to record when frames are
//! presented, without depending on the GUI toolkit or the media library.
//!
//! # Log format
//!
//! Each run appends to a plain text file scoped to one calendar day and one
//! subject. The file starts with a `#` comment block (see [`HEADER`]) and
//! then carries one line per presented frame:
//!
//! ```text
//! requestTime localTime subject movie frame frameTime
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use common::{FrameLog, FrameLogWriter, FrameRecord};
//!
//! let log = FrameLog::open("/tmp/logs/movielog_", ".txt", "S07").unwrap();
//! let writer = FrameLogWriter::spawn(log, 1024);
//!
//! let handle = writer.handle();
//! handle.submit(FrameRecord::new("movie.mp4", 0.5, common::clock::precise_time()));
//!
//! writer.shutdown().unwrap();
//! ```

pub mod clock;
mod error;
mod frame_log;
mod record;
pub mod subject;
mod writer;

pub use error::LogError;
pub use frame_log::{FrameLog, WriteStatus};
pub use record::{FrameRecord, HEADER, local_time_stamp, log_file_path, movie_name};
pub use writer::{FrameLogHandle, FrameLogWriter};
