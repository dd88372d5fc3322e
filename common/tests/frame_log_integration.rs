/// Integration tests for the frame log
/// These tests go through the public API the player uses: subject file,
/// day-stamped log file and the writer queue
use chrono::Local;
use common::{FrameLog, FrameLogWriter, FrameRecord, HEADER, WriteStatus, log_file_path};
use std::fs;

fn data_lines(contents: &str) -> Vec<&str> {
    contents.lines().filter(|l| !l.starts_with('#')).collect()
}

#[test]
fn test_reopen_same_day_keeps_content() {
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/movielog_", dir.path().display());

    let mut first = FrameLog::open(base.clone(), ".txt", "S07").unwrap();
    assert_eq!(first.write("movieA.mp4 0.1 1.0"), WriteStatus::Written);
    drop(first);

    let mut second = FrameLog::open(base, ".txt", "S07").unwrap();
    assert_eq!(second.write("movieA.mp4 0.2 2.0"), WriteStatus::Written);

    let contents = fs::read_to_string(second.path()).unwrap();
    assert!(contents.starts_with(HEADER));
    assert_eq!(contents.matches(HEADER).count(), 1);
    assert_eq!(data_lines(&contents).len(), 2);
}

#[test]
fn test_path_follows_subject_and_date() {
    let dir = tempfile::tempdir().unwrap();
    let subject_file = dir.path().join("subject_id.txt");
    fs::write(&subject_file, "S01\nS07\n\n").unwrap();

    let subject = common::subject::load_subject_id(&subject_file);
    let base = format!("{}/movielog_", dir.path().display());
    let log = FrameLog::open(base.clone(), ".txt", subject).unwrap();

    let expected = log_file_path(&base, "S07", Local::now().date_naive(), ".txt");
    assert_eq!(log.path(), expected.as_path());
}

#[test]
fn test_line_field_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/movielog_", dir.path().display());
    let mut log = FrameLog::open(base, ".txt", "S07").unwrap();

    assert!(log.write("movieA.mp4 0.42 123456.789").is_written());

    let contents = fs::read_to_string(log.path()).unwrap();
    let lines = data_lines(&contents);
    assert_eq!(lines.len(), 1);

    let fields: Vec<&str> = lines[0].split(' ').collect();
    assert_eq!(fields.len(), 6);
    assert!(fields[0].parse::<f64>().is_ok(), "requestTime: {}", fields[0]);
    assert!(!fields[1].contains(' '));
    assert_eq!(fields[2], "S07");
    assert_eq!(fields[3], "movieA.mp4");
    assert_eq!(fields[4], "0.42");
    assert_eq!(fields[5], "123456.789");
}

#[test]
fn test_writer_queue_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/movielog_", dir.path().display());
    let log = FrameLog::open(base, ".txt", "S02").unwrap();
    let path = log.path().to_path_buf();

    let writer = FrameLogWriter::spawn(log, 64);
    let handles: Vec<_> = (0..4).map(|_| writer.handle()).collect();

    let threads: Vec<_> = handles
        .into_iter()
        .enumerate()
        .map(|(n, handle)| {
            std::thread::spawn(move || {
                for i in 0..10 {
                    let movie = format!("movie{}.mp4", n);
                    while !handle.submit(FrameRecord::new(movie.clone(), i as f64 / 10.0, 1.0)) {
                        std::thread::yield_now();
                    }
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(writer.shutdown().unwrap(), 40);

    let contents = fs::read_to_string(path).unwrap();
    let lines = data_lines(&contents);
    assert_eq!(lines.len(), 40);
    assert!(lines.iter().all(|l| l.split(' ').count() == 6));
}

#[test]
fn test_full_queue_drops_instead_of_blocking() {
    let dir = tempfile::tempdir().unwrap();
    let base = format!("{}/movielog_", dir.path().display());
    let log = FrameLog::open(base, ".txt", "S03").unwrap();
    let path = log.path().to_path_buf();

    let writer = FrameLogWriter::spawn(log, 1);
    let handle = writer.handle();

    let submitted = 100_000u64;
    let rejected = (0..submitted)
        .map(|i| handle.submit(FrameRecord::new("flood.mp4", i as f64 / submitted as f64, 1.0)))
        .filter(|accepted| !accepted)
        .count() as u64;

    assert!(rejected > 0, "a capacity-1 queue should overflow");
    assert_eq!(handle.dropped(), rejected);

    let written = writer.shutdown().unwrap();
    assert_eq!(written + handle.dropped(), submitted);

    let contents = fs::read_to_string(path).unwrap();
    assert_eq!(data_lines(&contents).len() as u64, written);
}
