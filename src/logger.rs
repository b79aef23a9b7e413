use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Appends log records to a file. The terminal belongs to the UI, so nothing
/// is ever written to stdout or stderr.
pub struct FileLogger {
    file: Mutex<Option<File>>,
}

lazy_static::lazy_static! {
    static ref LOGGER: FileLogger = FileLogger {
        file: Mutex::new(None),
    };
}

/// Open (or reopen) the log file and install the logger. Safe to call more
/// than once; later calls only swap the file and level.
pub fn init(path: &Path, level: LevelFilter) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    if let Ok(mut slot) = LOGGER.file.lock() {
        *slot = Some(file);
    }

    // Already installed on a repeated init.
    let _ = log::set_logger(&*LOGGER);
    log::set_max_level(level);
    Ok(())
}

pub fn format_record(level: Level, target: &str, message: &str) -> String {
    format!(
        "[{}] {:<5} {}: {}",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        level,
        target,
        message
    )
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(mut slot) = self.file.lock() else {
            return;
        };
        if let Some(file) = slot.as_mut() {
            let line = format_record(record.level(), record.target(), &record.args().to_string());
            let _ = writeln!(file, "{}", line);
        }
    }

    fn flush(&self) {
        if let Ok(mut slot) = self.file.lock()
            && let Some(file) = slot.as_mut()
        {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record() {
        let line = format_record(Level::Info, "quiz_room::session", "loaded 3 questions");
        assert!(line.starts_with('['));
        assert!(line.contains("INFO  quiz_room::session: loaded 3 questions"));
    }

    #[test]
    fn test_logger_writes_to_latest_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");
        init(&first, LevelFilter::Debug).unwrap();
        init(&second, LevelFilter::Debug).unwrap();
        log::info!("Test log message");
        log::logger().flush();

        let content = std::fs::read_to_string(&second).unwrap();
        assert!(content.contains("Test log message"));
    }
}
