//! Log writer module
//!
//! Two sinks, one for access and info lines and one for warnings and
//! errors. Each goes to its console stream unless a file is configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Where a sink writes
enum Sink {
    Stdout,
    Stderr,
    File { path: String, file: Mutex<File> },
}

impl Sink {
    /// Open `path` for appending, or fall back to `console`
    fn open(path: Option<&str>, console: Self) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(console);
        };

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File {
            path: path.to_string(),
            file: Mutex::new(file),
        })
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::Stderr => eprintln!("{line}"),
            Self::File { file, .. } => {
                let mut f = file.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(f, "{line}");
            }
        }
    }

    fn destination(&self) -> &str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::File { path, .. } => path,
        }
    }
}

pub struct LogWriter {
    access: Sink,
    error: Sink,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: Sink::open(access_log_file, Sink::Stdout)?,
            error: Sink::open(error_log_file, Sink::Stderr)?,
        })
    }

    /// Write an access or info line
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    /// Write a warning or error line
    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }

    /// `(access, error)` destinations, as file paths or `stdout`/`stderr`
    pub fn destinations(&self) -> (&str, &str) {
        (self.access.destination(), self.error.destination())
    }
}

/// Initialize the global log writer
///
/// Fails if a log file cannot be opened or the writer is already set.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if `init()` has been called
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
