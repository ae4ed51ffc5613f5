//! Single-run log.
//!
//! One append-only file per run, one line per message:
//!
//! ```text
//! [2025-01-31 14:02:11] INFO: Photos found: 412
//! ```
//!
//! File-backed logs mirror every line to the console. [`RunLog`] also
//! implements [`log::Log`] so library diagnostics emitted through the `log`
//! facade end up in the same file once it is installed as the global logger.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

use crate::error::{PipelineError, Result};

/// Where file-backed lines are mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    Stderr,
    Off,
}

#[derive(Debug)]
enum Sink {
    File { path: PathBuf, file: Mutex<File> },
    Memory(Mutex<Vec<String>>),
}

/// Cheaply cloneable handle to a run log.
#[derive(Debug, Clone)]
pub struct RunLog {
    sink: Arc<Sink>,
    console: Console,
    max_level: LevelFilter,
}

/// `<root>/logs/<workflow>/<YYYYmmdd_HHMMSS>.log`
pub fn workflow_log_path(root: &Path, workflow: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    root.join("logs").join(workflow).join(format!("{stamp}.log"))
}

impl RunLog {
    /// Open (append) a log file, creating parent directories.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Io`] if the directory or file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipelineError::io(format!("creating log dir {}", parent.display()), e)
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PipelineError::io(format!("opening log {}", path.display()), e))?;
        Ok(Self {
            sink: Arc::new(Sink::File {
                path: path.to_path_buf(),
                file: Mutex::new(file),
            }),
            console: Console::Stdout,
            max_level: LevelFilter::Info,
        })
    }

    /// Log kept in memory, never mirrored.
    pub fn in_memory() -> Self {
        Self {
            sink: Arc::new(Sink::Memory(Mutex::new(Vec::new()))),
            console: Console::Off,
            max_level: LevelFilter::Info,
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Most verbose level written. INFO and above are always written when
    /// called directly; the filter applies to [`RunLog::debug`] and to
    /// records arriving through the `log` facade.
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &*self.sink {
            Sink::File { path, .. } => Some(path),
            Sink::Memory(_) => None,
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.write(Level::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.write(Level::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.write(Level::Error, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if Level::Debug <= self.max_level {
            self.write(Level::Debug, message.as_ref());
        }
    }

    /// Every line written so far. File-backed logs re-read their file, which
    /// includes lines from earlier opens of the same path.
    pub fn lines(&self) -> Vec<String> {
        match &*self.sink {
            Sink::Memory(lines) => lock(lines).clone(),
            Sink::File { path, .. } => std::fs::read_to_string(path)
                .map(|text| text.lines().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    /// True if any line contains `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.lines().iter().any(|line| line.contains(message))
    }

    fn write(&self, level: Level, message: &str) {
        let line = format_line(level, message);
        match &*self.sink {
            Sink::Memory(lines) => lock(lines).push(line),
            Sink::File { path, file } => {
                if let Err(err) = writeln!(lock(file), "{line}") {
                    eprintln!("failed to write log {}: {err}", path.display());
                }
                match self.console {
                    Console::Stdout => println!("{line}"),
                    Console::Stderr => eprintln!("{line}"),
                    Console::Off => {}
                }
            }
        }
    }
}

impl log::Log for RunLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.write(record.level(), &record.args().to_string());
        }
    }

    fn flush(&self) {
        if let Sink::File { file, .. } = &*self.sink {
            let _ = lock(file).flush();
        }
    }
}

fn format_line(level: Level, message: &str) -> String {
    let label = match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug | Level::Trace => "DEBUG",
    };
    format!(
        "[{}] {label}: {message}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
