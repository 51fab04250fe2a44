use std::{
  collections::VecDeque,
  fs::{self, File, OpenOptions},
  io::{self, BufRead, BufReader, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use parking_lot::Mutex;
use tracing_subscriber::{EnvFilter, fmt::{self, time::LocalTime}, prelude::*};

use crate::configs::{LogFileConfig, LoggingConfig};

/// Filter directives from the configured level plus extra per-target filters.
pub fn filter_directives(logging: Option<&LoggingConfig>) -> String {
  let level = logging.and_then(|l| l.level.as_deref()).unwrap_or("info");
  match logging.and_then(|l| l.filters.as_deref()) {
    Some(filters) if !filters.is_empty() => format!("{},{}", level, filters),
    _ => level.to_string(),
  }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
pub fn init(logging: Option<&LoggingConfig>) {
  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(filter_directives(logging)));

  let stdout_layer = fmt::layer()
    .with_timer(LocalTime::rfc_3339())
    .with_target(true)
    .with_thread_ids(true)
    .with_line_number(true)
    .with_file(false);

  let file_layer = logging.and_then(|l| l.file.as_ref()).map(|file| {
    fmt::layer()
      .with_writer(LineCappedWriter::new(file))
      .with_timer(LocalTime::rfc_3339())
      .with_target(true)
      .with_thread_ids(true)
      .with_line_number(true)
      .with_ansi(false)
  });

  tracing_subscriber::registry()
    .with(env_filter)
    .with(stdout_layer)
    .with(file_layer)
    .init();
}

/// Appends to a log file and trims it back to `max_lines` once enough new
/// lines have accumulated.
#[derive(Clone)]
pub struct LineCappedWriter {
  path: PathBuf,
  max_lines: usize,
  written: Arc<Mutex<usize>>,
}

impl LineCappedWriter {
  pub fn new(config: &LogFileConfig) -> Self {
    if let Some(parent) = Path::new(&config.path).parent() {
      if let Err(e) = fs::create_dir_all(parent) {
        eprintln!("Failed to create log directory: {}", e);
      }
    }
    Self {
      path: PathBuf::from(&config.path),
      max_lines: config.max_lines.max(1) as usize,
      written: Arc::new(Mutex::new(0)),
    }
  }

  /// Trim every tenth of the cap, and at least every 50 lines.
  fn trim_threshold(&self) -> usize {
    (self.max_lines / 10).max(50)
  }

  fn trim(&self) -> io::Result<()> {
    let file = match File::open(&self.path) {
      Ok(f) => f,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(e),
    };

    let mut tail = VecDeque::with_capacity(self.max_lines + 1);
    let mut total = 0usize;
    for line in BufReader::new(file).lines() {
      tail.push_back(line?);
      total += 1;
      if tail.len() > self.max_lines {
        tail.pop_front();
      }
    }
    if total <= self.max_lines {
      return Ok(());
    }

    let mut file = File::create(&self.path)?;
    for line in &tail {
      writeln!(file, "{}", line)?;
    }
    Ok(())
  }
}

impl Write for LineCappedWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let mut written = self.written.lock();

    OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?
      .write_all(buf)?;

    *written += buf.iter().filter(|&&b| b == b'\n').count();
    if *written >= self.trim_threshold() {
      if let Err(e) = self.trim() {
        eprintln!("Failed to trim log file: {}", e);
      }
      *written = 0;
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> fmt::MakeWriter<'a> for LineCappedWriter {
  type Writer = Self;

  fn make_writer(&'a self) -> Self::Writer {
    self.clone()
  }
}
