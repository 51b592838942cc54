//! Common utilities for output formatting

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Output writer that can write to stdout or a file
pub struct OutputWriter {
    file: Option<std::fs::File>,
    destination: String,
}

impl OutputWriter {
    /// Create a new OutputWriter for stdout
    pub fn stdout() -> Self {
        Self {
            file: None,
            destination: "-".to_string(),
        }
    }

    /// Create a new OutputWriter appending to a file
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            file: Some(file),
            destination: path_str,
        })
    }

    /// Stdout for `None` or `"-"`, otherwise the named file
    pub fn open(path: Option<&Path>) -> io::Result<Self> {
        match path {
            Some(p) if p != Path::new("-") => Self::file(p),
            _ => Ok(Self::stdout()),
        }
    }

    /// Write a string to the output
    pub fn write(&mut self, s: &str) -> io::Result<()> {
        if let Some(ref mut f) = self.file {
            f.write_all(s.as_bytes())
        } else {
            let mut out = io::stdout().lock();
            out.write_all(s.as_bytes())?;
            out.flush()
        }
    }

    /// Write a string, adding a trailing newline if it lacks one
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        self.write(s)?;
        if s.ends_with('\n') {
            Ok(())
        } else {
            self.write("\n")
        }
    }

    /// Get the destination (file path or "-" for stdout)
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// Wraps a value in the `[...]` brackets used by the text reports
pub fn bracket(value: impl std::fmt::Display) -> String {
    format!("[{}]", value)
}
