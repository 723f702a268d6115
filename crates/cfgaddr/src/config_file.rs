//! configuration dump loaded into memory
//!
//! [ConfigFile] keeps
//! - the source path (if any)
//! - the decoded text
//! and hands out its lines by reference. It is never modified once loaded.
use std::path::{Path, PathBuf};

#[derive(Default, Debug)]
pub struct ConfigFile {
    source: Option<PathBuf>,
    content: String,
}

impl ConfigFile {
    pub fn new(content: String, path: impl Into<Option<PathBuf>>) -> Self {
        let content = match content.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => content,
        };

        // a lone `\r` ends a line too
        let content = if content.contains('\r') {
            content.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            content
        };

        Self {
            source: path.into(),
            content,
        }
    }

    /// Decode raw bytes permissively
    ///
    /// Invalid UTF-8 sequences are dropped instead of failing the whole file.
    pub fn from_bytes(bytes: &[u8], path: impl Into<Option<PathBuf>>) -> Self {
        let mut content = String::with_capacity(bytes.len());
        let mut dropped = false;
        for chunk in bytes.utf8_chunks() {
            content.push_str(chunk.valid());
            dropped |= !chunk.invalid().is_empty();
        }

        if dropped {
            tracing::warn!("input is not valid utf-8, dropping undecodable bytes");
        }

        Self::new(content, path)
    }

    pub fn load_file(file_path: &Path) -> Result<Self, LoadError> {
        if !file_path.exists() {
            return Err(LoadError::NotFound {
                path: file_path.to_owned(),
            });
        }

        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let bytes = std::fs::read(&file_path)?;
        Ok(Self::from_bytes(&bytes, file_path))
    }

    /// Lines without their terminators (`\n`, `\r\n` or `\r`)
    pub fn lines(&self) -> std::str::Lines<'_> {
        self.content.lines()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}

impl From<String> for ConfigFile {
    fn from(value: String) -> Self {
        ConfigFile::new(value, None)
    }
}

impl From<&str> for ConfigFile {
    fn from(value: &str) -> Self {
        ConfigFile::new(value.to_string(), None)
    }
}

/// Utility macro to create a [ConfigFile] line by line
///
/// ```
/// # use cfgaddr::config_file;
/// let file = config_file![
///     "config firewall address",
///     "    edit \"web\"",
///     "        set subnet 10.0.0.1 255.255.255.255",
///     "    next",
///     "end",
/// ];
/// assert_eq!(file.lines().count(), 5);
/// ```
#[macro_export]
macro_rules! config_file {
    [ $($line:expr),* $(,)? ] => {{
        let lines: &[&str] = &[$($line),*];
        $crate::config_file::ConfigFile::from(lines.join("\n"))
    }};
}
