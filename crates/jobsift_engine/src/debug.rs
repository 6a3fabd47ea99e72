//! Debug artifacts: deterministic names, atomic writes.
//!
//! Inspection files let a run be diagnosed after the fact: the structural
//! path dumps normalized markup, the model path dumps rendered prompts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("inspection directory missing or not writable: {0}")]
    InspectionDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the inspection directory exists; create it if missing.
pub fn ensure_inspection_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::InspectionDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::InspectionDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::InspectionDir(e.to_string()))?;
    }
    // Writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::InspectionDir(e.to_string()))?;
    Ok(())
}

/// Windows-safe, deterministic artifact name:
/// `{timestamp}--{sanitized_subject}--{short_hash(subject)}.{extension}`.
///
/// The hash disambiguates subjects that collide after sanitization.
pub fn artifact_filename(timestamp: &str, subject: &str, extension: &str) -> String {
    let sanitized = sanitize_subject(subject);
    let hash = short_hash(subject);
    format!("{timestamp}--{sanitized}--{hash}.{extension}")
}

fn sanitize_subject(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "no_subject".to_string();
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut excerpt = compacted;
    if excerpt.len() > 40 {
        let cut = (1..=40)
            .rev()
            .find(|&i| excerpt.is_char_boundary(i))
            .unwrap_or(0);
        excerpt.truncate(cut);
    }
    if is_reserved_windows_name(&excerpt) {
        excerpt.push('_');
    }
    excerpt
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file
/// then renaming.
#[derive(Debug)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_inspection_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace an existing artifact to keep reruns deterministic.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Destination for per-email inspection artifacts.
#[derive(Debug)]
pub struct DebugSink {
    writer: AtomicFileWriter,
}

impl DebugSink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    /// Write the normalized markup the structural extractor saw.
    pub fn write_markup(&self, subject: &str, markup: &str) -> Result<PathBuf, PersistError> {
        self.writer
            .write(&artifact_filename(&now_stamp(), subject, "html"), markup)
    }

    /// Write a fully rendered model prompt.
    pub fn write_prompt(&self, subject: &str, prompt: &str) -> Result<PathBuf, PersistError> {
        self.writer
            .write(&artifact_filename(&now_stamp(), subject, "txt"), prompt)
    }
}

fn now_stamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}
