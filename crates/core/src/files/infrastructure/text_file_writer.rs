use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::files::domain::transcript_writer::TranscriptWriter;
use crate::shared::SendError;

/// Writes transcripts as UTF-8 text files, exactly as given (no trailing newline).
pub struct TextFileWriter;

impl TextFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptWriter for TextFileWriter {
    /// Writes a sibling `.part` file and renames it over `path`, so readers
    /// only ever see a complete transcript.
    fn write(&self, path: &Path, text: &str) -> Result<(), SendError> {
        let temp_path = part_path(path);
        let result =
            fs::write(&temp_path, text.as_bytes()).and_then(|()| fs::rename(&temp_path, path));
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(format!("Failed to write {}: {e}", path.display()).into());
        }
        Ok(())
    }
}

/// `a.txt` -> `a.txt.part`, next to the target.
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
