use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::files::domain::file_job::FileJob;
use crate::shared::constants::AUDIO_EXTENSIONS;

/// Lists the audio files directly inside a directory (non-recursive).
pub struct AudioFileScanner {
    extensions: Vec<String>,
}

impl AudioFileScanner {
    pub fn new() -> Self {
        Self::with_extensions(AUDIO_EXTENSIONS)
    }

    pub fn with_extensions(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive match of the last extension against the allow-list.
    pub fn is_audio_file(&self, file_name: &str) -> bool {
        self.is_audio_path(Path::new(file_name))
    }

    fn is_audio_path(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Jobs for every matching regular file in `dir`, sorted by file name.
    ///
    /// Only a failure to open `dir` is an error. Entries that cannot be read
    /// are logged and skipped.
    pub fn scan(&self, dir: &Path) -> io::Result<Vec<FileJob>> {
        let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
        Ok(self.jobs_from_entries(entries))
    }

    fn jobs_from_entries<I>(&self, entries: I) -> Vec<FileJob>
    where
        I: IntoIterator<Item = io::Result<PathBuf>>,
    {
        let mut jobs = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if self.is_audio_path(&path) {
                jobs.push(FileJob::new(name, path));
            } else {
                log::debug!("Ignoring non-audio file '{name}'");
            }
        }
        jobs.sort_by(|a, b| a.file_name().cmp(b.file_name()));
        jobs
    }
}

impl Default for AudioFileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[rstest]
    #[case("a.wav", true)]
    #[case("audio.MP3", true)]
    #[case("song.Flac", true)]
    #[case("voice.ogg", true)]
    #[case("memo.m4a", true)]
    #[case("clip.aac", true)]
    #[case("old.WMA", true)]
    #[case("notes.txt", false)]
    #[case("readme.md", false)]
    #[case("wav", false)]
    #[case("archive.wav.zip", false)]
    fn test_is_audio_file(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(AudioFileScanner::new().is_audio_file(name), expected);
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.wav");
        touch(tmp.path(), "audio.MP3");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "a.flac");

        let jobs = AudioFileScanner::new().scan(tmp.path()).unwrap();
        let names: Vec<&str> = jobs.iter().map(|j| j.file_name()).collect();

        assert_eq!(names, vec!["a.flac", "audio.MP3", "b.wav"]);
        assert_eq!(jobs[0].path(), tmp.path().join("a.flac"));
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "deep.wav");
        // A directory that merely looks like an audio file is skipped too.
        fs::create_dir(tmp.path().join("folder.wav")).unwrap();

        let jobs = AudioFileScanner::new().scan(tmp.path()).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(AudioFileScanner::new()
            .scan(&tmp.path().join("missing"))
            .is_err());
    }

    #[test]
    fn test_custom_extensions() {
        let scanner = AudioFileScanner::with_extensions(&["OPUS"]);
        assert!(scanner.is_audio_file("x.opus"));
        assert!(!scanner.is_audio_file("x.wav"));
    }

    #[test]
    fn test_unreadable_entry_is_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");
        let entries = vec![
            Ok(tmp.path().join("b.wav")),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            Ok(tmp.path().join("a.wav")),
        ];

        let jobs = AudioFileScanner::new().jobs_from_entries(entries);
        let names: Vec<&str> = jobs.iter().map(|j| j.file_name()).collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_audio_name_is_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"caf\xe9.wav");
        let path = tmp.path().join(raw);
        if fs::write(&path, b"").is_err() {
            // File system rejects non UTF-8 names.
            return;
        }

        let jobs = AudioFileScanner::new().scan(tmp.path()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].path(), path);
        assert_eq!(jobs[0].file_name(), "caf\u{FFFD}.wav");
        assert_eq!(jobs[0].transcript_file_name(), "caf\u{FFFD}.txt");
    }
}
