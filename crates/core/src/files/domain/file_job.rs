use std::path::{Path, PathBuf};

use crate::shared::constants::TRANSCRIPT_EXTENSION;

/// One discovered audio file, transcribed end-to-end by a single worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileJob {
    file_name: String,
    path: PathBuf,
}

impl FileJob {
    pub fn new(file_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            path: path.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<stem>.txt`, where the stem drops only the last extension
    /// (`talk.part1.mp3` -> `talk.part1.txt`).
    pub fn transcript_file_name(&self) -> String {
        let stem = match self.file_name.rfind('.') {
            Some(dot) if dot > 0 => &self.file_name[..dot],
            _ => self.file_name.as_str(),
        };
        format!("{stem}.{TRANSCRIPT_EXTENSION}")
    }

    pub fn transcript_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.transcript_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::simple("a.wav", "a.txt")]
    #[case::uppercase_extension("audio.MP3", "audio.txt")]
    #[case::multiple_dots("talk.part1.flac", "talk.part1.txt")]
    #[case::leading_dot(".wav", ".wav.txt")]
    #[case::no_extension("recording", "recording.txt")]
    fn test_transcript_file_name(#[case] name: &str, #[case] expected: &str) {
        let job = FileJob::new(name, Path::new("/in").join(name));
        assert_eq!(job.transcript_file_name(), expected);
    }

    #[test]
    fn test_transcript_path_is_in_output_dir() {
        let job = FileJob::new("b.ogg", "/in/b.ogg");
        assert_eq!(
            job.transcript_path(Path::new("/in/transcriptions")),
            PathBuf::from("/in/transcriptions/b.txt")
        );
    }

    #[test]
    fn test_accessors() {
        let job = FileJob::new("c.m4a", "/in/c.m4a");
        assert_eq!(job.file_name(), "c.m4a");
        assert_eq!(job.path(), Path::new("/in/c.m4a"));
    }
}
