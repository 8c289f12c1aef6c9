use std::path::Path;

use crate::shared::SendError;

/// Domain interface for persisting a file's joined transcript.
pub trait TranscriptWriter: Send + Sync {
    fn write(&self, path: &Path, text: &str) -> Result<(), SendError>;
}
