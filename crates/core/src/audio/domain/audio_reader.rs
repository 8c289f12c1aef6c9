use std::path::Path;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::shared::SendError;

/// Domain interface for decoding an audio file.
pub trait AudioReader: Send + Sync {
    /// Decode the first audio stream to a mono buffer at `target_sample_rate`.
    /// Returns None if the file has no audio stream.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioBuffer>, SendError>;
}
