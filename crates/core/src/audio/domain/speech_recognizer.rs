use crate::audio::domain::call_gate::CallGate;
use crate::shared::SendError;

/// Domain interface for speech-to-text transcription.
///
/// Takes mono samples at the recognizer's expected sample rate and returns
/// the recognized text. One instance is shared by every concurrent chunk
/// task, so implementations must tolerate concurrent calls to `transcribe`
/// (or be wrapped in a `SerializedRecognizer`).
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, samples: &[f32]) -> Result<String, SendError>;

    /// Gate every call must pass before inference starts, if calls are
    /// limited. Callers that put a deadline on a call acquire it first, so
    /// waiting for a turn is not counted, then use [`transcribe_admitted`].
    ///
    /// [`transcribe_admitted`]: SpeechRecognizer::transcribe_admitted
    fn gate(&self) -> Option<&CallGate> {
        None
    }

    /// `transcribe` for a caller already holding a permit from [`gate`].
    ///
    /// [`gate`]: SpeechRecognizer::gate
    fn transcribe_admitted(&self, samples: &[f32]) -> Result<String, SendError> {
        self.transcribe(samples)
    }
}
