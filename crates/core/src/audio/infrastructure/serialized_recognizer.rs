use crate::audio::domain::call_gate::CallGate;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::SendError;

/// Runs at most one `transcribe` call at a time on the wrapped recognizer.
///
/// For back-ends that are not safe to invoke concurrently (or that own a
/// single accelerator). Decoding and chunk planning still run in parallel
/// around it; only inference waits on the gate.
pub struct SerializedRecognizer {
    inner: Box<dyn SpeechRecognizer>,
    gate: CallGate,
}

impl SerializedRecognizer {
    pub fn new(inner: Box<dyn SpeechRecognizer>) -> Self {
        Self {
            inner,
            gate: CallGate::new(1),
        }
    }
}

impl SpeechRecognizer for SerializedRecognizer {
    fn transcribe(&self, samples: &[f32]) -> Result<String, SendError> {
        let _permit = self.gate.acquire();
        self.inner.transcribe(samples)
    }

    fn gate(&self) -> Option<&CallGate> {
        Some(&self.gate)
    }

    fn transcribe_admitted(&self, samples: &[f32]) -> Result<String, SendError> {
        self.inner.transcribe(samples)
    }
}
