use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::SendError;

/// True if whisper.cpp knows `language`, either as a code (`pt`) or as a
/// full lowercase name (`portuguese`).
pub fn is_supported_language(language: &str) -> bool {
    whisper_rs::get_lang_id(&language.to_lowercase()).is_some()
}

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once in [`WhisperRecognizer::new`]. Each call to
/// `transcribe` creates its own inference state from the shared context, so
/// one recognizer can serve many worker threads at once.
pub struct WhisperRecognizer {
    model_path: PathBuf,
    context: WhisperContext,
    language: String,
    n_threads: usize,
}

impl WhisperRecognizer {
    /// Load the GGML model at `model_path`, configured to transcribe (not
    /// translate) `language` using `n_threads` threads per call.
    pub fn new(model_path: &Path, language: &str, n_threads: usize) -> Result<Self, SendError> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        let language = language.to_lowercase();
        if !is_supported_language(&language) {
            return Err(format!("Unsupported Whisper language: '{language}'").into());
        }

        log::info!("Loading Whisper model '{}'...", model_path.display());
        let context = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;
        log::info!("Whisper model loaded.");

        Ok(Self {
            model_path: model_path.to_path_buf(),
            context,
            language,
            n_threads: n_threads.max(1),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn params(&self) -> FullParams<'_, '_> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        params.set_translate(false);
        params.set_no_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(self.n_threads as i32);
        params
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, samples: &[f32]) -> Result<String, SendError> {
        let mut state = self
            .context
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        state
            .full(self.params(), samples)
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut text = String::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            match segment.to_str_lossy() {
                Ok(s) => text.push_str(&s),
                Err(e) => log::debug!("Skipping undecodable segment {seg_idx}: {e}"),
            }
        }

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result = WhisperRecognizer::new(Path::new("/nonexistent/model.bin"), "pt", 1);
        let err = result.err().unwrap().to_string();
        assert!(err.contains("not found"), "Expected 'not found' in error, got: {err}");
    }

    #[test]
    fn test_language_names_and_codes_are_supported() {
        assert!(is_supported_language("portuguese"));
        assert!(is_supported_language("Portuguese"));
        assert!(is_supported_language("pt"));
        assert!(is_supported_language("en"));
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        assert!(!is_supported_language("klingon"));
    }

    #[test]
    fn test_new_rejects_unknown_language() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let result = WhisperRecognizer::new(tmp.path(), "klingon", 1);
        let err = result.err().unwrap().to_string();
        assert!(err.contains("Unsupported"), "got: {err}");
    }

    #[test]
    #[ignore] // Requires whisper model file
    fn test_transcribe_does_not_crash_on_sine_wave() {
        use crate::shared::constants::{
            whisper_model_file_name, whisper_model_url, WHISPER_SAMPLE_RATE,
        };

        let model_path = crate::shared::model_resolver::resolve(
            &whisper_model_file_name("tiny"),
            &whisper_model_url("tiny"),
            None,
            None,
        )
        .expect("Failed to resolve whisper model");
        let recognizer =
            WhisperRecognizer::new(&model_path, "portuguese", 2).expect("Failed to load model");

        let len = 3 * WHISPER_SAMPLE_RATE as usize;
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f64 / WHISPER_SAMPLE_RATE as f64;
                (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32 * 0.5
            })
            .collect();

        let result = recognizer.transcribe(&samples);
        assert!(result.is_ok(), "Transcription should not error: {result:?}");
    }
}
