use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_chunk::{plan_chunks, ChunkSpan};
use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::call_gate::CallGate;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::audio::domain::transcript::{ChunkResult, Transcript};
use crate::pipeline::infrastructure::threaded_worker_pool::{TaskPanic, ThreadedWorkerPool};
use crate::pipeline::transcription_error::{ChunkError, TranscriptionError};
use crate::shared::constants::{DEFAULT_CHUNK_LENGTH_SECS, DEFAULT_CHUNK_WORKERS, WHISPER_SAMPLE_RATE};

/// How a single file is split and how many of its chunks run at once.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkSettings {
    pub chunk_length_secs: f64,
    pub max_workers: usize,
    /// Per-chunk recognizer deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_length_secs: DEFAULT_CHUNK_LENGTH_SECS,
            max_workers: DEFAULT_CHUNK_WORKERS,
            timeout: None,
        }
    }
}

/// Transcribes one audio file: decode → fixed-length chunks → bounded
/// parallel recognition → text joined in chunk order.
///
/// A failing chunk (recognizer error, panic or timeout) is logged and
/// contributes an empty segment; its siblings are unaffected.
pub struct TranscribeAudioUseCase {
    reader: Arc<dyn AudioReader>,
    recognizer: Arc<dyn SpeechRecognizer>,
    settings: ChunkSettings,
    pool: ThreadedWorkerPool,
}

impl TranscribeAudioUseCase {
    pub fn new(
        reader: Arc<dyn AudioReader>,
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: ChunkSettings,
    ) -> Self {
        let pool = ThreadedWorkerPool::new(settings.max_workers);
        Self {
            reader,
            recognizer,
            settings,
            pool,
        }
    }

    pub fn settings(&self) -> &ChunkSettings {
        &self.settings
    }

    /// Transcribe `path`, returning an empty string if it cannot be decoded.
    pub fn transcribe_audio(&self, path: &Path) -> String {
        match self.execute(path) {
            Ok(transcript) => transcript.text(),
            Err(e) => {
                log::error!("{e}");
                String::new()
            }
        }
    }

    /// Transcribe `path`, surfacing decode failures to the caller.
    pub fn execute(&self, path: &Path) -> Result<Transcript, TranscriptionError> {
        let buffer = self.load_audio(path)?;
        Ok(self.transcribe_buffer(&path.display().to_string(), buffer))
    }

    /// Decode `path` to mono at the recognizer's sample rate.
    pub fn load_audio(&self, path: &Path) -> Result<AudioBuffer, TranscriptionError> {
        log::debug!("Loading audio file: {}", path.display());
        match self.reader.read_audio(path, WHISPER_SAMPLE_RATE) {
            Ok(Some(buffer)) => Ok(buffer),
            Ok(None) => Err(TranscriptionError::NoAudioStream(path.to_path_buf())),
            Err(e) => Err(TranscriptionError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Chunk an already-decoded buffer and recognize every chunk.
    /// `label` only appears in log messages.
    pub fn transcribe_buffer(&self, label: &str, buffer: AudioBuffer) -> Transcript {
        let rate = buffer.sample_rate();
        let spans = plan_chunks(buffer.len(), rate, self.settings.chunk_length_secs);
        let total = spans.len();

        log::info!("{label}: {:.2}s of audio", buffer.duration());
        log::info!(
            "{label}: splitting into {total} chunk(s) of {}s",
            self.settings.chunk_length_secs
        );
        for span in &spans {
            log::debug!(
                "{label}: prepared chunk {}/{total}: {:.2}s to {:.2}s",
                span.index + 1,
                span.start_time(rate),
                span.end_time(rate)
            );
        }

        let buffer = Arc::new(buffer);
        let mut transcript = Transcript::with_chunks(total);

        self.pool.run(
            spans,
            |span| self.transcribe_chunk(&buffer, span),
            |index, result| {
                let text = match result.map_err(ChunkError::from).and_then(|r| r) {
                    Ok(text) => {
                        log::debug!("{label}: chunk {}/{total} done", index + 1);
                        text
                    }
                    Err(e) => {
                        log::error!("{label}: chunk {}/{total} failed: {e}", index + 1);
                        String::new()
                    }
                };
                transcript.insert(ChunkResult::new(index, text));
            },
        );

        transcript
    }

    fn transcribe_chunk(&self, buffer: &Arc<AudioBuffer>, span: ChunkSpan) -> Result<String, ChunkError> {
        // Trailing chunk of an exact-multiple duration: nothing to recognize.
        if span.is_empty() {
            return Ok(String::new());
        }
        match self.settings.timeout {
            None => self
                .recognizer
                .transcribe(buffer.chunk(&span).samples())
                .map_err(|e| ChunkError::Recognizer(e.to_string())),
            Some(timeout) => {
                transcribe_with_deadline(self.recognizer.clone(), buffer.clone(), span, timeout)
            }
        }
    }
}

/// Run inference on a detached thread and stop waiting after `timeout`.
///
/// If the recognizer gates its calls, a permit is taken first so the clock
/// only runs once inference can start. The permit travels with the call and
/// is held until it returns, even after the deadline has passed.
///
/// On expiry the worker slot is released immediately; the abandoned call
/// keeps running in the background and its result is discarded.
fn transcribe_with_deadline(
    recognizer: Arc<dyn SpeechRecognizer>,
    buffer: Arc<AudioBuffer>,
    span: ChunkSpan,
    timeout: Duration,
) -> Result<String, ChunkError> {
    let (tx, rx) = crossbeam_channel::bounded::<Result<String, String>>(1);
    let permit = recognizer.gate().map(CallGate::acquire);

    thread::Builder::new()
        .name(format!("inference-chunk-{}", span.index))
        .spawn(move || {
            let _permit = permit;
            let result = recognizer
                .transcribe_admitted(buffer.chunk(&span).samples())
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
        })
        .map_err(|e| ChunkError::Recognizer(format!("failed to spawn inference thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(ChunkError::Recognizer),
        Err(RecvTimeoutError::Timeout) => Err(ChunkError::TimedOut(timeout)),
        Err(RecvTimeoutError::Disconnected) => Err(ChunkError::Panicked(TaskPanic {
            message: "inference thread exited without a result".to_string(),
        })),
    }
}
