use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::files::domain::file_job::FileJob;
use crate::files::domain::transcript_writer::TranscriptWriter;
use crate::files::infrastructure::audio_file_scanner::AudioFileScanner;
use crate::pipeline::infrastructure::threaded_worker_pool::ThreadedWorkerPool;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::transcribe_audio_use_case::{ChunkSettings, TranscribeAudioUseCase};
use crate::pipeline::transcription_error::TranscriptionError;
use crate::shared::constants::{DEFAULT_FILE_WORKERS, TRANSCRIPTIONS_DIR_NAME};
use crate::shared::SendError;

/// Widths of the outer (files) and inner (chunks) pools.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionSettings {
    pub file_workers: usize,
    pub chunk: ChunkSettings,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            file_workers: DEFAULT_FILE_WORKERS,
            chunk: ChunkSettings::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFailure {
    pub file_name: String,
    pub reason: String,
}

/// What happened to each discovered file in one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    pub discovered: usize,
    pub written: Vec<PathBuf>,
    pub failed: Vec<FileFailure>,
}

impl DirectoryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.written.len() == self.discovered
    }
}

struct FileOutcome {
    output_path: PathBuf,
    decode_ms: f64,
    transcribe_ms: f64,
    write_ms: f64,
}

/// Transcribes every audio file in a directory into `transcriptions/<stem>.txt`.
///
/// Files run on a bounded pool; each file task runs its own bounded chunk
/// pool through [`TranscribeAudioUseCase`]. A file that fails to decode or
/// write is logged and skipped without affecting the others.
pub struct TranscribeDirectoryUseCase {
    scanner: AudioFileScanner,
    reader: Arc<dyn AudioReader>,
    writer: Box<dyn TranscriptWriter>,
    settings: TranscriptionSettings,
}

impl TranscribeDirectoryUseCase {
    pub fn new(
        reader: Arc<dyn AudioReader>,
        writer: Box<dyn TranscriptWriter>,
        settings: TranscriptionSettings,
    ) -> Self {
        Self {
            scanner: AudioFileScanner::new(),
            reader,
            writer,
            settings,
        }
    }

    pub fn settings(&self) -> &TranscriptionSettings {
        &self.settings
    }

    /// Run the batch over `directory`.
    ///
    /// `load_recognizer` is called at most once, and only if there is at
    /// least one audio file. Errors from it, from listing `directory` or from
    /// creating the output directory abort the run before any file starts.
    pub fn execute<L>(
        &self,
        directory: &Path,
        load_recognizer: L,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DirectoryReport, TranscriptionError>
    where
        L: FnOnce() -> Result<Arc<dyn SpeechRecognizer>, SendError>,
    {
        let jobs = self
            .scanner
            .scan(directory)
            .map_err(|source| TranscriptionError::InputDir {
                path: directory.to_path_buf(),
                source,
            })?;

        let mut report = DirectoryReport {
            discovered: jobs.len(),
            ..DirectoryReport::default()
        };
        if jobs.is_empty() {
            log::warn!("No audio files found in '{}'.", directory.display());
            return Ok(report);
        }
        logger.info(&format!(
            "Found {} audio file(s). Starting transcription...",
            jobs.len()
        ));

        let recognizer =
            load_recognizer().map_err(|e| TranscriptionError::RecognizerLoad(e.to_string()))?;

        let output_dir = directory.join(TRANSCRIPTIONS_DIR_NAME);
        fs::create_dir_all(&output_dir).map_err(|source| TranscriptionError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

        let chunk_use_case = TranscribeAudioUseCase::new(
            self.reader.clone(),
            recognizer,
            self.settings.chunk.clone(),
        );
        let total = jobs.len();
        let (jobs, collisions) = split_output_collisions(jobs);
        for failure in collisions {
            log::error!("Skipping '{}': {}", failure.file_name, failure.reason);
            report.failed.push(failure);
        }
        let mut completed = report.failed.len();

        let pool = ThreadedWorkerPool::new(self.settings.file_workers);
        let names: Vec<String> = jobs.iter().map(|j| j.file_name().to_string()).collect();

        pool.run(
            jobs,
            |job| self.process_file(&chunk_use_case, &output_dir, &job),
            |index, result| {
                completed += 1;
                let file_name = &names[index];
                let outcome = result
                    .map_err(|panic| panic.to_string())
                    .and_then(|r| r.map_err(|e| e.to_string()));
                match outcome {
                    Ok(outcome) => {
                        logger.timing("decode", outcome.decode_ms);
                        logger.timing("transcribe", outcome.transcribe_ms);
                        logger.timing("write", outcome.write_ms);
                        log::info!("Transcription saved to '{}'.", outcome.output_path.display());
                        report.written.push(outcome.output_path);
                    }
                    Err(reason) => {
                        log::error!("Failed to transcribe '{file_name}': {reason}");
                        report.failed.push(FileFailure {
                            file_name: file_name.clone(),
                            reason,
                        });
                    }
                }
                logger.progress(completed, total);
            },
        );

        logger.info(&format!(
            "Finished: {} written, {} failed.",
            report.written.len(),
            report.failed.len()
        ));
        Ok(report)
    }

    fn process_file(
        &self,
        chunk_use_case: &TranscribeAudioUseCase,
        output_dir: &Path,
        job: &FileJob,
    ) -> Result<FileOutcome, TranscriptionError> {
        let started = Instant::now();
        let buffer = chunk_use_case.load_audio(job.path())?;
        let decoded = Instant::now();

        let text = chunk_use_case
            .transcribe_buffer(job.file_name(), buffer)
            .text();
        let transcribed = Instant::now();

        let output_path = job.transcript_path(output_dir);
        self.writer
            .write(&output_path, &text)
            .map_err(|e| TranscriptionError::Write {
                path: output_path.clone(),
                message: e.to_string(),
            })?;

        Ok(FileOutcome {
            output_path,
            decode_ms: millis(decoded - started),
            transcribe_ms: millis(transcribed - decoded),
            write_ms: millis(transcribed.elapsed()),
        })
    }
}

/// Keep the first job (by name) for each transcript name; the rest would
/// overwrite its output and are reported as failures instead.
///
/// Names are compared case-insensitively since `A.wav` and `a.mp3` land on
/// the same file on case-insensitive file systems.
fn split_output_collisions(jobs: Vec<FileJob>) -> (Vec<FileJob>, Vec<FileFailure>) {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut kept = Vec::with_capacity(jobs.len());
    let mut collisions = Vec::new();
    for job in jobs {
        let output = job.transcript_file_name();
        match owners.entry(output.to_lowercase()) {
            Entry::Occupied(owner) => collisions.push(FileFailure {
                file_name: job.file_name().to_string(),
                reason: format!("output name collides with '{}' ({output})", owner.get()),
            }),
            Entry::Vacant(slot) => {
                slot.insert(job.file_name().to_string());
                kept.push(job);
            }
        }
    }
    (kept, collisions)
}

fn millis(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
