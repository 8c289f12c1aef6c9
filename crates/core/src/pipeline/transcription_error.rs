use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::infrastructure::threaded_worker_pool::TaskPanic;

/// Why a single chunk produced no text. Always absorbed into an empty segment.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("recognizer failed: {0}")]
    Recognizer(String),
    #[error("recognizer did not finish within {0:?}")]
    TimedOut(Duration),
    #[error(transparent)]
    Panicked(#[from] TaskPanic),
}

/// File- and run-level failures of the transcription pipeline.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("no audio stream in {0}")]
    NoAudioStream(PathBuf),
    #[error("failed to write transcript {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("cannot read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load speech recognizer: {0}")]
    RecognizerLoad(String),
}
