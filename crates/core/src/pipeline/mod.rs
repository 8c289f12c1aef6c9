pub mod concurrency_budget;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod transcribe_audio_use_case;
pub mod transcribe_directory_use_case;
pub mod transcription_error;
