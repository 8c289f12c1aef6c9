/// Sample rate Whisper models are trained on; all decoding targets it.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";
pub const DEFAULT_WHISPER_MODEL: &str = "medium";
pub const WHISPER_MODEL_SIZES: &[&str] = &[
    "tiny", "tiny.en", "base", "base.en", "small", "small.en", "medium", "medium.en", "large-v3",
];

pub const DEFAULT_LANGUAGE: &str = "portuguese";

pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aac", "wma"];

/// Name of the subdirectory, under the input directory, that receives `.txt` output.
pub const TRANSCRIPTIONS_DIR_NAME: &str = "transcriptions";
pub const TRANSCRIPT_EXTENSION: &str = "txt";

pub const DEFAULT_CHUNK_LENGTH_SECS: f64 = 30.0;
pub const DEFAULT_CHUNK_WORKERS: usize = 4;
pub const DEFAULT_FILE_WORKERS: usize = 8;

/// File name of the GGML weights for a Whisper model size, e.g. `ggml-medium.bin`.
pub fn whisper_model_file_name(size: &str) -> String {
    format!("ggml-{size}.bin")
}

pub fn whisper_model_url(size: &str) -> String {
    format!(
        "{WHISPER_MODEL_BASE_URL}/{}",
        whisper_model_file_name(size)
    )
}
