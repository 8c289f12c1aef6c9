use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use batchscribe_core::audio::domain::speech_recognizer::SpeechRecognizer;
use batchscribe_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use batchscribe_core::audio::infrastructure::serialized_recognizer::SerializedRecognizer;
use batchscribe_core::audio::infrastructure::whisper_recognizer::{
    is_supported_language, WhisperRecognizer,
};
use batchscribe_core::files::infrastructure::text_file_writer::TextFileWriter;
use batchscribe_core::pipeline::concurrency_budget::ConcurrencyBudget;
use batchscribe_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use batchscribe_core::pipeline::transcribe_audio_use_case::ChunkSettings;
use batchscribe_core::pipeline::transcribe_directory_use_case::{
    TranscribeDirectoryUseCase, TranscriptionSettings,
};
use batchscribe_core::shared::constants::{
    whisper_model_file_name, whisper_model_url, DEFAULT_CHUNK_LENGTH_SECS,
    DEFAULT_CHUNK_WORKERS, DEFAULT_FILE_WORKERS, DEFAULT_LANGUAGE, DEFAULT_WHISPER_MODEL,
    WHISPER_MODEL_SIZES,
};
use batchscribe_core::shared::model_resolver;
use batchscribe_core::shared::SendError;

/// Transcribe every audio file in a directory with Whisper.
#[derive(Parser, Debug)]
#[command(name = "batchscribe")]
struct Cli {
    /// Directory containing the audio files.
    #[arg(short = 'i', long = "input_dir", default_value = "./audios")]
    input_dir: PathBuf,

    /// Spoken language of the audio.
    #[arg(short = 'l', long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Enable debug logging.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Files transcribed in parallel.
    #[arg(short = 'w', long, default_value_t = DEFAULT_FILE_WORKERS)]
    workers: usize,

    /// Chunks of one file transcribed in parallel.
    #[arg(long, default_value_t = DEFAULT_CHUNK_WORKERS)]
    chunk_workers: usize,

    /// Chunk length in seconds.
    #[arg(long, default_value_t = DEFAULT_CHUNK_LENGTH_SECS)]
    chunk_length: f64,

    /// Give up on a chunk after this many seconds (its text is left empty).
    #[arg(long)]
    chunk_timeout: Option<f64>,

    /// Whisper model size, downloaded on first use.
    #[arg(long, default_value = DEFAULT_WHISPER_MODEL)]
    model: String,

    /// Use this GGML model file instead of resolving --model.
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Run one recognizer call at a time regardless of pool sizes.
    #[arg(long)]
    serialize_inference: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli)?;

    let budget = ConcurrencyBudget::for_host(cli.workers, cli.chunk_workers);
    budget.log();

    let settings = TranscriptionSettings {
        file_workers: cli.workers,
        chunk: ChunkSettings {
            chunk_length_secs: cli.chunk_length,
            max_workers: cli.chunk_workers,
            timeout: cli.chunk_timeout.map(Duration::from_secs_f64),
        },
    };
    let use_case = TranscribeDirectoryUseCase::new(
        Arc::new(FfmpegAudioReader::new()),
        Box::new(TextFileWriter::new()),
        settings,
    );

    let threads = budget.threads_per_call();
    let mut logger = StdoutPipelineLogger::new();
    let report = use_case.execute(
        &cli.input_dir,
        || build_recognizer(&cli, threads),
        &mut logger,
    )?;
    logger.summary();

    if !report.failed.is_empty() {
        log::warn!(
            "{} of {} file(s) could not be transcribed.",
            report.failed.len(),
            report.discovered
        );
    }
    Ok(())
}

fn build_recognizer(cli: &Cli, n_threads: usize) -> Result<Arc<dyn SpeechRecognizer>, SendError> {
    let model_path = match &cli.model_path {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving Whisper model: {}", cli.model);
            let path = model_resolver::resolve(
                &whisper_model_file_name(&cli.model),
                &whisper_model_url(&cli.model),
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };

    log::info!("Loading Whisper model from {}", model_path.display());
    let whisper = WhisperRecognizer::new(&model_path, &cli.language, n_threads)?;
    if cli.serialize_inference {
        log::info!("Recognizer calls are serialized.");
        Ok(Arc::new(SerializedRecognizer::new(Box::new(whisper))))
    } else {
        Ok(Arc::new(whisper))
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input_dir.is_dir() {
        return Err(format!(
            "Directory '{}' does not exist.",
            cli.input_dir.display()
        )
        .into());
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if cli.chunk_workers == 0 {
        return Err("Chunk workers must be at least 1".into());
    }
    if !cli.chunk_length.is_finite() || cli.chunk_length <= 0.0 {
        return Err(format!(
            "Chunk length must be a positive number of seconds, got {}",
            cli.chunk_length
        )
        .into());
    }
    if let Some(timeout) = cli.chunk_timeout {
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(format!(
                "Chunk timeout must be a positive number of seconds, got {timeout}"
            )
            .into());
        }
    }
    if !is_supported_language(&cli.language) {
        return Err(format!("Unsupported language '{}'", cli.language).into());
    }
    if cli.model_path.is_none() && !WHISPER_MODEL_SIZES.contains(&cli.model.as_str()) {
        return Err(format!(
            "Model must be one of: {}, got '{}'",
            WHISPER_MODEL_SIZES.join(", "),
            cli.model
        )
        .into());
    }
    if let Some(path) = &cli.model_path {
        if !path.is_file() {
            return Err(format!("Model file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading Whisper model... {pct}%");
    } else {
        eprint!("\rDownloading Whisper model... {downloaded} bytes");
    }
}
