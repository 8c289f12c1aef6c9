pub mod ffmpeg_audio_reader;
pub mod serialized_recognizer;
pub mod whisper_recognizer;
