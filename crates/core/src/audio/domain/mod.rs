pub mod audio_buffer;
pub mod audio_chunk;
pub mod audio_reader;
pub mod call_gate;
pub mod speech_recognizer;
pub mod transcript;
