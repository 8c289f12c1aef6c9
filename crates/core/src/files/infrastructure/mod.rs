pub mod audio_file_scanner;
pub mod text_file_writer;
