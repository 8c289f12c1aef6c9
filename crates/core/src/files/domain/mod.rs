pub mod file_job;
pub mod transcript_writer;
