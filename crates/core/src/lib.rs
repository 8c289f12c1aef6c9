pub mod audio;
pub mod files;
pub mod pipeline;
pub mod shared;
