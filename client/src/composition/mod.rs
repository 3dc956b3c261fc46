pub mod gallery_runtime;
pub mod recorder_runtime;
