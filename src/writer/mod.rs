//! File writing and rotation engine

pub mod file_writer;
pub mod rotation;
pub mod size_cache;

pub use file_writer::FileWriter;
pub use size_cache::SizeCache;
