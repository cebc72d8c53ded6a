pub mod core;
pub mod selection;

// Re-export the main types for convenience
pub use core::{Word, WordCatalog, WordEntry, WordList};
pub use selection::{LengthSampler, RandomSampler, WordSampler};
