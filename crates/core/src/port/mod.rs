// Port Layer - Interfaces for external dependencies

pub mod converter;
pub mod filesystem;
pub mod id_provider; // For deterministic testing
pub mod time_provider;

// Re-exports
pub use converter::PdfConverter;
pub use filesystem::{EntryMeta, JobFilesystem};
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
