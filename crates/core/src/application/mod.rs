// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod conversion;
pub mod job_directory;
pub mod shutdown;
pub mod sweeper;

// Re-exports
pub use conversion::{ConversionService, ConvertedDocument, SanitizeMode};
pub use job_directory::{JobDirectoryManager, JobLease};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use sweeper::{RetentionSweeper, SweepReport, SweeperConfig};
