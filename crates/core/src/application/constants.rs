// Service constants (No magic values)
use std::time::Duration;

/// Hard wall-clock limit for one converter run (5 minutes)
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(300);

/// Age after which the sweeper deletes an orphaned job directory (1 hour)
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

/// Pause between two sweeper scans (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);
