// Relay constants (no magic values)
use std::time::Duration;

/// Sleep duration when no entries are due (250ms)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_millis(250);

/// Sleep duration after a store error before retry (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Entries fetched per relay pass
pub const DEFAULT_BATCH_SIZE: i64 = 32;

/// Base delay before the first redelivery (1s)
pub const DEFAULT_RETRY_BASE_DELAY_MS: i64 = 1000;

/// Upper bound for the backoff delay (5 minutes)
pub const MAX_RETRY_DELAY_MS: i64 = 5 * 60 * 1000;
