// Engine constants (No magic values)

/// Estimated waits strictly below this display as "almost ready" (minutes)
/// 20 reproduces the badges of the reference queues (15/30/10 minute services)
pub const DEFAULT_ALMOST_READY_THRESHOLD_MINUTES: u32 = 20;

/// Longest accepted display name for a queue entry (characters)
pub const DEFAULT_MAX_DISPLAY_NAME_LEN: usize = 100;


/// Departure records kept by the desk before the oldest are dropped
pub const DEFAULT_MAX_HISTORY_RECORDS: usize = 1_000;
