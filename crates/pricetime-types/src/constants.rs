//! System-wide constants for the pricetime order book.

/// Depth levels returned per side when the caller does not ask for a count.
pub const DEFAULT_DEPTH_LEVELS: usize = 5;

/// Arena slots preallocated for resting orders.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Bounded command queue size for a book actor.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4096;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "pricetime";
