/*!
 * System Limits and Constants
 *
 * Centralized location for the memory space defaults and thresholds.
 */

// =============================================================================
// MEMORY LIMITS
// =============================================================================

/// Default size of the simulated address space (in words)
pub const DEFAULT_MEMORY_SPACE: usize = 1024;

/// Usage ratio at which allocations log a high-pressure warning
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

/// Usage ratio at which allocations log a critical-pressure warning
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.95;

/// Usage ratio below which pressure is reported as low
pub const MEDIUM_PRESSURE_THRESHOLD: f64 = 0.60;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the size of the address space
pub const ENV_MAX_SIZE: &str = "MEMSPACE_MAX_SIZE";

/// Overrides the high-pressure threshold (0.0 - 1.0)
pub const ENV_WARNING_THRESHOLD: &str = "MEMSPACE_WARNING_THRESHOLD";

/// Overrides the critical-pressure threshold (0.0 - 1.0)
pub const ENV_CRITICAL_THRESHOLD: &str = "MEMSPACE_CRITICAL_THRESHOLD";

/// Switches the log output to JSON when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "MEMSPACE_TRACE_JSON";
