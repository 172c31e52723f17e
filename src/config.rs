// SPLITTER CONFIGURATION
// ALL FIXED-POINT, NO FLOATING POINT. DEFAULTS MATCH THE netCAS REFERENCE.

/// Dispatch window size: the realised split converges over this many
/// non-miss requests.
pub const W: u32 = 100;

/// Max repeating dispatch pattern length within a window.
pub const P_MAX: u32 = 10;

/// Fixed-point scale for the split ratio: SCALE == 100% to cache.
pub const SCALE: u64 = 10_000;

/// Default telemetry ring capacity (RDMA_WINDOW_SIZE in the original).
pub const RDMA_WINDOW_SIZE: usize = 16;

/// Samples required before a latency baseline may be established.
pub const LATENCY_STABILIZATION_SAMPLES: u64 = 40;

/// Minimum gap between rate-limited telemetry/mode ticks.
pub const MONITOR_INTERVAL_MS: u64 = 100;

/// Minimum gap between observability records.
pub const LOG_INTERVAL_MS: u64 = 1_000;

/// Per-mille thresholds driving the mode controller (§4.4).
pub const RDMA_THRESHOLD: u64 = 100;
pub const IOPS_THRESHOLD: u64 = 1_000;
pub const LAT_CONGEST_THRESHOLD: u64 = 700;
pub const LAT_RECOVERY_THRESHOLD: u64 = 500;

/// Test-app parameters forwarded to the bandwidth oracle. A host wiring
/// up its own oracle is free to ignore these and pass its own
/// `io_depth`/`numjobs` through `Splitter::tick`.
pub const DEFAULT_IO_DEPTH: u64 = 16;
pub const DEFAULT_NUM_JOBS: u64 = 1;

/// Bundles the subset of constants above that a host may legitimately
/// want to override per splitter instance, mirroring how the teacher's
/// `TuningKnobs` bundles per-regime parameters instead of exposing a
/// long constructor argument list.
#[derive(Clone, Copy, Debug)]
pub struct SplitterConfig {
    pub window_size: u32,
    pub pattern_max: u32,
    pub scale: u64,
    pub latency_stabilization_samples: u64,
    pub monitor_interval_ms: u64,
    pub log_interval_ms: u64,
    pub rdma_threshold: u64,
    pub iops_threshold: u64,
    pub lat_congest_threshold: u64,
    pub lat_recovery_threshold: u64,
    pub io_depth: u64,
    pub numjobs: u64,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            window_size: W,
            pattern_max: P_MAX,
            scale: SCALE,
            latency_stabilization_samples: LATENCY_STABILIZATION_SAMPLES,
            monitor_interval_ms: MONITOR_INTERVAL_MS,
            log_interval_ms: LOG_INTERVAL_MS,
            rdma_threshold: RDMA_THRESHOLD,
            iops_threshold: IOPS_THRESHOLD,
            lat_congest_threshold: LAT_CONGEST_THRESHOLD,
            lat_recovery_threshold: LAT_RECOVERY_THRESHOLD,
            io_depth: DEFAULT_IO_DEPTH,
            numjobs: DEFAULT_NUM_JOBS,
        }
    }
}

impl SplitterConfig {
    /// Sanity-checks threshold ordering and window bounds. Used by the
    /// `splitterctl check` subcommand; never called on the hot path.
    pub fn validate(&self) -> Result<(), String> {
        if self.lat_recovery_threshold >= self.lat_congest_threshold {
            return Err(format!(
                "lat_recovery_threshold ({}) must be < lat_congest_threshold ({}) for hysteresis",
                self.lat_recovery_threshold, self.lat_congest_threshold
            ));
        }
        if self.pattern_max == 0 || self.pattern_max > self.window_size {
            return Err(format!(
                "pattern_max ({}) must be in 1..=window_size ({})",
                self.pattern_max, self.window_size
            ));
        }
        if self.scale == 0 {
            return Err("scale must be non-zero".to_string());
        }
        Ok(())
    }
}
