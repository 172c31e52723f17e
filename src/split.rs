// SPLIT CALCULATOR (C3)
// CLOSED-FORM OPTIMAL SPLIT RATIO FROM ORACLE OUTPUT AND CONGESTION
// SIGNALS. A FREE FUNCTION OVER AN INJECTED ORACLE -- NO STATE OF ITS
// OWN, SO IT IS UNIT-TESTABLE WITHOUT STANDING UP A SPLITTER.

use crate::oracle::BandwidthOracle;

/// Computes the optimal cache-share ratio in `[0, scale]` from the
/// oracle's cache-only/backend-only endpoints, derating the backend
/// estimate by the bandwidth-drop term only when latency is
/// simultaneously elevated (the congestion-aware derating of §4.3).
///
/// `scale` and `lat_congest_threshold` are passed in rather than read
/// from `crate::config`'s compiled-in defaults so a host-overridden
/// `SplitterConfig` (different `scale`, different hysteresis
/// thresholds) is honored consistently with `ModeThresholds` and
/// `Dispatcher`, which already take these from the config.
///
/// Returns `None` when the oracle's cache-only endpoint is `0` (§7:
/// "treat a zero as 'keep current ratio'") -- there is no information
/// to compute a split from, so the caller must leave the previously
/// published ratio untouched rather than publish a spurious `0`.
pub fn optimal_split(
    oracle: &dyn BandwidthOracle,
    io_depth: u64,
    numjobs: u64,
    bw_drop_permil: u64,
    lat_increase_permil: u64,
    scale: u64,
    lat_congest_threshold: u64,
) -> Option<u64> {
    let a = oracle.bw(io_depth, numjobs, 100);
    if a == 0 {
        return None;
    }
    let mut b = oracle.bw(io_depth, numjobs, 0);

    if lat_increase_permil > lat_congest_threshold {
        b = b.saturating_mul(1000u64.saturating_sub(bw_drop_permil)) / 1000;
    }

    let ratio = a.saturating_mul(scale) / (a + b);
    Some(ratio.min(scale))
}
