// MODE CONTROLLER (C4)
// FOUR-STATE AUTOMATON DRIVING POLICY SELECTION, PLUS THE TWO FLAGS
// THAT GATE SPLIT-RATIO RECOMPUTATION WITHIN A MODE.
//
// MODELED AS A TAGGED VARIANT WITH THE TRANSITION TABLE ENCODED AS A
// PURE FUNCTION OVER SIGNALS, MIRRORING THE TEACHER'S
// tuning::{Regime, detect_regime} SPLIT BETWEEN DATA AND TRANSITIONS.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Warmup,
    Stable,
    Congestion,
    Failure,
}

impl Mode {
    pub fn as_u8(self) -> u8 {
        match self {
            Mode::Idle => 0,
            Mode::Warmup => 1,
            Mode::Stable => 2,
            Mode::Congestion => 3,
            Mode::Failure => 4,
        }
    }
}

/// Signals one telemetry tick feeds into the transition table (§4.4).
#[derive(Clone, Copy, Debug)]
pub struct TickSignals {
    pub tp: u64,
    pub lat_inc: u64,
    pub iops: u64,
    pub win_full: bool,
    pub caching_failed: bool,
}

/// Per-thresholds the transition table is parameterised over, so tests
/// and hosts can tune hysteresis without touching this module.
#[derive(Clone, Copy, Debug)]
pub struct ModeThresholds {
    pub rdma_threshold: u64,
    pub iops_threshold: u64,
    pub lat_congest_threshold: u64,
    pub lat_recovery_threshold: u64,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            rdma_threshold: crate::config::RDMA_THRESHOLD,
            iops_threshold: crate::config::IOPS_THRESHOLD,
            lat_congest_threshold: crate::config::LAT_CONGEST_THRESHOLD,
            lat_recovery_threshold: crate::config::LAT_RECOVERY_THRESHOLD,
        }
    }
}

/// Pure transition function: the current mode plus this tick's signals
/// determine the next mode. `caching_failed` is an unconditional latch
/// (spec redesign flag, §9) checked ahead of every other rule.
pub fn next_mode(current: Mode, signals: TickSignals, thresholds: &ModeThresholds) -> Mode {
    if current != Mode::Idle && signals.caching_failed {
        return Mode::Failure;
    }

    if signals.tp <= thresholds.rdma_threshold && signals.iops <= thresholds.iops_threshold {
        return Mode::Idle;
    }

    match current {
        Mode::Idle => Mode::Warmup,
        Mode::Warmup => {
            if signals.win_full {
                Mode::Stable
            } else {
                Mode::Warmup
            }
        }
        Mode::Stable => {
            if signals.lat_inc > thresholds.lat_congest_threshold {
                Mode::Congestion
            } else {
                Mode::Stable
            }
        }
        Mode::Congestion => {
            if signals.lat_inc < thresholds.lat_recovery_threshold {
                Mode::Stable
            } else {
                Mode::Congestion
            }
        }
        Mode::Failure => Mode::Failure,
    }
}
