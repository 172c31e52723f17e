// SPLITTER FACADE
// WIRES C1 (TELEMETRY), C2 (ORACLE, INJECTED), C3 (SPLIT CALCULATOR),
// C4 (MODE CONTROLLER) AND C5 (DISPATCHER) BEHIND THE THIN PROCEDURAL
// SURFACE §6 DESCRIBES: init/reset/should_send_to_backend/set_debug.
//
// CONCURRENCY (§5): THE RATIO IS A READ-MOSTLY ATOMIC CELL. TELEMETRY
// AND MODE STATE ARE GUARDED BY A MUTEX TAKEN NON-BLOCKINGLY AT THE TOP
// OF THE RATE-LIMITED TICK -- A CONTENDED TICK IS SKIPPED RATHER THAN
// AWAITED, SO DISPATCH NEVER BLOCKS ON IT. DISPATCH COUNTERS ARE
// LOGICALLY PER-SUBMISSION-QUEUE; THIS FACADE SERIALISES THEM BEHIND
// ONE MUTEX, WHICH IS THE SINGLE-DISPATCH-CONTEXT CASE THE SPEC CALLS
// OUT AS SUFFICIENT (§5). A HOST SHARDING ACROSS QUEUES SHOULD HOLD
// ONE Dispatcher PER QUEUE INSTEAD.

use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::config::SplitterConfig;
use crate::dispatch::Dispatcher;
use crate::engine::{CacheEngine, Request};
use crate::mode::{next_mode, Mode, ModeThresholds, TickSignals};
use crate::oracle::BandwidthOracle;
use crate::split::optimal_split;
use crate::telemetry::{LatencyWindow, ThroughputWindow};

struct TelemetryModeState {
    throughput: ThroughputWindow,
    latency: LatencyWindow,
    mode: Mode,
    initialized: bool,
    stable_ratio_computed: bool,
    last_tick_ms: u64,
    last_log_ms: u64,
    ticked_once: bool,
}

impl TelemetryModeState {
    fn new(cfg: &SplitterConfig) -> Self {
        Self {
            throughput: ThroughputWindow::new(),
            latency: LatencyWindow::new(cfg.latency_stabilization_samples),
            mode: Mode::Idle,
            initialized: false,
            stable_ratio_computed: false,
            last_tick_ms: 0,
            last_log_ms: 0,
            ticked_once: false,
        }
    }
}

/// A single observability record, emitted at most once per
/// `log_interval_ms` (§6).
#[derive(Clone, Copy, Debug)]
pub struct ObservabilityRecord {
    pub tp_avg: u64,
    pub lat_avg: u64,
    pub lat_baseline: u64,
    pub iops: u64,
    pub bw_drop_permil: u64,
    pub lat_increase_permil: u64,
    pub mode: u8,
    pub ratio: u64,
}

pub struct Splitter {
    config: SplitterConfig,
    thresholds: ModeThresholds,
    clock: Arc<dyn Clock>,
    oracle: Arc<dyn BandwidthOracle>,

    ratio: AtomicU64,
    debug_level: AtomicI32,

    state: Mutex<TelemetryModeState>,
    dispatcher: Mutex<Dispatcher>,
}

impl Splitter {
    /// `init()` — must be called once before any dispatch (§6).
    pub fn init(
        config: SplitterConfig,
        oracle: Arc<dyn BandwidthOracle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let thresholds = ModeThresholds {
            rdma_threshold: config.rdma_threshold,
            iops_threshold: config.iops_threshold,
            lat_congest_threshold: config.lat_congest_threshold,
            lat_recovery_threshold: config.lat_recovery_threshold,
        };
        let dispatcher = Dispatcher::new(config.window_size, config.pattern_max, config.scale);
        Self {
            state: Mutex::new(TelemetryModeState::new(&config)),
            dispatcher: Mutex::new(dispatcher),
            ratio: AtomicU64::new(config.scale),
            debug_level: AtomicI32::new(0),
            thresholds,
            config,
            oracle,
            clock,
        }
    }

    /// Idempotent full reset: counters, quotas, pattern, windows, and
    /// mode all return to their initial values; ratio returns to
    /// `SCALE`; mode returns to `Idle`.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = TelemetryModeState::new(&self.config);
        self.dispatcher.lock().unwrap().reset();
        self.ratio.store(self.config.scale, Ordering::Release);
    }

    /// Toggles verbose logging. `level >= 1` enables per-tick debug
    /// events in addition to the once-per-second observability record.
    pub fn set_debug(&self, level: i32) {
        self.debug_level.store(level, Ordering::Relaxed);
    }

    pub fn ratio(&self) -> u64 {
        self.ratio.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> Mode {
        match self.state.try_lock() {
            Ok(guard) => guard.mode,
            Err(_) => Mode::Idle,
        }
    }

    /// The hot path: one dispatch decision for `req`. Drives the
    /// rate-limited tick, then dispatches against the published ratio.
    pub fn should_send_to_backend<R, E>(&self, req: &R, engine: &E) -> bool
    where
        R: Request,
        E: CacheEngine<R>,
    {
        self.maybe_tick(engine);

        let is_miss = engine.is_miss(req);
        let ratio = self.ratio();
        self.dispatcher.lock().unwrap().dispatch(ratio, is_miss)
    }

    fn maybe_tick<R: Request, E: CacheEngine<R>>(&self, engine: &E) {
        let mut guard = match self.state.try_lock() {
            Ok(g) => g,
            Err(_) => return, // TICK OWNED ELSEWHERE: DISPATCH USES THE LAST PUBLISHED RATIO
        };

        let now = self.clock.now_ms();
        if guard.ticked_once && now.saturating_sub(guard.last_tick_ms) < self.config.monitor_interval_ms {
            return;
        }

        let sample = engine.measure_performance(self.config.monitor_interval_ms);
        guard.throughput.observe(sample.rdma_throughput);
        guard.latency.observe(sample.rdma_latency);

        let tp = guard.throughput.average();
        let bw_drop = guard.throughput.drop_permil();
        let lat_inc = guard.latency.increase_permil();
        let win_full = guard.throughput.is_full();

        let signals = TickSignals {
            tp,
            lat_inc,
            iops: sample.iops,
            win_full,
            caching_failed: engine.caching_failed(),
        };

        let current = guard.mode;
        let new_mode = next_mode(current, signals, &self.thresholds);

        // TRANSITION SIDE-EFFECTS (§4.4 TABLE, EXACTLY AS SPECIFIED)
        match (current, new_mode) {
            (Mode::Idle, Mode::Warmup) => guard.initialized = false,
            (Mode::Warmup, Mode::Stable) => guard.stable_ratio_computed = false,
            (Mode::Stable, Mode::Congestion) => guard.stable_ratio_computed = true,
            (Mode::Congestion, Mode::Stable) => guard.stable_ratio_computed = false,
            _ => {}
        }
        guard.mode = new_mode;

        // PER-MODE POLICY
        match new_mode {
            Mode::Idle => {
                if !guard.initialized {
                    self.ratio.store(self.config.scale, Ordering::Release);
                    guard.initialized = true;
                }
            }
            Mode::Warmup => {
                // §7: A ZERO CACHE-ONLY ENDPOINT MEANS "NO INFORMATION" --
                // LEAVE THE PUBLISHED RATIO UNTOUCHED RATHER THAN STORE None's 0.
                if let Some(candidate) = optimal_split(
                    self.oracle.as_ref(),
                    self.config.io_depth,
                    self.config.numjobs,
                    0,
                    0,
                    self.config.scale,
                    self.config.lat_congest_threshold,
                ) {
                    if candidate != self.ratio() {
                        self.ratio.store(candidate, Ordering::Release);
                    }
                }
            }
            Mode::Stable => {
                if win_full && !guard.stable_ratio_computed {
                    // ONLY LATCH stable_ratio_computed WHEN A RATIO WAS
                    // ACTUALLY PUBLISHED -- A None (NO-INFORMATION) RESULT
                    // MUST RETRY ON A LATER TICK, NOT BE SKIPPED FOR THE
                    // REST OF THIS Stable EPISODE.
                    if let Some(candidate) = optimal_split(
                        self.oracle.as_ref(),
                        self.config.io_depth,
                        self.config.numjobs,
                        bw_drop,
                        lat_inc,
                        self.config.scale,
                        self.config.lat_congest_threshold,
                    ) {
                        self.ratio.store(candidate, Ordering::Release);
                        guard.stable_ratio_computed = true;
                    }
                }
            }
            Mode::Congestion => {
                if win_full {
                    if let Some(candidate) = optimal_split(
                        self.oracle.as_ref(),
                        self.config.io_depth,
                        self.config.numjobs,
                        bw_drop,
                        lat_inc,
                        self.config.scale,
                        self.config.lat_congest_threshold,
                    ) {
                        if candidate != self.ratio() {
                            self.ratio.store(candidate, Ordering::Release);
                        }
                    }
                }
            }
            Mode::Failure => {}
        }

        guard.last_tick_ms = now;
        guard.ticked_once = true;

        let should_log = now.saturating_sub(guard.last_log_ms) >= self.config.log_interval_ms
            || guard.last_log_ms == 0;
        if should_log {
            guard.last_log_ms = now;
            let record = ObservabilityRecord {
                tp_avg: tp,
                lat_avg: guard.latency.average(),
                lat_baseline: guard.latency.baseline(),
                iops: sample.iops,
                bw_drop_permil: bw_drop,
                lat_increase_permil: lat_inc,
                mode: new_mode.as_u8(),
                ratio: self.ratio(),
            };
            emit_observability_record(&record);
        }
        if current != new_mode && self.debug_level.load(Ordering::Relaxed) > 0 {
            tracing::debug!(
                from = current.as_u8(),
                to = new_mode.as_u8(),
                "splitter mode transition"
            );
        }
    }
}

fn emit_observability_record(r: &ObservabilityRecord) {
    tracing::info!(
        tp_avg = r.tp_avg,
        lat_avg = r.lat_avg,
        lat_baseline = r.lat_baseline,
        iops = r.iops,
        bw_drop_permil = r.bw_drop_permil,
        lat_increase_permil = r.lat_increase_permil,
        mode = r.mode,
        ratio_pct = r.ratio / 100,
        ratio_frac = r.ratio % 100,
        "splitter tick"
    );
}
