// SPLITTER INTEGRATION TESTS
// END-TO-END SCENARIOS AGAINST THE PUBLIC Splitter API, PURE RUST,
// ZERO EXTERNAL DEPENDENCIES. RUN OFFLINE.

use std::sync::Arc;

use netcas_splitter::{
    BandwidthOracle, CacheEngine, ConstantOracle, FakeClock, Mode, PerformanceSample, Request,
    Splitter, SplitterConfig,
};

struct BlockRequest;
impl Request for BlockRequest {}

struct StaticEngine {
    tp: u64,
    lat: u64,
    iops: u64,
}

impl StaticEngine {
    fn new(tp: u64, lat: u64, iops: u64) -> Self {
        Self { tp, lat, iops }
    }
}

impl CacheEngine<BlockRequest> for StaticEngine {
    fn is_miss(&self, _req: &BlockRequest) -> bool {
        false
    }

    fn measure_performance(&self, _elapsed_ms: u64) -> PerformanceSample {
        PerformanceSample {
            rdma_throughput: self.tp,
            rdma_latency: self.lat,
            iops: self.iops,
        }
    }
}

fn fast_cache_oracle() -> Arc<dyn BandwidthOracle> {
    Arc::new(ConstantOracle {
        cache_only: 900_000,
        backend_only: 300_000,
    })
}

#[test]
fn cold_start_with_no_traffic_stays_idle_at_full_cache_ratio() {
    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let engine = StaticEngine::new(0, 0, 0);
    let req = BlockRequest;

    for _ in 0..10 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &engine);
    }

    assert_eq!(splitter.mode(), Mode::Idle);
    assert_eq!(splitter.ratio(), SplitterConfig::default().scale);
}

#[test]
fn traffic_arrival_drives_warmup_then_stable_at_closed_form_ratio() {
    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let engine = StaticEngine::new(1_000, 100, 2_000);
    let req = BlockRequest;

    clock.advance(150);
    splitter.should_send_to_backend(&req, &engine);
    assert_eq!(splitter.mode(), Mode::Warmup);
    // A/(A+B) * SCALE = 900000/1200000 * 10000 = 7500
    assert_eq!(splitter.ratio(), 7_500);

    for _ in 0..SplitterConfig::default().window_size {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &engine);
    }
    assert_eq!(splitter.mode(), Mode::Stable);
    assert_eq!(splitter.ratio(), 7_500);
}

#[test]
fn congestion_entry_and_hysteresis_then_recovery() {
    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let req = BlockRequest;

    let warm = StaticEngine::new(1_000, 100, 2_000);
    for _ in 0..60 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &warm);
    }
    assert_eq!(splitter.mode(), Mode::Stable);

    // FULLY REPLACE THE 16-SLOT LATENCY RING WITH A HIGH READING: AVG
    // RISES FROM THE 100-BASELINE TO 200, A 1000-PERMIL INCREASE.
    let congested = StaticEngine::new(1_000, 200, 2_000);
    for _ in 0..16 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &congested);
    }
    assert_eq!(splitter.mode(), Mode::Congestion);

    // A DEAD-ZONE READING (600 PERMIL, BETWEEN THE 500 RECOVERY AND 700
    // CONGEST THRESHOLDS) MUST NOT FLIP THE MODE BACK.
    let deadzone = StaticEngine::new(1_000, 160, 2_000);
    for _ in 0..16 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &deadzone);
    }
    assert_eq!(splitter.mode(), Mode::Congestion);

    let recovered = StaticEngine::new(1_000, 100, 2_000);
    for _ in 0..16 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &recovered);
    }
    assert_eq!(splitter.mode(), Mode::Stable);
}

#[test]
fn cache_miss_is_always_forced_to_the_backend() {
    struct MissEveryThird {
        calls: std::sync::Mutex<u64>,
    }
    impl CacheEngine<BlockRequest> for MissEveryThird {
        fn is_miss(&self, _req: &BlockRequest) -> bool {
            let mut c = self.calls.lock().unwrap();
            *c += 1;
            *c % 3 == 0
        }
        fn measure_performance(&self, _elapsed_ms: u64) -> PerformanceSample {
            PerformanceSample {
                rdma_throughput: 1_000,
                rdma_latency: 100,
                iops: 2_000,
            }
        }
    }

    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let engine = MissEveryThird {
        calls: std::sync::Mutex::new(0),
    };
    let req = BlockRequest;

    let mut forced_backend = 0;
    for i in 0..30 {
        clock.advance(150);
        let to_backend = splitter.should_send_to_backend(&req, &engine);
        if (i + 1) % 3 == 0 {
            assert!(to_backend, "miss at request {} must route to backend", i + 1);
            forced_backend += 1;
        }
    }
    assert_eq!(forced_backend, 10);
}

#[test]
fn reverting_to_idle_reinitializes_ratio_to_scale() {
    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let req = BlockRequest;

    let warm = StaticEngine::new(1_000, 100, 2_000);
    for _ in 0..30 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &warm);
    }
    assert_eq!(splitter.mode(), Mode::Stable);
    let stable_ratio = splitter.ratio();
    assert_ne!(stable_ratio, SplitterConfig::default().scale);

    // ENTERING WARMUP ALREADY RESET `initialized` TO false AND NOTHING
    // SINCE HAS SET IT BACK TO true, SO THE FIRST IDLE TICK AFTER
    // REVERSION REINITIALIZES THE RATIO TO SCALE IMMEDIATELY.
    let idle = StaticEngine::new(0, 0, 0);
    clock.advance(150);
    splitter.should_send_to_backend(&req, &idle);
    assert_eq!(splitter.mode(), Mode::Idle);
    assert_eq!(splitter.ratio(), SplitterConfig::default().scale);
}

#[test]
fn reset_returns_splitter_to_its_initial_state() {
    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let engine = StaticEngine::new(1_000, 100, 2_000);
    let req = BlockRequest;

    for _ in 0..30 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &engine);
    }
    assert_ne!(splitter.mode(), Mode::Idle);

    splitter.reset();
    assert_eq!(splitter.mode(), Mode::Idle);
    assert_eq!(splitter.ratio(), SplitterConfig::default().scale);
}

#[test]
fn dispatch_converges_to_the_stable_ratio_over_a_window() {
    let clock = Arc::new(FakeClock::new());
    let splitter = Splitter::init(SplitterConfig::default(), fast_cache_oracle(), clock.clone());
    let engine = StaticEngine::new(1_000, 100, 2_000);
    let req = BlockRequest;

    for _ in 0..60 {
        clock.advance(150);
        splitter.should_send_to_backend(&req, &engine);
    }
    assert_eq!(splitter.mode(), Mode::Stable);

    let mut to_backend = 0u64;
    let window = SplitterConfig::default().window_size as u64;
    for _ in 0..window {
        clock.advance(150);
        if splitter.should_send_to_backend(&req, &engine) {
            to_backend += 1;
        }
    }
    // RATIO IS 7500 (75% CACHE), SO ~25% SHOULD GO TO BACKEND. THE
    // MEASURED WINDOW HERE STRADDLES ONE INTERNAL PATTERN REBUILD, SO
    // THE TOLERANCE IS DOUBLE THE USUAL PER-WINDOW ROUNDING SLACK.
    let expected_backend = window - (window * 7_500) / SplitterConfig::default().scale;
    let diff = (to_backend as i64 - expected_backend as i64).abs();
    assert!(diff <= 2 * SplitterConfig::default().pattern_max as i64);
}
