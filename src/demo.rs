// SYNTHETIC WORKLOAD FOR `splitterctl simulate`. FOUR PHASES OF EQUAL
// LENGTH: IDLE, RAMP-UP, CONGESTED, RECOVERED -- EXERCISING EVERY MODE
// TRANSITION A REAL DEPLOYMENT WOULD SEE OVER A SESSION'S LIFETIME.

use std::sync::atomic::{AtomicU64, Ordering};

use netcas_splitter::{BandwidthOracle, CacheEngine, PerformanceSample, Request, TableOracle};

pub struct DemoRequest;
impl Request for DemoRequest {}

pub fn sample_oracle(io_depth: u64, numjobs: u64) -> TableOracle {
    let mut oracle = TableOracle::new(100_000);
    oracle.insert(io_depth, numjobs, 100, 900_000);
    oracle.insert(io_depth, numjobs, 0, 300_000);
    oracle
}

enum Phase {
    Idle,
    RampUp,
    Congested,
    Recovered,
}

pub struct PhasedEngine {
    ticks_per_phase: u64,
    miss_every: u64,
    phase_tick: AtomicU64,
    phase: AtomicU64,
    request_counter: AtomicU64,
}

impl PhasedEngine {
    /// `miss_every == 0` disables forced misses entirely.
    pub fn new(total_ticks: u64, miss_every: u64) -> Self {
        Self {
            ticks_per_phase: (total_ticks / 4).max(1),
            miss_every,
            phase_tick: AtomicU64::new(0),
            phase: AtomicU64::new(0),
            request_counter: AtomicU64::new(0),
        }
    }

    pub fn advance_phase(&self, tick: u64) {
        let phase = (tick / self.ticks_per_phase).min(3);
        self.phase.store(phase, Ordering::Relaxed);
        self.phase_tick.store(tick % self.ticks_per_phase, Ordering::Relaxed);
    }

    fn current_phase(&self) -> Phase {
        match self.phase.load(Ordering::Relaxed) {
            0 => Phase::Idle,
            1 => Phase::RampUp,
            2 => Phase::Congested,
            _ => Phase::Recovered,
        }
    }
}

impl CacheEngine<DemoRequest> for PhasedEngine {
    fn is_miss(&self, _req: &DemoRequest) -> bool {
        let n = self.request_counter.fetch_add(1, Ordering::Relaxed);
        self.miss_every != 0 && n % self.miss_every == 0
    }

    fn measure_performance(&self, _elapsed_ms: u64) -> PerformanceSample {
        match self.current_phase() {
            Phase::Idle => PerformanceSample {
                rdma_throughput: 0,
                rdma_latency: 0,
                iops: 0,
            },
            Phase::RampUp => PerformanceSample {
                rdma_throughput: 1_000,
                rdma_latency: 100,
                iops: 4_000,
            },
            Phase::Congested => PerformanceSample {
                rdma_throughput: 900,
                rdma_latency: 260,
                iops: 4_500,
            },
            Phase::Recovered => PerformanceSample {
                rdma_throughput: 1_000,
                rdma_latency: 105,
                iops: 4_000,
            },
        }
    }
}
