// TELEMETRY WINDOW (C1)
// FIXED-CAPACITY RING OF SAMPLES WITH RUNNING SUM/AVERAGE, PLUS THE
// HIGH/LOW WATERMARKS THE MODE CONTROLLER AND SPLIT CALCULATOR READ.
//
// ENCAPSULATED AS AN OWNED VALUE -- THE ORIGINAL C KEPT ALL OF THIS AS
// FILE-SCOPE GLOBALS (rdma_throughput_window[], rdma_window_sum, ...).

use crate::config::RDMA_WINDOW_SIZE;

/// A ring of `N` running samples with sum/average maintained incrementally.
#[derive(Clone, Debug)]
struct Ring<const N: usize> {
    samples: [u64; N],
    sum: u64,
    index: usize,
    count: usize,
}

impl<const N: usize> Ring<N> {
    fn new() -> Self {
        Self {
            samples: [0; N],
            sum: 0,
            index: 0,
            count: 0,
        }
    }

    fn push(&mut self, x: u64) {
        if self.count < N {
            self.count += 1;
        } else {
            self.sum -= self.samples[self.index];
        }
        self.samples[self.index] = x;
        self.sum += x;
        self.index = (self.index + 1) % N;
    }

    fn average(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.sum / self.count as u64
        }
    }

    fn is_full(&self) -> bool {
        self.count == N
    }
}

/// Moving-average window over RDMA throughput, tracking the
/// all-time high-water mark used for bandwidth-drop computations.
#[derive(Clone, Debug)]
pub struct ThroughputWindow {
    ring: Ring<RDMA_WINDOW_SIZE>,
    max_avg_throughput: u64,
}

impl ThroughputWindow {
    pub fn new() -> Self {
        Self {
            ring: Ring::new(),
            max_avg_throughput: 0,
        }
    }

    pub fn observe(&mut self, x: u64) {
        self.ring.push(x);
        let avg = self.ring.average();
        if avg > self.max_avg_throughput {
            self.max_avg_throughput = avg;
        }
    }

    pub fn average(&self) -> u64 {
        self.ring.average()
    }

    pub fn max_avg_throughput(&self) -> u64 {
        self.max_avg_throughput
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// `((max_avg - current_avg) * 1000) / max_avg`, saturating to 0
    /// when there is no high-water mark yet or the average has caught
    /// up to (or exceeded) it.
    pub fn drop_permil(&self) -> u64 {
        let max_avg = self.max_avg_throughput;
        if max_avg == 0 {
            return 0;
        }
        let current = self.average();
        let drop = max_avg.saturating_sub(current);
        drop.saturating_mul(1000) / max_avg
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ThroughputWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Moving-average window over RDMA latency, tracking a baseline
/// established only after a stabilisation period of non-zero samples.
#[derive(Clone, Debug)]
pub struct LatencyWindow {
    ring: Ring<RDMA_WINDOW_SIZE>,
    sample_count: u64,
    min_avg_latency: u64,
    baseline_established: bool,
    stabilization_samples: u64,
}

impl LatencyWindow {
    pub fn new(stabilization_samples: u64) -> Self {
        Self {
            ring: Ring::new(),
            sample_count: 0,
            min_avg_latency: 0,
            baseline_established: false,
            stabilization_samples,
        }
    }

    pub fn observe(&mut self, x: u64) {
        self.ring.push(x);
        self.sample_count += 1;

        let avg = self.ring.average();
        if self.sample_count >= self.stabilization_samples {
            if !self.baseline_established {
                if avg > 0 {
                    self.min_avg_latency = avg;
                    self.baseline_established = true;
                }
            } else if avg < self.min_avg_latency {
                self.min_avg_latency = avg;
            }
        }
    }

    pub fn average(&self) -> u64 {
        self.ring.average()
    }

    pub fn baseline(&self) -> u64 {
        self.min_avg_latency
    }

    pub fn baseline_established(&self) -> bool {
        self.baseline_established
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// `((current_avg - baseline) * 1000) / baseline`, saturating to 0
    /// when no baseline exists yet or the current average has not
    /// exceeded it.
    pub fn increase_permil(&self) -> u64 {
        if !self.baseline_established || self.min_avg_latency == 0 {
            return 0;
        }
        let current = self.average();
        let increase = current.saturating_sub(self.min_avg_latency);
        increase.saturating_mul(1000) / self.min_avg_latency
    }

    pub fn reset(&mut self) {
        let stabilization_samples = self.stabilization_samples;
        *self = Self::new(stabilization_samples);
    }
}
