// BANDWIDTH ORACLE (C2)
// PRECOMPUTED LOOKUP FROM (io_depth, numjobs, split_pct) TO EXPECTED
// AGGREGATE IOPS. THE SPLIT CALCULATOR ONLY EVER CONSULTS THE TWO
// ENDPOINTS, split_pct == 100 (CACHE-ONLY) AND split_pct == 0
// (BACKEND-ONLY).
//
// INJECTED AS A TRAIT OBJECT (DESIGN NOTE: "BANDWIDTH ORACLE AS AN
// INJECTED CAPABILITY") SO TESTS CAN SUPPLY DETERMINISTIC NUMBERS
// WITHOUT A REAL MEASUREMENT PASS.

use std::collections::HashMap;

pub trait BandwidthOracle: Send + Sync {
    fn bw(&self, io_depth: u64, numjobs: u64, split_pct: u64) -> u64;
}

/// A sparse lookup table oracle, grounded in the original's
/// `lookup_bandwidth`/NVMe-over-RDMA bandwidth table concept. Keys not
/// present fall back to the nearest populated `split_pct` for the same
/// `(io_depth, numjobs)` pair, else a fixed default.
pub struct TableOracle {
    table: HashMap<(u64, u64, u64), u64>,
    default_iops: u64,
}

impl TableOracle {
    pub fn new(default_iops: u64) -> Self {
        Self {
            table: HashMap::new(),
            default_iops,
        }
    }

    pub fn insert(&mut self, io_depth: u64, numjobs: u64, split_pct: u64, iops: u64) {
        self.table.insert((io_depth, numjobs, split_pct), iops);
    }

    fn nearest(&self, io_depth: u64, numjobs: u64, split_pct: u64) -> Option<u64> {
        self.table
            .iter()
            .filter(|((d, n, _), _)| *d == io_depth && *n == numjobs)
            .min_by_key(|((_, _, p), _)| p.abs_diff(split_pct))
            .map(|(_, iops)| *iops)
    }
}

impl BandwidthOracle for TableOracle {
    fn bw(&self, io_depth: u64, numjobs: u64, split_pct: u64) -> u64 {
        if let Some(&iops) = self.table.get(&(io_depth, numjobs, split_pct)) {
            return iops;
        }
        self.nearest(io_depth, numjobs, split_pct)
            .unwrap_or(self.default_iops)
    }
}

/// Fixed-value oracle for tests exercising the split calculator in
/// isolation, where every `(io_depth, numjobs, split_pct)` triple maps
/// to one of two constants depending only on whether `split_pct == 100`.
pub struct ConstantOracle {
    pub cache_only: u64,
    pub backend_only: u64,
}

impl BandwidthOracle for ConstantOracle {
    fn bw(&self, _io_depth: u64, _numjobs: u64, split_pct: u64) -> u64 {
        if split_pct == 100 {
            self.cache_only
        } else {
            self.backend_only
        }
    }
}
