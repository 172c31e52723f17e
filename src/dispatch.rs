// DISPATCHER (C5)
// PER-REQUEST CACHE/BACKEND DECISION REALISING THE CURRENT SPLIT RATIO,
// WITH A FORCED BACKEND ROUTE FOR CACHE MISSES. DIRECTLY GROUNDED IN
// THE ORIGINAL initialize_split_pattern / netcas_should_send_to_backend
// PATTERN-AND-QUOTA SCHEME, REEXPRESSED AS OWNED STATE INSTEAD OF
// FILE-SCOPE STATICS.

/// GCD via the Euclidean algorithm, with the spec's convention that
/// `gcd(0, x) == gcd(x, 0) == 1` (division-by-zero guard for `a == 0`
/// or `a == 100`, §7).
fn gcd(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 1;
    }
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// The short repeating pattern a dispatcher replays once the window's
/// expected cache/backend counts have both been met for this tick.
#[derive(Clone, Copy, Debug)]
struct Pattern {
    size: u32,
    cache: u32,
}

impl Pattern {
    /// Builds the pattern for cache-percentage `a` over window `w`,
    /// capped at `p_max` (§4.5).
    fn build(a: u32, w: u32, p_max: u32) -> Self {
        let g = gcd(a, w - a);
        let size = (w / g).min(p_max).max(1);
        let cache = (a * size) / w;
        Self { size, cache }
    }

    fn cache_at(&self, position: u32) -> bool {
        position < self.cache
    }
}

/// Realises a target cache-share ratio over a window of `W` non-miss
/// requests, absorbing forced backend routings (cache misses) without
/// letting them skew the pattern's convergence.
pub struct Dispatcher {
    window: u32,
    pattern_max: u32,
    scale: u64,

    pattern: Pattern,
    pattern_position: u32,

    total: u64,
    cache_served: u64,
    backend_served: u64,

    cache_quota: u32,
    backend_quota: u32,
    last_was_cache: bool,

    request_counter: u64,
    current_pct: u32,
}

impl Dispatcher {
    pub fn new(window: u32, pattern_max: u32, scale: u64) -> Self {
        let mut d = Self {
            window,
            pattern_max,
            scale,
            pattern: Pattern { size: 0, cache: 0 },
            pattern_position: 0,
            total: 0,
            cache_served: 0,
            backend_served: 0,
            cache_quota: 0,
            backend_quota: 0,
            last_was_cache: false,
            request_counter: 0,
            current_pct: 100,
        };
        d.rebuild_pattern(scale); // a == 100 BY DEFAULT (SCALE => 100%)
        d
    }

    fn rebuild_pattern(&mut self, ratio: u64) {
        // MAP ratio (0..=self.scale) ONTO a (0..=self.window), RATHER
        // THAN ASSUMING scale/window == 100 -- A HOST MAY CONFIGURE A
        // window_size OTHER THAN 100 ALONGSIDE A NON-DEFAULT scale.
        let a = (ratio.saturating_mul(self.window as u64) / self.scale).min(self.window as u64) as u32;
        self.current_pct = a;
        self.pattern = Pattern::build(a, self.window, self.pattern_max);
        self.total = 0;
        self.cache_served = 0;
        self.backend_served = 0;
        self.cache_quota = a;
        self.backend_quota = self.window - a;
        self.pattern_position = 0;
    }

    /// One dispatch decision. `ratio` is the split-ratio cell's current
    /// value (0..=SCALE); `is_miss` reflects the external engine's
    /// per-request miss predicate. Returns `true` iff the request
    /// should go to the backend.
    pub fn dispatch(&mut self, ratio: u64, is_miss: bool) -> bool {
        if self.request_counter % self.window as u64 == 0 || self.pattern.size == 0 {
            self.rebuild_pattern(ratio);
        }

        self.request_counter += 1;
        self.total += 1;

        if is_miss {
            return true;
        }

        let a = self.current_pct as u64;
        let exp_cache = (self.total * a) / self.window as u64;
        let exp_backend = self.total - exp_cache;

        let to_backend = if self.cache_served < exp_cache {
            false
        } else if self.backend_served < exp_backend {
            true
        } else if self.pattern_position < self.pattern.size {
            let cache = self.pattern.cache_at(self.pattern_position);
            self.pattern_position = (self.pattern_position + 1) % self.pattern.size;
            !cache
        } else if self.cache_quota == 0 {
            true
        } else if self.backend_quota == 0 {
            false
        } else {
            self.last_was_cache
        };

        if to_backend {
            self.backend_served += 1;
            self.backend_quota = self.backend_quota.saturating_sub(1);
            self.last_was_cache = false;
        } else {
            self.cache_served += 1;
            self.cache_quota = self.cache_quota.saturating_sub(1);
            self.last_was_cache = true;
        }

        to_backend
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn cache_served(&self) -> u64 {
        self.cache_served
    }

    pub fn backend_served(&self) -> u64 {
        self.backend_served
    }

    pub fn reset(&mut self) {
        let (window, pattern_max, scale) = (self.window, self.pattern_max, self.scale);
        *self = Self::new(window, pattern_max, scale);
        self.request_counter = 0;
    }
}
