//! Adaptive I/O request splitter for a hybrid RDMA-cache / block-backend
//! accelerator: watches throughput and latency, derives a closed-form
//! split ratio from bandwidth-oracle endpoints, and dispatches individual
//! requests to hit that ratio over a rolling window.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod mode;
pub mod oracle;
pub mod split;
pub mod splitter;
pub mod telemetry;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::SplitterConfig;
pub use engine::{CacheEngine, PerformanceSample, Request};
pub use mode::Mode;
pub use oracle::{BandwidthOracle, ConstantOracle, TableOracle};
pub use splitter::Splitter;
