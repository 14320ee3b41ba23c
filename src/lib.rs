/// ip100_driver: Rainwise IP-100 weather station driver.
///
/// # Module structure
///
/// ```text
/// ip100_driver
/// ├── model       — shared data types (FieldValue, FlatReading, Packet, FetchError, …)
/// ├── config      — driver configuration loader (ip100.toml)
/// ├── sensor_map  — canonical ↔ device field registry and per-deployment overrides
/// ├── ingest
/// │   ├── http    — blocking GET of status.xml
/// │   ├── status  — status.xml → FlatReading
/// │   └── fixtures (test only) — representative status documents
/// ├── mapping     — FlatReading → Packet (renaming, unit system, rain delta)
/// ├── rain        — daily rain counter → per-packet delta
/// └── driver      — startup probe and the aligned poll/retry loop
/// ```

/// Public modules
pub mod config;
pub mod driver;
pub mod ingest;
pub mod mapping;
pub mod model;
pub mod rain;
pub mod sensor_map;

pub use config::DriverConfig;
pub use driver::{Clock, Ip100Driver, LoopPackets, SystemClock};
pub use model::{FetchError, FieldValue, FlatReading, Packet, PollError, UnitSystem};
