//! Provider adapters.
//!
//! | Adapter | History | Latest | Notes |
//! |---------|---------|--------|-------|
//! | [`YahooAdapter`] | yes | yes | Chart endpoint; `.TW` with `.TWO` fallback |
//! | [`TwseAdapter`] | no | yes | Exchange realtime quote endpoint |
//!
//! Both adapters serve deterministic synthetic data when built in offline
//! mode (the default), mirroring the transport-free construction used by
//! tests and the CLI `--offline` flag.

mod twse;
mod yahoo;

pub use twse::TwseAdapter;
pub use yahoo::YahooAdapter;
