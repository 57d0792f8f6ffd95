//! Registry of named network parameter sets for Zcash-style chains.
//!
//! Each descriptor carries the address-version prefixes, extended-key magic
//! values, peer-protocol magic, default port and DNS seeds that address
//! codecs and peer handshake code read elsewhere. This crate only supplies
//! the constants and the lookup machinery: no cryptography, no I/O, no
//! parsing.
//!
//! `Registry::builtin()` comes pre-populated with `livenet` and `testnet`;
//! the testnet descriptor switches between its testnet and regtest parameter
//! bundles in place via `enable_regtest` / `disable_regtest`.

mod magic;
mod network;
mod registry;

pub use magic::Magic;
pub use network::{Network, NetworkSpec};
pub use registry::{Field, Key, Query, Registry};
