//! Shared core: chain descriptor, provider wire constants, unit formatting.
//!
//! Everything here is pure and compiles on every target.

pub mod chain;
pub(crate) mod flight;
pub mod listeners;
pub mod rpc;
pub mod units;

pub use chain::{ChainConfig, NativeCurrency};
pub use listeners::Listeners;
pub use units::{format_units, parse_quantity, short_address, UnitsError};
