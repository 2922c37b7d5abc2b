//! Single-flight guard for async operations on a single thread

use std::cell::Cell;

/// Holds the in-flight flag; clears it however the holder exits.
pub(crate) struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    /// `None` if another holder is already in flight.
    pub(crate) fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) { None } else { Some(Self(flag)) }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) { self.0.set(false); }
}
