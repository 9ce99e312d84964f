//! Wrap-safe millisecond time.
//!
//! The board's uptime counter is 32 bits wide and rolls over after about
//! 49.7 days. Every elapsed-time decision in the core goes through
//! [`Timestamp::elapsed_since`], which subtracts with wrapping arithmetic so
//! a rollover between the two readings still yields the true (small)
//! elapsed time.

/// Opaque monotonic millisecond reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(u32);

impl Timestamp {
    /// Counter origin. Emission channels start out "last fired" here.
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, correct across one rollover.
    pub const fn elapsed_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Timestamp `ms` later, wrapping like the hardware counter.
    pub const fn wrapping_add(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }
}

/// Source of the current time plus the pulse hold.
///
/// `hold` is the single suspension point of the scheduler: the tick that
/// calls it does nothing else until it returns.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Timestamp;

    /// Wait `ms` milliseconds.
    async fn hold(&mut self, ms: u32);
}
