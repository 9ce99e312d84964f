//! Target clock for the core scheduler.

use embassy_time::{Instant, Timer};
use que_device::{Clock, Timestamp};

/// Millisecond uptime from the RTC1 time driver.
///
/// Truncated to 32 bits on purpose: the core's arithmetic is written for a
/// wrapping counter.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(Instant::now().as_millis() as u32)
    }

    async fn hold(&mut self, ms: u32) {
        Timer::after_millis(u64::from(ms)).await;
    }
}
