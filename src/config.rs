//! Application-wide constants and compile-time configuration.
//!
//! Setting defaults, timing parameters, BLE identity and pin assignments
//! live here so they can be tuned in one place.

// Setting defaults

/// Default red emission pulse length (ms).
pub const DEFAULT_EMISSION1_DURATION_MS: u32 = 10_000;

/// Default green emission pulse length (ms).
pub const DEFAULT_EMISSION2_DURATION_MS: u32 = 10_000;

/// Default time between red emissions (ms). 5 minutes.
pub const DEFAULT_INTERVAL1_MS: u32 = 300_000;

/// Default time between green emissions (ms). 5 minutes.
pub const DEFAULT_INTERVAL2_MS: u32 = 300_000;

pub const DEFAULT_PERIODIC1_ENABLED: bool = false;
pub const DEFAULT_PERIODIC2_ENABLED: bool = false;

/// Default heart-rate threshold (BPM).
pub const DEFAULT_HEARTRATE_THRESHOLD: u8 = 90;

// Connection

/// A central that writes nothing for this long is disconnected (ms).
pub const CONNECTION_TIMEOUT_MS: u32 = 60_000;

/// Pause between two scheduler ticks while a central is connected (ms).
pub const TICK_PERIOD_MS: u64 = 20;

// BLE

/// GAP device name and advertised local name.
pub const DEVICE_NAME: &str = "QUE Device";

/// BLE connection interval range (in 1.25 ms units).
/// 24..40 = 30..50 ms, plenty for a settings link.
pub const BLE_CONN_INTERVAL_MIN: u16 = 24;
pub const BLE_CONN_INTERVAL_MAX: u16 = 40;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// Back-off before retrying a failed advertising start (ms).
pub const ADVERTISE_RETRY_MS: u64 = 1_000;

// GPIO pin assignments (Arduino Nano 33 BLE)
//
// These are logical names; the concrete `embassy_nrf::peripherals::*` pins
// are picked in `main.rs`.
//
//   RGB red       → P0.24 (active-low)
//   RGB green     → P0.16 (active-low)
//   RGB blue      → P0.06 (active-low)
//   Status LED    → P0.13 (active-high, lit while a central is connected)
