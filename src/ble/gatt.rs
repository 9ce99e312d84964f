//! GATT server layout.
//!
//! The `#[nrf_softdevice::gatt_service]` macro generates the registration
//! code, `_get`/`_set`/`_notify` helpers and a `<Service>Event` enum with a
//! `<Field>Write` variant per writable characteristic.

use nrf_softdevice::Softdevice;
use que_device::settings::Settings;

use crate::error::Error;

/// LED control service: 1-byte switch command (0 off, 1 red, 2 green, 3 blue).
#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct LedService {
    #[characteristic(uuid = "2a57", read, write, notify)]
    pub switch: u8,
}

/// Remotely configurable settings, one characteristic each:
///
/// ```text
/// 2a19 emission1  u32  red pulse length (ms)
/// 2a1a emission2  u32  green pulse length (ms)
/// 2a1b interval1  u32  time between red pulses (ms)
/// 2a1c interval2  u32  time between green pulses (ms)
/// 2a1d periodic1  u8   red emissions enabled (non-zero = on)
/// 2a1e periodic2  u8   green emissions enabled (non-zero = on)
/// 2a1f heartrate  u8   heart-rate threshold (BPM)
/// ```
#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct SettingsService {
    #[characteristic(uuid = "2a19", read, write, notify)]
    pub emission1: u32,

    #[characteristic(uuid = "2a1a", read, write, notify)]
    pub emission2: u32,

    #[characteristic(uuid = "2a1b", read, write, notify)]
    pub interval1: u32,

    #[characteristic(uuid = "2a1c", read, write, notify)]
    pub interval2: u32,

    #[characteristic(uuid = "2a1d", read, write, notify)]
    pub periodic1: u8,

    #[characteristic(uuid = "2a1e", read, write, notify)]
    pub periodic2: u8,

    #[characteristic(uuid = "2a1f", read, write, notify)]
    pub heartrate: u8,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub led: LedService,
    pub settings: SettingsService,
}

impl Server {
    /// Register both services and seed every characteristic with the
    /// current value, so a central reads the real state before writing.
    pub fn register(sd: &mut Softdevice, settings: &Settings) -> Result<Self, Error> {
        let server = Server::new(sd)?;

        server.led.switch_set(&0)?;

        let s = &server.settings;
        s.emission1_set(&settings.emission1_duration_ms)?;
        s.emission2_set(&settings.emission2_duration_ms)?;
        s.interval1_set(&settings.interval1_ms)?;
        s.interval2_set(&settings.interval2_ms)?;
        s.periodic1_set(&u8::from(settings.periodic1_enabled))?;
        s.periodic2_set(&u8::from(settings.periodic2_enabled))?;
        s.heartrate_set(&settings.heartrate_threshold)?;

        Ok(server)
    }
}
