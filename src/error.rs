//! Unified error type for the firmware glue.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! The core library has no error type: every settings, scheduling and LED
//! operation is total. Only bring-up and the BLE link can fail.

use defmt::Format;
use nrf_softdevice::ble::gatt_server::{RegisterError, SetValueError};
use nrf_softdevice::ble::peripheral::AdvertiseError;

/// Top-level error type used across the firmware.
#[derive(Debug, Format)]
pub enum Error {
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// GATT service/characteristic registration failed at boot.
    RegisterFailed,
    /// Seeding a characteristic's initial value failed.
    SetValueFailed,
    /// Connectable advertising could not start.
    AdvertiseFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl From<RegisterError> for Error {
    fn from(_: RegisterError) -> Self {
        Error::Ble(BleError::RegisterFailed)
    }
}

impl From<SetValueError> for Error {
    fn from(_: SetValueError) -> Self {
        Error::Ble(BleError::SetValueFailed)
    }
}

impl From<AdvertiseError> for Error {
    fn from(_: AdvertiseError) -> Self {
        Error::Ble(BleError::AdvertiseFailed)
    }
}

/// Fatal-error policy: log and park the CPU forever.
pub fn halt(err: Error) -> ! {
    defmt::error!("Fatal: {}", err);
    loop {
        cortex_m::asm::wfi();
    }
}
