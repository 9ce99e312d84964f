//! QUE Device firmware entry point (nRF52840, SoftDevice S140).
//!
//! Boot order: GPIO → SoftDevice → GATT server → tasks. A failure before
//! the tasks are running is fatal and halts the CPU.

#![no_std]
#![no_main]

mod ble;
mod error;
mod leds;
mod uptime;

use core::mem;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::Priority;
use nrf_softdevice::{raw, Softdevice};
use que_device::{config, Clock, Controller};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::ble::gatt::Server;
use crate::error::halt;
use crate::leds::{RgbLed, StatusLed};
use crate::uptime::SystemClock;

static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn peripheral_task(
    sd: &'static Softdevice,
    server: &'static Server,
    controller: Controller,
    rgb: RgbLed<Output<'static>>,
    status: StatusLed<Output<'static>>,
) -> ! {
    ble::run(sd, server, controller, rgb, status).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("QUE Device starting");

    // SoftDevice reserves priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    let rgb = RgbLed::new(
        Output::new(p.P0_24, Level::High, OutputDrive::Standard),
        Output::new(p.P0_16, Level::High, OutputDrive::Standard),
        Output::new(p.P0_06, Level::High, OutputDrive::Standard),
    );
    let status = StatusLed::new(Output::new(p.P0_13, Level::Low, OutputDrive::Standard));

    let controller = Controller::new(SystemClock.now());

    info!("Initializing BLE...");
    let sd = Softdevice::enable(&softdevice_config());
    let server = match Server::register(sd, controller.store().settings()) {
        Ok(server) => SERVER.init(server),
        Err(e) => halt(e),
    };
    let sd: &'static Softdevice = sd;

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(peripheral_task(sd, server, controller, rgb, status)));
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}
