//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertiser** - connectable advertising as "QUE Device", announcing
//!    the LED service only.
//! 2. **GATT server** - LED switch + settings characteristics (see
//!    [`gatt`]); writes are queued into `PendingWrites`.
//! 3. **Connection manager** - runs the core scheduler tick while a central
//!    is connected, drops the link on inactivity and resets the LEDs when
//!    the link goes away.
//!
//! One central at a time; advertising restarts after every disconnect.

pub mod gatt;

use core::cell::{Cell, RefCell};
use core::pin::pin;

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Output;
use embassy_time::Timer;
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};
use que_device::{config, Clock, Controller, LedActuator, PendingWrites, Setting, SettingValue};

use crate::error::Error;
use crate::leds::{RgbLed, StatusLed};
use crate::uptime::SystemClock;
use gatt::{LedServiceEvent, Server, ServerEvent, SettingsServiceEvent};

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Complete, &[ServiceUuid16::DEVICE_INFORMATION])
    .full_name(config::DEVICE_NAME)
    .build();

/// Connection manager loop. Never returns.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static Server,
    mut controller: Controller,
    mut rgb: RgbLed<Output<'static>>,
    mut status: StatusLed<Output<'static>>,
) -> ! {
    let mut clock = SystemClock;
    let pending = RefCell::new(PendingWrites::new());

    loop {
        info!("Advertising as '{}'", config::DEVICE_NAME);
        let conn = match advertise(sd).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising failed: {}", e);
                Timer::after_millis(config::ADVERTISE_RETRY_MS).await;
                continue;
            }
        };

        info!("Connected to central: {}", conn.peer_address());
        status.set_connected(true);
        request_conn_params(&conn);
        controller.on_connect(clock.now());

        let link_down = Cell::new(false);
        {
            let gatt = pin!(gatt_server::run(&conn, server, |event| {
                on_gatt_event(&pending, event)
            }));
            let mut ticks = pin!(tick_loop(
                &conn,
                &mut controller,
                &pending,
                &mut rgb,
                &mut clock,
                &link_down,
            ));

            match select(gatt, ticks.as_mut()).await {
                Either::First(_) => {
                    info!("Disconnected from central");
                    // A pulse may be lit; let the tick finish it.
                    link_down.set(true);
                    ticks.await;
                }
                Either::Second(()) => info!("Dropped idle central"),
            }
        }

        status.set_connected(false);
        controller.on_disconnect(&mut rgb);
    }
}

async fn advertise(sd: &Softdevice) -> Result<Connection, Error> {
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &ADV_DATA,
        scan_data: &[],
    };
    let conn = peripheral::advertise_connectable(sd, adv, &peripheral::Config::default()).await?;
    Ok(conn)
}

fn request_conn_params(conn: &Connection) {
    let params = raw::ble_gap_conn_params_t {
        min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
        max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
        slave_latency: config::BLE_SLAVE_LATENCY,
        conn_sup_timeout: config::BLE_SUP_TIMEOUT,
    };
    if conn.set_conn_params(params).is_err() {
        warn!("Could not request connection parameters");
    }
}

/// Queue a characteristic write for the next tick.
fn on_gatt_event(pending: &RefCell<PendingWrites>, event: ServerEvent) {
    let mut pending = pending.borrow_mut();
    match event {
        ServerEvent::Led(e) => match e {
            LedServiceEvent::SwitchWrite(code) => pending.record_switch(code),
            LedServiceEvent::SwitchCccdWrite { notifications } => {
                info!("switch notifications: {}", notifications)
            }
        },
        ServerEvent::Settings(e) => match e {
            SettingsServiceEvent::Emission1Write(ms) => {
                pending.record(Setting::Emission1Duration, SettingValue::Duration(ms))
            }
            SettingsServiceEvent::Emission2Write(ms) => {
                pending.record(Setting::Emission2Duration, SettingValue::Duration(ms))
            }
            SettingsServiceEvent::Interval1Write(ms) => {
                pending.record(Setting::Interval1, SettingValue::Duration(ms))
            }
            SettingsServiceEvent::Interval2Write(ms) => {
                pending.record(Setting::Interval2, SettingValue::Duration(ms))
            }
            SettingsServiceEvent::Periodic1Write(on) => {
                pending.record(Setting::Periodic1Enabled, SettingValue::Flag(on != 0))
            }
            SettingsServiceEvent::Periodic2Write(on) => {
                pending.record(Setting::Periodic2Enabled, SettingValue::Flag(on != 0))
            }
            SettingsServiceEvent::HeartrateWrite(bpm) => {
                pending.record(Setting::HeartrateThreshold, SettingValue::Threshold(bpm))
            }
            // CCCD subscriptions; nothing is notified on change.
            _ => {}
        },
    }
}

/// Tick until the central times out or `link_down` is raised. Returns after
/// asking for a disconnect, or between ticks once the link is gone.
async fn tick_loop<L: LedActuator>(
    conn: &Connection,
    controller: &mut Controller,
    pending: &RefCell<PendingWrites>,
    led: &mut L,
    clock: &mut SystemClock,
    link_down: &Cell<bool>,
) {
    let mut source = pending;
    loop {
        if link_down.get() {
            return;
        }

        let report = controller.tick(&mut source, led, clock).await;

        if report.fired.any() {
            info!("Emissions fired: {}", report.fired);
        }

        if report.timed_out {
            info!("Connection timeout");
            if conn.disconnect().is_err() {
                warn!("Link already down");
            }
            return;
        }

        Timer::after_millis(config::TICK_PERIOD_MS).await;
    }
}
