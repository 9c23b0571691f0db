//! Servodrive - Relay Servo Drive Firmware
//!
//! Main firmware binary for RP2040 boards driving a two-relay servo drive.
//! Position is estimated from travel time and kept in flash; the host talks
//! to the controller over UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use servodrive_core::config::{PinSpec, ServoConfig};
use servodrive_core::motion::Position;
use servodrive_drivers::{MotionController, MotionSettings};
use servodrive_hal_rp2040::{FlashPositionStore, GpioRelays, PinBank};

use crate::channels::SERVO;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Servodrive firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (mut pins, board) = PinBank::split(p);
    info!("Peripherals initialized");

    // Setup UART for the host link (115200 baud default)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(board.uart0, board.uart_tx, board.uart_rx, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    // The link comes up even if the servo cannot, so the host sees PONGs
    unwrap!(spawner.spawn(tasks::link_rx_task(rx)));
    unwrap!(spawner.spawn(tasks::link_tx_task(tx)));
    info!("UART initialized for host link");

    let mut store = FlashPositionStore::new(board.flash, board.flash_dma);
    let servo = match config::load_config(&mut store).await {
        Ok(config) => {
            info!(
                "Configuration loaded: {} ({}s stroke)",
                config.name.as_str(),
                config.max_time_to_move_s
            );
            build_servo(&mut pins, store, &config)
        }
        Err(e) => {
            error!("Failed to parse configuration: {}", e);
            None
        }
    };

    match servo {
        Some(servo) => {
            unwrap!(spawner.spawn(tasks::servo_task(servo)));
            info!("All tasks spawned, firmware running");
        }
        // Relays were never configured, so both stay de-energised
        None => error!("Servo disabled, host commands will go unanswered until the inbox fills"),
    }

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Claim the relay pins and assemble the controller
fn build_servo(
    pins: &mut PinBank,
    store: FlashPositionStore<'static>,
    config: &ServoConfig,
) -> Option<tasks::Servo> {
    let relays = take_relays(pins, config)?;

    let settings = match MotionSettings::from_config(config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid motion settings: {}", e);
            return None;
        }
    };

    Some(MotionController::new(
        relays,
        store,
        settings,
        &SERVO,
        Position::CLOSED,
    ))
}

fn take_relays(pins: &mut PinBank, config: &ServoConfig) -> Option<GpioRelays<'static>> {
    let mut take = |name: &str, value: &str| {
        let spec = match PinSpec::parse(value) {
            Ok(spec) => spec,
            Err(e) => {
                error!("{}: invalid pin '{}': {}", name, value, e);
                return None;
            }
        };
        match pins.take_relay(spec) {
            Ok(pin) => {
                info!("{} on GPIO{} (inverted={})", name, spec.pin, spec.inverted);
                Some(pin)
            }
            Err(e) => {
                error!("{}: GPIO{} unavailable: {}", name, spec.pin, e);
                None
            }
        }
    };

    let plus = take("switch_plus", config.switch_plus.as_str())?;
    let minus = take("switch_minus", config.switch_minus.as_str())?;
    Some(GpioRelays::new(plus, minus))
}
