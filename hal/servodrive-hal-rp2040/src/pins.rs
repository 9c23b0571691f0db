//! Pin allocation by number
//!
//! Relay pins come from `servo.toml`, so they are handed out at runtime
//! from a bank of type-erased GPIOs. GPIO0/1 stay typed because UART0
//! (the host link) needs them.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{DMA_CH0, FLASH, PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};

use servodrive_core::config::{PinSpec, MAX_GPIO};

use crate::relay::RelayPin;

/// GPIOs reserved for the host link UART
pub const UART_TX_PIN: u8 = 0;
pub const UART_RX_PIN: u8 = 1;

const PIN_COUNT: usize = MAX_GPIO as usize + 1;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin reserved for the host link
    Reserved,
}

/// Non-GPIO peripherals the firmware needs after the bank is built
pub struct BoardPeripherals {
    pub flash: Peri<'static, FLASH>,
    pub flash_dma: Peri<'static, DMA_CH0>,
    pub uart0: Peri<'static, UART0>,
    pub uart_tx: Peri<'static, PIN_0>,
    pub uart_rx: Peri<'static, PIN_1>,
}

/// GPIOs available for relays, taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_COUNT],
}

impl PinBank {
    /// Split the chip's peripherals into the pin bank and everything else
    pub fn split(p: Peripherals) -> (Self, BoardPeripherals) {
        let bank = Self {
            pins: [
                None, // UART0 TX
                None, // UART0 RX
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };

        let board = BoardPeripherals {
            flash: p.FLASH,
            flash_dma: p.DMA_CH0,
            uart0: p.UART0,
            uart_tx: p.PIN_0,
            uart_rx: p.PIN_1,
        };

        (bank, board)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin_num == UART_TX_PIN || pin_num == UART_RX_PIN {
            return Err(PinError::Reserved);
        }
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin)?
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Take the pin named by `spec` and configure it as a relay output
    pub fn take_relay(&mut self, spec: PinSpec) -> Result<RelayPin<'static>, PinError> {
        let pin = self.take(spec.pin)?;
        Ok(RelayPin::new(pin, spec.inverted))
    }
}
