//! GPIO relay outputs
//!
//! Each relay is a plain push-pull output. Active-low relay modules are
//! handled per pin, so `activate` always means "energise the coil".

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::Peri;

use servodrive_hal::{Relay, RelayError, RelayOutput};

/// One relay output pin
pub struct RelayPin<'d> {
    output: Output<'d>,
    inverted: bool,
}

impl<'d> RelayPin<'d> {
    /// Configure `pin` as a relay output, starting de-energised
    pub fn new(pin: Peri<'d, AnyPin>, inverted: bool) -> Self {
        let idle = if inverted { Level::High } else { Level::Low };
        Self {
            output: Output::new(pin, idle),
            inverted,
        }
    }

    fn set(&mut self, energised: bool) {
        let level = if energised != self.inverted {
            Level::High
        } else {
            Level::Low
        };
        self.output.set_level(level);
    }
}

/// Plus/minus relays on two GPIOs
pub struct GpioRelays<'d> {
    pins: [RelayPin<'d>; 2],
}

impl<'d> GpioRelays<'d> {
    pub fn new(plus: RelayPin<'d>, minus: RelayPin<'d>) -> Self {
        Self { pins: [plus, minus] }
    }
}

impl<'d> RelayOutput for GpioRelays<'d> {
    async fn activate(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.pins[relay.index()].set(true);
        Ok(())
    }

    async fn deactivate(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.pins[relay.index()].set(false);
        Ok(())
    }
}
