//! Periodic polling of a DHT11.
//!
//! The sensor cannot be queried faster than about once every 1-2 seconds.
//! [`Monitor`] performs one read, reports the outcome through the logging
//! sink and then waits out [`READ_INTERVAL_MS`] before returning, so callers
//! looping on [`Monitor::poll`] never violate that spacing.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::dht11::Dht11;
use crate::error::{ReadOutcome, report};

/// Minimum spacing between two reads, in milliseconds.
pub const READ_INTERVAL_MS: u32 = 2000;

/// Reads a DHT11 at a fixed interval.
pub struct Monitor<PIN, D> {
    sensor: Dht11<PIN, D>,
}

impl<PIN, DELAY, E> Monitor<PIN, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
{
    pub fn new(sensor: Dht11<PIN, DELAY>) -> Self {
        Monitor { sensor }
    }

    /// Reads the sensor once, reports the outcome and waits for the next slot.
    ///
    /// Failed reads are not retried; the next call is the retry.
    pub fn poll(&mut self) -> ReadOutcome<E> {
        let outcome = self.sensor.read();
        report(&outcome);
        self.sensor.delay_mut().delay_ms(READ_INTERVAL_MS);
        outcome
    }

    /// Polls forever.
    pub fn run(&mut self) -> ! {
        loop {
            let _ = self.poll();
        }
    }

    pub fn sensor(&self) -> &Dht11<PIN, DELAY> {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut Dht11<PIN, DELAY> {
        &mut self.sensor
    }

    /// Gives back the wrapped driver.
    pub fn release(self) -> Dht11<PIN, DELAY> {
        self.sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dht11::Reading;
    use crate::error::DhtError;
    use embedded_hal_mock::eh1::delay::CheckedDelay;
    use embedded_hal_mock::eh1::delay::Transaction as DelayTx;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTx};

    #[test]
    fn test_poll_waits_after_failed_read() {
        // Sensor holds the line low: the acknowledgment times out after 87 samples.
        let mut pin_states = vec![PinTx::set(State::Low), PinTx::set(State::High)];
        pin_states.extend((0..87).map(|_| PinTx::get(State::Low)));
        let mut pin = PinMock::new(&pin_states);

        let mut delay_transactions = vec![DelayTx::delay_us(20_000), DelayTx::delay_us(25)];
        delay_transactions.extend(std::iter::repeat_n(DelayTx::delay_us(1), 86));
        delay_transactions.push(DelayTx::delay_ms(READ_INTERVAL_MS));
        let mut delay = CheckedDelay::new(&delay_transactions);

        let mut monitor = Monitor::new(Dht11::new(pin.clone(), &mut delay));
        assert_eq!(monitor.poll().unwrap_err(), DhtError::Timeout);
        assert_eq!(monitor.sensor().last_reading(), Reading::default());

        pin.done();
        delay.done();
    }

    #[test]
    fn test_poll_waits_after_successful_read() {
        let frame = [45u8, 0, 25, 0, 70];

        let mut pin_states = vec![PinTx::set(State::Low), PinTx::set(State::High)];
        // Acknowledgment: one sample low, one sample high.
        pin_states.extend([
            PinTx::get(State::Low),
            PinTx::get(State::High),
            PinTx::get(State::High),
            PinTx::get(State::Low),
        ]);
        let mut sampled_us = 2;
        for i in 0..40 {
            let bit = (frame[i / 8] >> (7 - i % 8)) & 1 == 1;
            let high_samples = if bit { 70 } else { 26 };
            // One sample low, then the high pulse.
            pin_states.push(PinTx::get(State::Low));
            pin_states.push(PinTx::get(State::High));
            pin_states.extend((0..high_samples).map(|_| PinTx::get(State::High)));
            pin_states.push(PinTx::get(State::Low));
            sampled_us += 1 + high_samples;
        }
        let mut pin = PinMock::new(&pin_states);

        let mut delay_transactions = vec![DelayTx::delay_us(20_000), DelayTx::delay_us(25)];
        delay_transactions.extend(std::iter::repeat_n(DelayTx::delay_us(1), sampled_us));
        delay_transactions.push(DelayTx::delay_ms(READ_INTERVAL_MS));
        let mut delay = CheckedDelay::new(&delay_transactions);

        let mut monitor = Monitor::new(Dht11::new(pin.clone(), &mut delay));
        let reading = monitor.poll().unwrap();
        assert_eq!(
            reading,
            Reading {
                humidity: 45,
                temperature: 25,
            }
        );
        assert_eq!(monitor.sensor_mut().last_humidity(), 45);

        monitor.release();
        pin.done();
        delay.done();
    }
}
