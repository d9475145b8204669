use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin, PinState},
};

use crate::error::{DhtError, ReadOutcome};

/// How long the MCU holds the line low to wake the sensor (at least 18 ms).
pub const START_LOW_US: u32 = 20_000;

/// How long the MCU holds the line high before handing it to the sensor (20-40us).
pub const START_HIGH_US: u32 = 25;

/// Timeout for each half of the sensor's ~80us low / ~80us high acknowledgment.
pub const ACK_TIMEOUT_US: u32 = 85;

/// Timeout for the ~50us low pulse that starts every data bit.
pub const BIT_LOW_TIMEOUT_US: u32 = 56;

/// Timeout for the data-carrying high pulse of every bit.
pub const BIT_HIGH_TIMEOUT_US: u32 = 75;

/// A high pulse longer than this is a `1` bit (~26-28us for a 0, ~70us for a 1).
pub const BIT_ONE_THRESHOLD_US: u32 = 40;

/// Driver for the DHT11 temperature and humidity sensor.
pub struct Dht11<PIN, D> {
    pin: PIN,
    delay: D,
    last: Reading,
}

/// Reading returned by the DHT11 sensor.
///
/// The DHT11 only reports whole numbers; the fractional bytes of the frame are
/// always zero and are not kept.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reading {
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Temperature in degrees Celsius.
    pub temperature: u8,
}

impl<PIN, DELAY, E> Dht11<PIN, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
{
    /// Creates a new instance of the DHT11 driver.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the DHT11 data line. It must be wired
    ///   open-drain: driving it high releases the line so the sensor can pull it low.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    pub fn new(pin: PIN, delay: DELAY) -> Self {
        Dht11 {
            pin,
            delay,
            last: Reading::default(),
        }
    }

    /// Performs one complete request/response cycle with the sensor.
    ///
    /// Sends the start signal, waits for the sensor's acknowledgment, times
    /// the 40 data bits and validates the checksum. On success the reading is
    /// also stored and becomes available through [`Dht11::last_reading`].
    /// On failure the stored reading is left untouched.
    ///
    /// The sensor must not be read more often than about once every 2 seconds.
    pub fn read(&mut self) -> ReadOutcome<E> {
        self.start()?;
        let frame = self.read_response()?;
        let reading = Self::validate(frame)?;
        self.last = reading;
        Ok(reading)
    }

    /// The most recent successful reading, or zeros if there was none yet.
    pub fn last_reading(&self) -> Reading {
        self.last
    }

    /// Humidity of the most recent successful reading.
    pub fn last_humidity(&self) -> u8 {
        self.last.humidity
    }

    /// Temperature of the most recent successful reading.
    pub fn last_temperature(&self) -> u8 {
        self.last.temperature
    }

    /// Consumes the driver and hands back the pin and delay provider.
    pub fn release(self) -> (PIN, DELAY) {
        (self.pin, self.delay)
    }

    pub(crate) fn delay_mut(&mut self) -> &mut DELAY {
        &mut self.delay
    }

    /// Sends the start signal to the DHT11.
    ///
    /// The line is pulled low for 20 ms, then released high for 25us. After
    /// that the line stays released and the sensor drives it.
    fn start(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_low()?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high()?;
        self.delay.delay_us(START_HIGH_US);
        Ok(())
    }

    #[cfg(feature = "critical-section")]
    fn read_response(&mut self) -> Result<[u8; 5], DhtError<E>> {
        critical_section::with(|_cs| self.read_frame())
    }

    #[cfg(not(feature = "critical-section"))]
    fn read_response(&mut self) -> Result<[u8; 5], DhtError<E>> {
        self.read_frame()
    }

    /// Waits out the sensor acknowledgment and reads the 5 byte frame.
    fn read_frame(&mut self) -> Result<[u8; 5], DhtError<E>> {
        self.measure_level(PinState::Low, ACK_TIMEOUT_US)?; // ~80us
        self.measure_level(PinState::High, ACK_TIMEOUT_US)?; // ~80us

        let mut frame = [0; 5];
        for b in frame.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(frame)
    }

    /// Checks the frame checksum and extracts the integer parts.
    fn validate(frame: [u8; 5]) -> ReadOutcome<E> {
        let [humidity, humidity_decimal, temperature, temperature_decimal, checksum] = frame;

        let sum = [humidity, humidity_decimal, temperature, temperature_decimal]
            .iter()
            .fold(0u8, |sum, v| sum.wrapping_add(*v));
        if sum != checksum {
            return Err(DhtError::ChecksumMismatch);
        }

        Ok(Reading {
            humidity,
            temperature,
        })
    }

    /// Reads one byte (8 bits, MSB first) from the sensor.
    fn read_byte(&mut self) -> Result<u8, DhtError<E>> {
        let mut byte: u8 = 0;

        for i in 0..8 {
            let bit_mask = 1 << (7 - i);
            if self.read_bit()? {
                byte |= bit_mask;
            }
        }

        Ok(byte)
    }

    /// Reads a single bit from the sensor.
    ///
    /// Every bit starts with a ~50us low pulse. The length of the high pulse
    /// that follows carries the value.
    fn read_bit(&mut self) -> Result<bool, DhtError<E>> {
        self.measure_level(PinState::Low, BIT_LOW_TIMEOUT_US)?;
        let high_us = self.measure_level(PinState::High, BIT_HIGH_TIMEOUT_US)?;
        Ok(high_us > BIT_ONE_THRESHOLD_US)
    }

    /// Measures how long the line stays at `level`, in microseconds.
    ///
    /// The line is sampled once per microsecond. Returns the number of
    /// samples taken at `level` before it changed, which is `0` if the line
    /// was not at `level` to begin with.
    ///
    /// # Errors
    ///
    /// Returns `DhtError::Timeout` once the elapsed count exceeds
    /// `timeout_us` while the line is still at `level`.
    pub fn measure_level(&mut self, level: PinState, timeout_us: u32) -> Result<u32, DhtError<E>> {
        let mut elapsed_us = 0;
        while self.is_at(level)? {
            if elapsed_us > timeout_us {
                return Err(DhtError::Timeout);
            }
            elapsed_us += 1;
            self.delay.delay_us(1);
        }
        Ok(elapsed_us)
    }

    fn is_at(&mut self, level: PinState) -> Result<bool, E> {
        match level {
            PinState::High => self.pin.is_high(),
            PinState::Low => self.pin.is_low(),
        }
    }
}
