use core::fmt;

use crate::dht11::Reading;

/// Possible errors from the DHT11 driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// Timed out waiting for a pin state change.
    Timeout,
    /// Checksum did not match the received data.
    ChecksumMismatch,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

/// Result of one complete read attempt.
pub type ReadOutcome<E> = Result<Reading, DhtError<E>>;

impl<E> DhtError<E> {
    /// Short human-readable description of the failure.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            DhtError::Timeout => "Sensor Timeout",
            DhtError::ChecksumMismatch => "Checksum error",
            DhtError::PinError(_) => "GPIO pin error",
        }
    }
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diagnostic())
    }
}

/// Emits a diagnostic for a failed read through the logging sink.
///
/// Successful reads produce no output. Without the `defmt` feature this is a
/// no-op, so callers can report unconditionally.
pub fn report<E>(outcome: &ReadOutcome<E>) {
    match outcome {
        Ok(_reading) => {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "DHT11: {}% RH, {} C",
                _reading.humidity,
                _reading.temperature
            );
        }
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::error!("DHT11: {}", _err.diagnostic());
        }
    }
}
