//! # Calibration Module
//!
//! Zero-offset calibration for the six measurement channels.
//!
//! The sensor reports a bias even when unloaded, so a session averages a
//! batch of raw readings right after connecting and subtracts that mean
//! from everything it returns afterwards.
//!
//! ## Usage
//!
//! ```
//! use ft300_stream::calibration::ZeroAccumulator;
//!
//! let mut acc = ZeroAccumulator::new();
//! acc.add(&[0.5, 0.5, 0.5, 0.1, 0.1, 0.1]);
//! acc.add(&[0.5, 0.5, 0.5, 0.1, 0.1, 0.1]);
//! let zero = acc.finish().unwrap();
//!
//! let sample = zero.apply(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
//! assert_eq!(sample, [0.5, 1.5, 2.5, 0.9, 1.9, 2.9]);
//! ```

use crate::error::{Ft300Error, Result};
use crate::protocol::decoder::{FtVector, NUM_CHANNELS};

/// Round to two decimal places, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-channel baseline subtracted from every raw reading
///
/// Computed once per session; immutable afterwards. Re-zeroing the sensor
/// means opening a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroOffset {
    offset: FtVector,
}

impl ZeroOffset {
    /// Wrap an already-computed offset vector
    #[must_use]
    pub fn from_offset(offset: FtVector) -> Self {
        Self { offset }
    }

    /// The per-channel baseline values
    #[must_use]
    pub fn offset(&self) -> &FtVector {
        &self.offset
    }

    /// Subtract the baseline from a raw reading
    ///
    /// Element-wise subtraction, each channel rounded to two decimal
    /// places. Pure: the same raw input always produces the same output.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw decoded force/torque vector
    ///
    /// # Returns
    ///
    /// Calibrated force/torque vector
    #[must_use]
    pub fn apply(&self, raw: &FtVector) -> FtVector {
        let mut calibrated = [0.0f64; NUM_CHANNELS];
        for i in 0..NUM_CHANNELS {
            calibrated[i] = round2(raw[i] - self.offset[i]);
        }
        calibrated
    }
}

/// Running element-wise sum used to build a [`ZeroOffset`]
#[derive(Debug)]
pub struct ZeroAccumulator {
    sum: FtVector,
    count: u32,
}

impl ZeroAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self {
            sum: [0.0; NUM_CHANNELS],
            count: 0,
        }
    }

    /// Fold one raw sample into the running sum
    pub fn add(&mut self, sample: &FtVector) {
        for i in 0..NUM_CHANNELS {
            self.sum[i] += sample[i];
        }
        self.count += 1;
    }

    /// Number of samples accumulated so far
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Average the accumulated samples into a [`ZeroOffset`]
    ///
    /// # Errors
    ///
    /// Returns [`Ft300Error::InvalidState`] if no samples were added.
    pub fn finish(self) -> Result<ZeroOffset> {
        if self.count == 0 {
            return Err(Ft300Error::InvalidState(
                "zero offset requires at least one sample",
            ));
        }

        let mut offset = [0.0f64; NUM_CHANNELS];
        for i in 0..NUM_CHANNELS {
            offset[i] = self.sum[i] / f64::from(self.count);
        }
        Ok(ZeroOffset { offset })
    }
}

impl Default for ZeroAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
