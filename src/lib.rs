//! # FT300 Stream Library
//!
//! Stream calibrated force/torque samples from a Robotiq FT300 sensor
//! over a serial link.
//!
//! This library provides the core functionality for consuming the
//! sensor's continuous telemetry stream: frame synchronization on the
//! start marker, CRC-16/MODBUS validated deframing, fixed-point decoding
//! of the six channels, and zero-offset calibration, all behind a small
//! session API (`open` / `read_sample` / `close`).

pub mod calibration;
pub mod config;
pub mod error;
pub mod protocol;
pub mod serial;
pub mod session;
