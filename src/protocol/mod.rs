//! # Streaming Protocol Module
//!
//! Implementation of the FT300 force/torque streaming protocol.
//!
//! This module handles:
//! - Frame synchronization on the 0x20 0x4E start marker
//! - CRC-16/MODBUS checksum calculation and verification
//! - Fixed-point decoding of the six measurement channels
//! - Frame encoding for tests and sensor simulation
//! - The MODBUS RTU start command issued once at session open

pub mod command;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod frame;
