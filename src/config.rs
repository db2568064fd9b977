//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! All transport and sensor parameters live in one immutable [`Config`]
//! value handed to `SensorSession::open`, so nothing about the serial
//! link is mutated globally after startup.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub sensor: SensorConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Read timeout applied uniformly to every transport read
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Sensor protocol configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    /// MODBUS slave address the start command is sent to
    #[serde(default = "default_slave_address")]
    pub slave_address: u8,

    /// Register written once at open to begin streaming
    #[serde(default = "default_start_register")]
    pub start_register: u16,

    /// Value written to the start register
    #[serde(default = "default_start_value")]
    pub start_value: u16,

    /// Number of raw samples averaged into the zero offset
    #[serde(default = "default_zero_samples")]
    pub zero_samples: u32,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 19200 }
fn default_timeout_ms() -> u64 { 1000 }

fn default_slave_address() -> u8 { 9 }
fn default_start_register() -> u16 { 410 }
fn default_start_value() -> u16 { 0x0200 }
fn default_zero_samples() -> u32 { 100 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            slave_address: default_slave_address(),
            start_register: default_start_register(),
            start_value: default_start_value(),
            zero_samples: default_zero_samples(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ft300_stream::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::Ft300Error::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if ![9600, 19200, 38400, 57600, 115200].contains(&self.serial.baud_rate) {
            return Err(crate::error::Ft300Error::Config(
                toml::de::Error::custom("baud_rate must be one of: 9600, 19200, 38400, 57600, 115200")
            ));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(crate::error::Ft300Error::Config(
                toml::de::Error::custom("timeout_ms must be between 1 and 10000")
            ));
        }

        // MODBUS slave addresses: 1-247 (0 is broadcast, 248-255 reserved)
        if self.sensor.slave_address == 0 || self.sensor.slave_address > 247 {
            return Err(crate::error::Ft300Error::Config(
                toml::de::Error::custom("slave_address must be between 1 and 247")
            ));
        }

        if self.sensor.zero_samples == 0 || self.sensor.zero_samples > 10000 {
            return Err(crate::error::Ft300Error::Config(
                toml::de::Error::custom("zero_samples must be between 1 and 10000")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 19200);
        assert_eq!(default_timeout_ms(), 1000);
        assert_eq!(default_slave_address(), 9);
        assert_eq!(default_start_register(), 410);
        assert_eq!(default_start_value(), 0x0200);
        assert_eq!(default_zero_samples(), 100);
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420_000; // Not a rate the sensor speaks
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &[9600, 19200, 38400, 57600, 115200] {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_timeout_ms_zero() {
        let mut config = Config::default();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_ms_too_high() {
        let mut config = Config::default();
        config.serial.timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slave_address_zero() {
        let mut config = Config::default();
        config.sensor.slave_address = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slave_address_reserved() {
        let mut config = Config::default();
        config.sensor.slave_address = 248;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_samples_zero() {
        let mut config = Config::default();
        config.sensor.zero_samples = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_samples_too_high() {
        let mut config = Config::default();
        config.sensor.zero_samples = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyUSB1"
timeout_ms = 500

[sensor]
zero_samples = 50
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.timeout_ms, 500);
        assert_eq!(config.serial.baud_rate, 19200); // default fills the gap
        assert_eq!(config.sensor.zero_samples, 50);
        assert_eq!(config.sensor.slave_address, 9);
    }

    #[test]
    fn test_load_empty_sections() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[serial]\n\n[sensor]\n").unwrap();
        temp_file.flush().unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[serial]\ntimeout_ms = 0\n").unwrap();
        temp_file.flush().unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }
}
