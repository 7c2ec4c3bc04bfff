use btleplug::api::BDAddr;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid UUID {value:?}: {source}")]
    InvalidUuid {
        value: String,
        source: uuid::Error,
    },
    #[error("invalid reader address {0:?}")]
    InvalidAddress(String),
    #[error("no reader addresses configured")]
    NoAddresses,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            ansi_colors: default_true(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "zaparoo_ble_bridge".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Hardware addresses of readers this bridge will connect to.
    #[serde(default = "default_reader_addresses")]
    pub reader_addresses: Vec<String>,
    #[serde(default = "default_service_uuid")]
    pub service_uuid: String,
    #[serde(default = "default_characteristic_uuid")]
    pub characteristic_uuid: String,
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    #[serde(default)]
    pub log_settings: LogSettings,
}

fn default_reader_addresses() -> Vec<String> {
    vec![
        "24:EC:4A:2A:D2:59".to_string(),
        "64:E8:33:86:3A:92".to_string(),
    ]
}
fn default_service_uuid() -> String {
    "CE00299E-EA4B-4BB6-B631-A93F4F16E71B".to_string()
}
fn default_characteristic_uuid() -> String {
    "8CD024AE-4EA5-4F06-9836-D5CA72976A40".to_string()
}
fn default_websocket_url() -> String {
    "ws://127.0.0.1:7497/".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reader_addresses: default_reader_addresses(),
            service_uuid: default_service_uuid(),
            characteristic_uuid: default_characteristic_uuid(),
            websocket_url: default_websocket_url(),
            log_settings: LogSettings::default(),
        }
    }
}

/// Validated runtime configuration. Addresses are normalized to uppercase,
/// UUIDs parsed. A malformed UUID aborts startup rather than leaving the
/// bridge scanning for a device that can never match.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub reader_addresses: Vec<String>,
    pub service_uuid: Uuid,
    pub characteristic_uuid: Uuid,
    pub websocket_url: String,
}

impl Settings {
    pub fn validate(&self) -> Result<RelayConfig, SettingsError> {
        if self.reader_addresses.is_empty() {
            return Err(SettingsError::NoAddresses);
        }

        let mut reader_addresses = Vec::with_capacity(self.reader_addresses.len());
        for address in &self.reader_addresses {
            BDAddr::from_str(address)
                .map_err(|_| SettingsError::InvalidAddress(address.clone()))?;
            reader_addresses.push(address.to_uppercase());
        }

        Ok(RelayConfig {
            reader_addresses,
            service_uuid: parse_uuid(&self.service_uuid)?,
            characteristic_uuid: parse_uuid(&self.characteristic_uuid)?,
            websocket_url: self.websocket_url.clone(),
        })
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, SettingsError> {
    Uuid::parse_str(value).map_err(|source| SettingsError::InvalidUuid {
        value: value.to_string(),
        source,
    })
}

/// Loads settings from the platform config directory, creating the file with
/// defaults on first run.
pub struct SettingsService {
    settings: Settings,
}

impl SettingsService {
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        let settings = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            let settings = Settings::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, serde_json::to_string_pretty(&settings)?)?;
            settings
        };

        Ok(Self { settings })
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zaparoo-ble-bridge")
            .join("settings.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let config = Settings::default().validate().unwrap();
        assert_eq!(config.reader_addresses.len(), 2);
        assert_eq!(config.reader_addresses[0], "24:EC:4A:2A:D2:59");
        assert_eq!(
            config.service_uuid,
            Uuid::parse_str("CE00299E-EA4B-4BB6-B631-A93F4F16E71B").unwrap()
        );
    }

    #[test]
    fn test_malformed_service_uuid_is_rejected() {
        let settings = Settings {
            service_uuid: "not-a-uuid".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidUuid { .. })
        ));
    }

    #[test]
    fn test_malformed_address_is_rejected() {
        let settings = Settings {
            reader_addresses: vec!["zz:zz:zz".to_string()],
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_empty_address_list_is_rejected() {
        let settings = Settings {
            reader_addresses: Vec::new(),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::NoAddresses)));
    }

    #[test]
    fn test_addresses_are_normalized_to_uppercase() {
        let settings = Settings {
            reader_addresses: vec!["24:ec:4a:2a:d2:59".to_string()],
            ..Settings::default()
        };
        let config = settings.validate().unwrap();
        assert_eq!(config.reader_addresses, vec!["24:EC:4A:2A:D2:59"]);
    }
}
