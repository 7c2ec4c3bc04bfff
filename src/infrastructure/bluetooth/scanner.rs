//! BLE Scanner Module
//!
//! Discovers the token reader peripheral by hardware address.

use anyhow::{Context, Result};
use btleplug::api::{Central, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Peripheral};
use futures::StreamExt;
use tracing::{debug, info};

/// Scans until a peripheral matching one of the configured reader addresses
/// appears. First match wins; there is no preference between addresses.
pub struct BleScanner {
    adapter: Adapter,
    targets: Vec<String>,
}

impl BleScanner {
    /// `targets` must already be normalized to uppercase.
    pub fn new(adapter: Adapter, targets: Vec<String>) -> Self {
        Self { adapter, targets }
    }

    /// Block until a target reader is discovered, then stop the scan and
    /// return its handle.
    ///
    /// There is no timeout: with no reader in range this runs until the
    /// process is killed.
    pub async fn find_target(&self) -> Result<Peripheral> {
        let mut events = self
            .adapter
            .events()
            .await
            .context("subscribe to adapter events")?;
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .context("start BLE scan")?;
        info!("Scanning for token reader...");

        while let Some(event) = events.next().await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                _ => continue,
            };
            let Ok(peripheral) = self.adapter.peripheral(&id).await else {
                continue;
            };
            let Ok(Some(properties)) = peripheral.properties().await else {
                continue;
            };

            let address = properties.address.to_string().to_uppercase();
            if !is_target(&address, &self.targets) {
                debug!("Ignoring peripheral {}", address);
                continue;
            }

            info!("Found token reader at {}", address);
            self.adapter.stop_scan().await.context("stop BLE scan")?;
            return Ok(peripheral);
        }

        anyhow::bail!("adapter event stream ended before a reader was found")
    }
}

/// Address filter for scan results. Non-matching results must trigger
/// neither a scan stop nor a connection attempt.
fn is_target(address: &str, targets: &[String]) -> bool {
    targets.iter().any(|t| t.eq_ignore_ascii_case(address))
}
