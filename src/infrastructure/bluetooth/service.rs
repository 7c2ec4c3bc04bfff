//! Bluetooth Service Module
//!
//! Main coordinator for the reader lifecycle: enable the stack, scan,
//! connect, subscribe, then forward every notification payload to the relay.

use crate::domain::settings::RelayConfig;
use crate::infrastructure::bluetooth::{connection::BleConnection, scanner::BleScanner};
use anyhow::{Context, Result};
use btleplug::api::{Central, Manager as _, Peripheral as _};
use btleplug::platform::Manager;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct BluetoothService {
    config: RelayConfig,
    payload_sender: mpsc::UnboundedSender<Vec<u8>>,
}

impl BluetoothService {
    /// Notification payloads are pushed into `payload_sender`; delivery
    /// order follows the reader's notification order.
    pub fn new(config: RelayConfig, payload_sender: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self {
            config,
            payload_sender,
        }
    }

    /// Drive the full reader lifecycle. Setup errors are fatal and bubble
    /// up; once subscribed this only returns if the notification stream or
    /// the relay channel closes.
    pub async fn run(&self) -> Result<()> {
        let manager = Manager::new().await.context("enable BLE stack")?;
        let adapters = manager.adapters().await.context("list BLE adapters")?;
        let adapter = adapters
            .into_iter()
            .next()
            .context("no BLE adapter available")?;
        if let Ok(adapter_info) = adapter.adapter_info().await {
            info!("Using adapter: {}", adapter_info);
        }

        let scanner = BleScanner::new(adapter, self.config.reader_addresses.clone());
        let peripheral = scanner.find_target().await?;

        let connection = BleConnection::new(
            self.config.service_uuid,
            self.config.characteristic_uuid,
        );
        let characteristic = connection.establish(&peripheral).await?;

        let mut notifications = peripheral
            .notifications()
            .await
            .context("open notification stream")?;
        info!("Relaying token notifications");

        while let Some(notification) = notifications.next().await {
            if notification.uuid != characteristic.uuid {
                continue;
            }
            debug!("Notification: {} bytes", notification.value.len());
            if self.payload_sender.send(notification.value).is_err() {
                warn!("Relay channel closed, dropping notifications");
                break;
            }
        }

        warn!("Notification stream ended (reader disconnected?)");
        Ok(())
    }
}
