mod domain;
mod infrastructure;
mod relay;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::BluetoothService;
use crate::infrastructure::logging;
use crate::infrastructure::websocket::WsClient;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = SettingsService::load()?;
    let _logging_guard = logging::init_logger(&settings.get().log_settings)?;
    info!("Starting Zaparoo BLE bridge");

    let config = settings.get().validate()?;

    // The socket must be writable before the first notification can arrive.
    let socket = WsClient::connect(&config.websocket_url).await?;

    let (payload_tx, payload_rx) = mpsc::unbounded_channel();
    tokio::spawn(relay::run(payload_rx, socket));

    let bluetooth = BluetoothService::new(config, payload_tx);
    bluetooth.run().await?;

    // No reconnection path; stay up for the websocket tasks until killed.
    std::future::pending::<()>().await;
    Ok(())
}
