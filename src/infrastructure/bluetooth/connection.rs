//! BLE Connection Module
//!
//! Connects to the matched reader and resolves the token service and
//! notify characteristic by UUID.

use anyhow::{Context, Result};
use btleplug::api::{Characteristic, Peripheral as _, Service};
use btleplug::platform::Peripheral;
use tracing::info;
use uuid::Uuid;

pub struct BleConnection {
    service_uuid: Uuid,
    characteristic_uuid: Uuid,
}

impl BleConnection {
    pub fn new(service_uuid: Uuid, characteristic_uuid: Uuid) -> Self {
        Self {
            service_uuid,
            characteristic_uuid,
        }
    }

    /// Connect, discover, and subscribe. Every step is fatal on error; the
    /// caller gets the notify characteristic back for filtering the
    /// notification stream.
    pub async fn establish(&self, peripheral: &Peripheral) -> Result<Characteristic> {
        peripheral.connect().await.context("connect to token reader")?;
        info!("Connected to {}", peripheral.address());

        peripheral
            .discover_services()
            .await
            .context("discover services")?;

        let services: Vec<Service> = peripheral.services().into_iter().collect();
        let service = find_service(&services, self.service_uuid)
            .context("token service not found on reader")?;
        info!("Found token service {}", service.uuid);

        let characteristic = find_characteristic(&service, self.characteristic_uuid)
            .context("token characteristic not found on reader")?;
        info!("Found token characteristic {}", characteristic.uuid);

        peripheral
            .subscribe(&characteristic)
            .await
            .context("subscribe to token notifications")?;

        Ok(characteristic)
    }
}

/// First returned match wins, mirroring the reader's single-service layout.
fn find_service(services: &[Service], uuid: Uuid) -> Option<Service> {
    services.iter().find(|s| s.uuid == uuid).cloned()
}

fn find_characteristic(service: &Service, uuid: Uuid) -> Option<Characteristic> {
    service
        .characteristics
        .iter()
        .find(|c| c.uuid == uuid)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use btleplug::api::CharPropFlags;
    use std::collections::BTreeSet;

    const SERVICE: Uuid = Uuid::from_u128(0xCE00299E_EA4B_4BB6_B631_A93F4F16E71B);
    const CHARACTERISTIC: Uuid = Uuid::from_u128(0x8CD024AE_4EA5_4F06_9836_D5CA72976A40);

    fn characteristic(uuid: Uuid, service_uuid: Uuid) -> Characteristic {
        Characteristic {
            uuid,
            service_uuid,
            properties: CharPropFlags::NOTIFY,
            descriptors: BTreeSet::new(),
        }
    }

    fn service(uuid: Uuid, characteristics: Vec<Characteristic>) -> Service {
        Service {
            uuid,
            primary: true,
            characteristics: characteristics.into_iter().collect(),
        }
    }

    #[test]
    fn test_empty_discovery_yields_no_service() {
        assert!(find_service(&[], SERVICE).is_none());
    }

    #[test]
    fn test_unrelated_services_yield_no_match() {
        let services = vec![service(Uuid::from_u128(0x1234), Vec::new())];
        assert!(find_service(&services, SERVICE).is_none());
    }

    #[test]
    fn test_service_found_among_several() {
        let services = vec![
            service(Uuid::from_u128(0x1800), Vec::new()),
            service(SERVICE, vec![characteristic(CHARACTERISTIC, SERVICE)]),
        ];
        let found = find_service(&services, SERVICE).unwrap();
        assert_eq!(found.uuid, SERVICE);
    }

    #[test]
    fn test_characteristic_lookup() {
        let svc = service(
            SERVICE,
            vec![
                characteristic(Uuid::from_u128(0x2A00), SERVICE),
                characteristic(CHARACTERISTIC, SERVICE),
            ],
        );
        let found = find_characteristic(&svc, CHARACTERISTIC).unwrap();
        assert_eq!(found.uuid, CHARACTERISTIC);
        assert!(find_characteristic(&svc, Uuid::from_u128(0x9999)).is_none());
    }
}
