//! BLE implementation for Neewer RGB lights using btleplug.
//!
//! btleplug is async-only, while the capture protocol is strictly sequential, so
//! every handle owns (a share of) a current-thread tokio runtime and blocks on it.

use std::sync::Arc;

use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use uuid::{uuid, Uuid};

use crate::light::command::LightCommand;
use crate::light::controller::{advertisement_matches, LightControl, LightScanner, ScanOptions};
use crate::light::error::{LightError, LightResult};

/// Manufacturer identifier carried in the light's advertisement data.
pub const NEEWER_MANUFACTURER_ID: u16 = 52977;

const SET_LIGHT_SERVICE_UUID: Uuid = uuid!("69400001-b5a3-f393-e0a9-e50e24dcca99");
const SET_LIGHT_CHARACTERISTIC_UUID: Uuid = uuid!("69400002-b5a3-f393-e0a9-e50e24dcca99");

fn transport(e: btleplug::Error) -> LightError {
    LightError::Transport(e.to_string())
}

pub struct NeewerScanner {
    runtime: Arc<Runtime>,
}

impl NeewerScanner {
    pub fn new() -> LightResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LightError::Transport(e.to_string()))?;
        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }
}

impl LightScanner for NeewerScanner {
    type Light = NeewerLight;

    fn connect(&mut self, options: &ScanOptions) -> LightResult<NeewerLight> {
        let runtime = Arc::clone(&self.runtime);
        let peripheral = runtime.block_on(scan_for_light(options))?;
        info!(address = %peripheral.address(), "Found Neewer light");
        Ok(NeewerLight {
            runtime,
            peripheral,
            characteristic: None,
        })
    }
}

async fn scan_for_light(options: &ScanOptions) -> LightResult<Peripheral> {
    let manager = Manager::new().await.map_err(transport)?;
    let adapter = manager
        .adapters()
        .await
        .map_err(transport)?
        .into_iter()
        .next()
        .ok_or(LightError::NoAdapter)?;

    let mut events = adapter.events().await.map_err(transport)?;
    adapter
        .start_scan(ScanFilter::default())
        .await
        .map_err(transport)?;
    info!(window_ms = options.scan_window.as_millis() as u64, "Scan started");

    let found = tokio::time::timeout(options.scan_window, async {
        while let Some(event) = events.next().await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id)
                | CentralEvent::DeviceUpdated(id)
                | CentralEvent::ManufacturerDataAdvertisement { id, .. } => id,
                _ => continue,
            };
            let Ok(peripheral) = adapter.peripheral(&id).await else {
                continue;
            };
            if peripheral_matches(&peripheral, options).await {
                return Some(peripheral);
            }
        }
        None
    })
    .await
    .ok()
    .flatten();

    stop_scan(&adapter).await;
    found.ok_or(LightError::DeviceNotFound)
}

async fn peripheral_matches(peripheral: &Peripheral, options: &ScanOptions) -> bool {
    let properties = match peripheral.properties().await {
        Ok(Some(properties)) => properties,
        _ => return false,
    };
    let address = properties.address.to_string();
    debug!(%address, name = ?properties.local_name, "Found peripheral");
    advertisement_matches(
        &address,
        properties.manufacturer_data.keys().copied(),
        options,
    )
}

async fn stop_scan(adapter: &Adapter) {
    match adapter.stop_scan().await {
        Ok(()) => info!("Scan complete"),
        Err(e) => warn!("Failed to stop scan: {}", e),
    }
}

/// A discovered light. Disconnects on drop.
pub struct NeewerLight {
    runtime: Arc<Runtime>,
    peripheral: Peripheral,
    characteristic: Option<Characteristic>,
}

impl NeewerLight {
    async fn ensure_connected(&mut self) -> LightResult<Characteristic> {
        if !self.peripheral.is_connected().await.map_err(transport)? {
            info!("Connecting");
            self.peripheral.connect().await.map_err(transport)?;
            self.characteristic = None;
        }

        if let Some(characteristic) = &self.characteristic {
            return Ok(characteristic.clone());
        }

        self.peripheral.discover_services().await.map_err(transport)?;
        let characteristic = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| {
                c.service_uuid == SET_LIGHT_SERVICE_UUID && c.uuid == SET_LIGHT_CHARACTERISTIC_UUID
            })
            .ok_or_else(|| {
                LightError::CharacteristicNotFound(SET_LIGHT_CHARACTERISTIC_UUID.to_string())
            })?;
        debug!("Found light characteristic within service");
        self.characteristic = Some(characteristic.clone());
        Ok(characteristic)
    }
}

impl LightControl for NeewerLight {
    fn set_color(&mut self, command: &LightCommand) -> LightResult<()> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(async {
            let characteristic = self.ensure_connected().await?;
            info!(
                hue = command.hue,
                saturation = command.saturation,
                brightness = command.brightness,
                "Setting light"
            );
            self.peripheral
                .write(&characteristic, &command.encode(), WriteType::WithResponse)
                .await
                .map_err(transport)
        })
    }

    fn disconnect(&mut self) -> LightResult<()> {
        let runtime = Arc::clone(&self.runtime);
        runtime.block_on(async {
            if self.peripheral.is_connected().await.map_err(transport)? {
                info!("Disconnecting");
                self.peripheral.disconnect().await.map_err(transport)?;
            }
            self.characteristic = None;
            Ok(())
        })
    }
}

impl Drop for NeewerLight {
    fn drop(&mut self) {
        if let Err(e) = self.disconnect() {
            warn!("Failed to disconnect light: {}", e);
        }
    }
}
