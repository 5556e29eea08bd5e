//! GATT profile identity
//!
//! Deployed client apps discover the logger by these exact values. Changing
//! any of them orphans every installed client, so they are frozen here in
//! one place rather than repeated per BLE backend.

/// Primary service UUID for the telemetry stream
pub const SERVICE_UUID: &str = "4fafc201-1fb5-459e-8fcc-c5c9c331914b";

/// Characteristic UUID carrying the record notifications
pub const CHARACTERISTIC_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26a8";

/// Advertised device name
pub const DEVICE_NAME: &str = "Current_Logger_ESP32C3";

/// Characteristic value before the first sample is published
pub const INITIAL_CHARACTERISTIC_VALUE: &str = "INA226 Data";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_canonical_form() {
        for uuid in [SERVICE_UUID, CHARACTERISTIC_UUID] {
            assert_eq!(uuid.len(), 36);
            assert_eq!(uuid, uuid.to_lowercase());
            let groups: Vec<&str> = uuid.split('-').collect();
            let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
            assert_eq!(lengths, [8, 4, 4, 4, 12]);
            assert!(groups
                .iter()
                .all(|g| g.chars().all(|c| c.is_ascii_hexdigit())));
        }
    }

    #[test]
    fn service_and_characteristic_differ() {
        assert_ne!(SERVICE_UUID, CHARACTERISTIC_UUID);
    }
}
