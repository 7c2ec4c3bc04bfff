//! Bluetooth Module
//!
//! BLE central binding for the Zaparoo token reader.
//!
//! ## Modules
//!
//! - [`scanner`] - reader discovery by hardware address
//! - [`connection`] - connect, service/characteristic resolution, subscribe
//! - [`service`] - main coordinator driving the reader lifecycle

pub mod connection;
pub mod scanner;
pub mod service;

// Re-export main service for convenience
pub use service::BluetoothService;
