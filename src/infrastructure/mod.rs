//! Infrastructure Layer
//!
//! I/O-facing modules: logging setup, the websocket client, and the BLE
//! reader binding.

pub mod bluetooth;
pub mod logging;
pub mod websocket;
