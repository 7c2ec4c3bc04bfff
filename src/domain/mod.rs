//! Domain Layer
//!
//! Pure types and logic with no I/O: the JSON-RPC launch envelope and the
//! bridge configuration.

pub mod rpc;
pub mod settings;
