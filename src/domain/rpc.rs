//! JSON-RPC Launch Requests
//!
//! Builds the JSON-RPC 2.0 envelope sent to the Zaparoo core for every token
//! notification received from the reader.

use serde::Serialize;
use uuid::Uuid;

/// Protocol version field, fixed by JSON-RPC 2.0.
pub const JSONRPC_VERSION: &str = "2.0";

/// The single method this bridge ever calls.
pub const LAUNCH_METHOD: &str = "launch";

#[derive(Debug, Clone, Serialize)]
pub struct LaunchParams {
    /// Token text as scanned by the reader.
    pub text: String,
    /// Token hardware UID; the BLE reader does not report one.
    pub uuid: String,
}

/// One outbound `launch` call. Ephemeral: serialized and written to the
/// socket, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'static str,
    pub params: LaunchParams,
}

impl LaunchRequest {
    /// Build a launch request for a raw notification payload.
    ///
    /// The payload is interpreted as UTF-8 text; invalid sequences are
    /// replaced so any byte sequence yields a valid request. The id is a
    /// fresh random v4 UUID in canonical hyphenated form.
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Uuid::new_v4().to_string(),
            method: LAUNCH_METHOD,
            params: LaunchParams {
                text: String::from_utf8_lossy(payload).into_owned(),
                uuid: String::new(),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
