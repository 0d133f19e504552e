//! Types shared between QEMU VMs and LXC containers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse;

/// One entry of a guest snapshot listing.
///
/// The listing always contains a synthetic `current` entry marking the
/// present state ("You are here!").
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SnapshotEntry {
    /// The snapshot name.
    pub name: String,
    /// The snapshot description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time, epoch seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snaptime: Option<i64>,
    /// The parent snapshot name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Whether the snapshot includes RAM (VMs only).
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmstate: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SnapshotEntry {
    /// Whether this is the synthetic `current` entry.
    pub fn is_current(&self) -> bool {
        self.name == "current"
    }
}

/// Response of a `vncproxy` call.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct VncProxy {
    /// The one time VNC ticket.
    pub ticket: String,
    /// The proxy port on the node.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// The user the ticket was issued for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// The node certificate to pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    /// The task identifier of the proxy worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upid: Option<String>,
    /// The generated one time password, if requested.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_listing() {
        let snapshots: Vec<SnapshotEntry> = serde_json::from_str(
            r#"[
                {"name": "pre-upgrade", "snaptime": 1720000000, "description": "before v9", "vmstate": 0},
                {"name": "current", "description": "You are here!", "parent": "pre-upgrade", "running": 1}
            ]"#,
        )
        .unwrap();
        assert!(!snapshots[0].is_current());
        assert_eq!(snapshots[0].vmstate, Some(false));
        assert!(snapshots[1].is_current());
        assert_eq!(snapshots[1].parent.as_deref(), Some("pre-upgrade"));
    }

    #[test]
    fn vncproxy_port_forms() {
        let proxy: VncProxy = serde_json::from_str(
            r#"{"ticket": "PVEVNC:abc", "port": 5900, "user": "root@pam"}"#,
        )
        .unwrap();
        assert_eq!(proxy.port.as_deref(), Some("5900"));

        let proxy: VncProxy =
            serde_json::from_str(r#"{"ticket": "PVEVNC:abc", "port": "5901"}"#).unwrap();
        assert_eq!(proxy.port.as_deref(), Some("5901"));
    }
}
