//! Storage API types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse;

/// One entry of `GET /nodes/{node}/storage`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StorageEntry {
    /// The storage pool name.
    pub storage: String,
    /// The storage backend type (`dir`, `lvmthin`, `zfspool`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Allowed content types, comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether the storage is active on this node.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Whether the storage is enabled in the datacenter config.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether the storage is shared between nodes.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Total bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Used bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    /// Available bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avail: Option<u64>,
    /// Used fraction (0..1).
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_fraction: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Response of `GET /nodes/{node}/storage/{storage}/status`.
///
/// Same shape as [`StorageEntry`] minus the name, which is part of the
/// request path.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StorageStatus {
    /// The storage backend type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Allowed content types, comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether the storage is active on this node.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Whether the storage is enabled.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether the storage is shared.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Total bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Used bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    /// Available bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avail: Option<u64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of `GET /nodes/{node}/storage/{storage}/content`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct VolumeEntry {
    /// The full volume identifier, e.g. `local-lvm:vm-100-disk-0`.
    pub volid: String,
    /// The content type (`images`, `iso`, `backup`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The volume format (`raw`, `qcow2`, `subvol`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// The volume size in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Actually used bytes, for thin provisioned volumes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    /// The owning guest.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u64>,
    /// Creation time, epoch seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<i64>,
    /// Volume notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_entry_bool_forms() {
        let entry: StorageEntry = serde_json::from_str(
            r#"{"storage": "local-lvm", "type": "lvmthin", "active": 1, "enabled": "1",
                "shared": 0, "total": 500107862016, "used": "107862016",
                "content": "images,rootdir"}"#,
        )
        .unwrap();
        assert_eq!(entry.active, Some(true));
        assert_eq!(entry.shared, Some(false));
        assert_eq!(entry.used, Some(107862016));
        assert_eq!(entry.ty.as_deref(), Some("lvmthin"));
    }

    #[test]
    fn volume_entry_with_owner() {
        let volume: VolumeEntry = serde_json::from_str(
            r#"{"volid": "local-lvm:vm-100-disk-0", "content": "images",
                "format": "raw", "size": 34359738368, "vmid": "100"}"#,
        )
        .unwrap();
        assert_eq!(volume.vmid, Some(100));
        assert_eq!(volume.size, Some(34359738368));
    }
}
