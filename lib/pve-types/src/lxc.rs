//! LXC container API types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drive::DriveConfig;
use crate::parse;

/// Highest mountpoint index PVE accepts (`mp0`..`mp255`).
pub const MAX_MOUNTPOINTS: u32 = 256;

/// One entry of the per node container index (`GET /nodes/{node}/lxc`).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LxcEntry {
    /// The VMID.
    #[serde(deserialize_with = "vmid_permissive")]
    pub vmid: u32,
    /// The container name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current status (`running`, `stopped`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of CPUs.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<f64>,
    /// Current memory usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Configured memory in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Root disk size in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// Whether this is a template.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// the lxc index historically returns the vmid as a string
fn vmid_permissive<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    use serde::de::Error as _;
    match parse::deserialize_u64(deserializer)? {
        Some(vmid) => u32::try_from(vmid).map_err(|_| D::Error::custom("vmid out of range")),
        None => Err(D::Error::custom("missing vmid")),
    }
}

/// Response of `GET /nodes/{node}/lxc/{vmid}/status/current`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CtStatus {
    /// Current status (`running`, `stopped`).
    pub status: String,
    /// The container name.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Current memory usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Configured memory in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CtStatus {
    /// Whether the container is running.
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

/// An immutable snapshot of a container configuration
/// (`GET /nodes/{node}/lxc/{vmid}/config`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct LxcConfig {
    /// The container hostname.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// The OS template type, e.g. `debian`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostype: Option<String>,
    /// The container architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Configured memory in MiB.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// Configured swap in MiB.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<i64>,
    /// Number of cores.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<i64>,
    /// The root filesystem descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<String>,
    /// Whether the container is unprivileged.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprivileged: Option<bool>,
    /// Config digest, to be passed back for race free updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LxcConfig {
    /// The raw descriptor of one mountpoint slot (`mp0`..), if configured.
    pub fn mountpoint(&self, index: u32) -> Option<&str> {
        self.extra
            .get(&format!("mp{index}"))
            .and_then(Value::as_str)
    }

    /// All configured volumes, decoded: `rootfs` first, then
    /// mountpoints in ascending slot order.
    pub fn volumes(&self) -> Vec<(String, DriveConfig)> {
        let mut volumes = Vec::new();
        if let Some(rootfs) = &self.rootfs {
            volumes.push(("rootfs".to_string(), DriveConfig::parse(rootfs)));
        }
        for index in 0..MAX_MOUNTPOINTS {
            if let Some(raw) = self.mountpoint(index) {
                volumes.push((format!("mp{index}"), DriveConfig::parse(raw)));
            }
        }
        volumes
    }
}

/// Parameters for `PUT /nodes/{node}/lxc/{vmid}/config`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LxcConfigUpdate {
    /// New hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// New memory size in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// New swap size in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<i64>,
    /// New core count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<i64>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start at boot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboot: Option<bool>,
    /// Properties to delete, comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    /// Expected config digest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Further properties, e.g. mountpoint descriptors.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lxc_entry_string_vmid() {
        let entry: LxcEntry = serde_json::from_str(
            r#"{"vmid": "101", "name": "ct1", "status": "running", "uptime": 3600}"#,
        )
        .unwrap();
        assert_eq!(entry.vmid, 101);

        let entry: LxcEntry = serde_json::from_str(r#"{"vmid": 102}"#).unwrap();
        assert_eq!(entry.vmid, 102);
    }

    #[test]
    fn volumes_rootfs_first_then_mountpoints() {
        let config: LxcConfig = serde_json::from_str(
            r#"{
                "hostname": "ct1",
                "rootfs": "local-zfs:subvol-101-disk-0,size=8G",
                "mp3": "local-zfs:subvol-101-disk-2,mp=/srv,size=4G",
                "mp0": "local-zfs:subvol-101-disk-1,mp=/data,backup=1,size=16G",
                "net0": "name=eth0,bridge=vmbr0"
            }"#,
        )
        .unwrap();

        let volumes = config.volumes();
        let keys: Vec<&str> = volumes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["rootfs", "mp0", "mp3"]);

        let (_, rootfs) = &volumes[0];
        assert_eq!(rootfs.storage(), Some("local-zfs"));
        assert_eq!(rootfs.size(), Some("8G"));

        let (_, mp0) = &volumes[1];
        assert_eq!(mp0.option("mp"), Some("/data"));
        assert_eq!(mp0.option("backup"), Some("1"));
    }

    #[test]
    fn volumes_empty_without_rootfs() {
        let config: LxcConfig = serde_json::from_str(r#"{"hostname": "bare"}"#).unwrap();
        assert!(config.volumes().is_empty());
    }
}
