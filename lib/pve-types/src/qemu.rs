//! QEMU VM API types.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::drive::{DiskInterface, DriveConfig};
use crate::parse;

/// One entry of the per node VM index (`GET /nodes/{node}/qemu`).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct VmEntry {
    /// The VMID.
    pub vmid: u32,
    /// The guest name.
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
    /// Current config lock, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Response of `GET /nodes/{node}/qemu/{vmid}/status/current`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct VmStatus {
    /// Current status (`running`, `stopped`).
    pub status: String,
    /// The guest name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// QEMU monitor status, e.g. `running` or `paused`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qmpstatus: Option<String>,
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
    /// The QEMU process id, when running.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i64>,
    /// Whether the guest agent is configured.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VmStatus {
    /// Whether the VM is running.
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

/// An immutable snapshot of a VM configuration
/// (`GET /nodes/{node}/qemu/{vmid}/config`).
///
/// Drive slots (`ide0`..`sata5`), network devices and all other keyed
/// properties live in the `extra` map as raw strings; the drive
/// accessors decode them on demand. Callers wanting fresh data load a
/// new snapshot, nothing is cached behind their back.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct VmConfig {
    /// The guest name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Cores per socket.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<i64>,
    /// CPU sockets.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets: Option<i64>,
    /// Configured memory, in MiB or as a property string.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Guest OS type hint (`l26`, `win11`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostype: Option<String>,
    /// Boot order property string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<String>,
    /// Guest agent property string.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Whether this is a template.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<bool>,
    /// Config digest, to be passed back for race free updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VmConfig {
    /// The raw descriptor string of one drive slot, if configured.
    pub fn drive(&self, slot: &str) -> Option<&str> {
        self.extra.get(slot).and_then(Value::as_str)
    }

    /// All configured drives, decoded, in bus order (ide, scsi,
    /// virtio, sata) and ascending slot order within each bus.
    pub fn drives(&self) -> Vec<(String, DriveConfig)> {
        let mut drives = Vec::new();
        for interface in DiskInterface::ALL {
            for index in 0..interface.max_slots() {
                let slot = format!("{interface}{index}");
                if let Some(raw) = self.drive(&slot) {
                    drives.push((slot, DriveConfig::parse(raw)));
                }
            }
        }
        drives
    }

    /// The configured drive slot keys, the allocator's `occupied` set.
    pub fn occupied_slots(&self) -> HashSet<String> {
        self.extra
            .keys()
            .filter(|key| {
                matches!(
                    crate::drive::disk_kind(key),
                    crate::drive::DiskKind::VmDisk(_)
                )
            })
            .cloned()
            .collect()
    }

    /// Whether the guest agent option is enabled in the config.
    pub fn agent_enabled(&self) -> bool {
        match self.agent.as_deref() {
            Some(agent) => {
                let first = agent.split(',').next().unwrap_or("");
                first == "1" || first == "enabled=1"
            }
            None => false,
        }
    }
}

/// Parameters for `PUT /nodes/{node}/qemu/{vmid}/config`.
///
/// Any property not covered by a typed field goes into `extra`; drive
/// descriptors built by the codec are set that way.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VmConfigUpdate {
    /// New guest name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New core count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<i64>,
    /// New socket count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets: Option<i64>,
    /// New memory size in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start at boot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboot: Option<bool>,
    /// Properties to delete, comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    /// Expected config digest; the server rejects the update if the
    /// config changed since the snapshot this was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Further properties, e.g. drive or network descriptors.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Parameters for `POST /nodes/{node}/qemu/{vmid}/clone`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CloneOptions {
    /// The VMID for the clone.
    pub newid: u32,
    /// Name for the clone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Target node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Full clone instead of a linked one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<bool>,
    /// Target storage for a full clone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Description for the clone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resource pool to add the clone to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
}

/// A network interface as reported by the guest agent.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AgentInterface {
    /// The interface name inside the guest.
    pub name: String,
    /// The MAC address.
    #[serde(default, rename = "hardware-address")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_address: Option<String>,
    /// Assigned addresses.
    #[serde(default, rename = "ip-addresses")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<AgentIpAddress>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One address of an [`AgentInterface`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AgentIpAddress {
    /// The address.
    #[serde(rename = "ip-address")]
    pub ip_address: String,
    /// `ipv4` or `ipv6`.
    #[serde(default, rename = "ip-address-type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address_type: Option<String>,
    /// The prefix length.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<i64>,
}

/// OS information as reported by the guest agent.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AgentOsInfo {
    /// The OS id, e.g. `debian`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The OS name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The human readable name, e.g. `Debian GNU/Linux 12 (bookworm)`.
    #[serde(default, rename = "pretty-name")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
    /// The OS version string.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The OS version id.
    #[serde(default, rename = "version-id")]
    #[serde(deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// The running kernel release.
    #[serde(default, rename = "kernel-release")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_release: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A flattened guest address, derived from the agent interface listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuestIpAddress {
    /// The interface name inside the guest.
    pub interface: String,
    /// The address.
    pub ip: String,
    /// The interface MAC address.
    pub mac: Option<String>,
    /// `ipv4` or `ipv6`.
    pub ip_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> VmConfig {
        serde_json::from_str(
            r#"{
                "name": "web01",
                "cores": 4,
                "sockets": 1,
                "memory": 2048,
                "ostype": "l26",
                "agent": "1,fstrim_cloned_disks=1",
                "digest": "632c4cdbcdc0fa64b36e6cdb443c8b260ca43e1e",
                "scsi0": "local-lvm:vm-100-disk-0,size=32G,ssd=1",
                "scsi2": "local-lvm:vm-100-disk-1,size=8G",
                "ide2": "local:iso/debian-12.iso,media=cdrom",
                "virtio0": "tank:vm-100-disk-2,discard=on,size=100G",
                "net0": "virtio=BC:24:11:00:00:01,bridge=vmbr0"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn config_snapshot_fields() {
        let config = sample_config();
        assert_eq!(config.name.as_deref(), Some("web01"));
        assert_eq!(config.cores, Some(4));
        assert_eq!(config.memory.as_deref(), Some("2048"));
        assert!(config.agent_enabled());
        assert_eq!(
            config.drive("scsi0"),
            Some("local-lvm:vm-100-disk-0,size=32G,ssd=1")
        );
        assert_eq!(config.drive("scsi1"), None);
    }

    #[test]
    fn drives_are_listed_in_bus_order() {
        let config = sample_config();
        let drives = config.drives();
        let slots: Vec<&str> = drives.iter().map(|(slot, _)| slot.as_str()).collect();
        assert_eq!(slots, ["ide2", "scsi0", "scsi2", "virtio0"]);

        let (_, scsi0) = &drives[1];
        assert_eq!(scsi0.storage(), Some("local-lvm"));
        assert_eq!(scsi0.size(), Some("32G"));
    }

    #[test]
    fn occupied_slots_exclude_other_keys() {
        let occupied = sample_config().occupied_slots();
        assert!(occupied.contains("scsi0"));
        assert!(occupied.contains("ide2"));
        assert!(!occupied.contains("net0"));
        assert_eq!(occupied.len(), 4);
    }

    #[test]
    fn update_serializes_set_fields_only() {
        let update = VmConfigUpdate {
            memory: Some("4096".to_string()),
            delete: Some("ide2".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"memory": "4096", "delete": "ide2"})
        );
    }

    #[test]
    fn update_flattens_extra_properties() {
        let mut update = VmConfigUpdate::default();
        update
            .extra
            .insert("scsi1".to_string(), "local-lvm:32,ssd=1".to_string());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"scsi1": "local-lvm:32,ssd=1"}));
    }

    #[test]
    fn agent_interfaces_decode() {
        let interfaces: Vec<AgentInterface> = serde_json::from_str(
            r#"[{
                "name": "eth0",
                "hardware-address": "bc:24:11:00:00:01",
                "ip-addresses": [
                    {"ip-address": "10.0.0.5", "ip-address-type": "ipv4", "prefix": 24},
                    {"ip-address": "fe80::1", "ip-address-type": "ipv6", "prefix": 64}
                ]
            }]"#,
        )
        .unwrap();
        assert_eq!(interfaces[0].ip_addresses.len(), 2);
        assert_eq!(interfaces[0].ip_addresses[0].ip_address, "10.0.0.5");
        assert_eq!(
            interfaces[0].hardware_address.as_deref(),
            Some("bc:24:11:00:00:01")
        );
    }

    #[test]
    fn agent_not_enabled_variants() {
        let config: VmConfig = serde_json::from_str(r#"{"agent": "0"}"#).unwrap();
        assert!(!config.agent_enabled());
        let config: VmConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.agent_enabled());
        let config: VmConfig = serde_json::from_str(r#"{"agent": "enabled=1"}"#).unwrap();
        assert!(config.agent_enabled());
    }
}
