//! Cluster level API types.
//!
//! Each record carries the documented fields as typed members and keeps
//! everything else the server sent in an `extra` map, so newer server
//! versions never break deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse;

/// Response of `GET /version`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct VersionResponse {
    /// The full pve-manager version.
    pub version: String,
    /// The release line, e.g. `8.2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// The short git revision the release was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repoid: Option<String>,

    /// Fields we have no explicit member for.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of `GET /cluster/status`, tagged by `type`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClusterStatusEntry {
    /// Cluster wide summary entry.
    Cluster(ClusterInfo),
    /// Per member node entry.
    Node(ClusterNodeInfo),
}

/// Cluster summary within the cluster status listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClusterInfo {
    /// The cluster name.
    pub name: String,
    /// Status list entry id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Number of member nodes.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<i64>,
    /// Whether the cluster currently has quorum.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorate: Option<bool>,
    /// Corosync config version.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Node member within the cluster status listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClusterNodeInfo {
    /// The node name.
    pub name: String,
    /// Status list entry id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The node management IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Whether the node is online.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    /// Whether this is the node answering the request.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,
    /// Corosync node id.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodeid: Option<i64>,
    /// Subscription level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `type` filter accepted by `GET /cluster/resources`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterResourceKind {
    Vm,
    Storage,
    Node,
    Sdn,
}
serde_plain::derive_display_from_serialize!(ClusterResourceKind);
serde_plain::derive_fromstr_from_deserialize!(ClusterResourceKind);

/// One entry of `GET /cluster/resources`, tagged by `type`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClusterResource {
    Qemu(QemuResource),
    Lxc(LxcResource),
    Node(NodeResource),
    Storage(StorageResource),
    Pool(PoolResource),
    Sdn(SdnResource),
}

impl ClusterResource {
    /// The guest VMID, for VM and container resources.
    pub fn vmid(&self) -> Option<u32> {
        match self {
            ClusterResource::Qemu(r) => Some(r.vmid),
            ClusterResource::Lxc(r) => Some(r.vmid),
            _ => None,
        }
    }

    /// The name the resource is usually addressed by.
    pub fn name(&self) -> Option<&str> {
        match self {
            ClusterResource::Qemu(r) => r.name.as_deref(),
            ClusterResource::Lxc(r) => r.name.as_deref(),
            ClusterResource::Node(r) => Some(&r.node),
            ClusterResource::Storage(r) => Some(&r.storage),
            ClusterResource::Pool(r) => r.pool.as_deref(),
            ClusterResource::Sdn(r) => r.sdn.as_deref(),
        }
    }

    /// The node the resource lives on, if it is node bound.
    pub fn node(&self) -> Option<&str> {
        match self {
            ClusterResource::Qemu(r) => Some(&r.node),
            ClusterResource::Lxc(r) => Some(&r.node),
            ClusterResource::Node(r) => Some(&r.node),
            ClusterResource::Storage(r) => Some(&r.node),
            ClusterResource::Pool(_) => None,
            ClusterResource::Sdn(r) => r.node.as_deref(),
        }
    }
}

/// A QEMU VM in the cluster resource listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct QemuResource {
    /// The VMID.
    pub vmid: u32,
    /// The cluster node the VM is on.
    pub node: String,
    /// The guest name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current status (`running`, `stopped`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of CPUs.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<f64>,
    /// Current memory usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Configured memory in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Root disk usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
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
    /// Resource pool membership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A container in the cluster resource listing. Same shape as
/// [`QemuResource`], kept separate so the `type` tag stays explicit.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LxcResource {
    /// The VMID.
    pub vmid: u32,
    /// The cluster node the container is on.
    pub node: String,
    /// The guest name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current status (`running`, `stopped`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of CPUs.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<f64>,
    /// Current memory usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Configured memory in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Root disk usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
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
    /// Resource pool membership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A node in the cluster resource listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NodeResource {
    /// The node name.
    pub node: String,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of CPUs.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<f64>,
    /// Current memory usage in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Installed memory in bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// Subscription level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A storage in the cluster resource listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StorageResource {
    /// The storage pool name.
    pub storage: String,
    /// The node this entry describes the storage on.
    pub node: String,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Used bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Total bytes.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Allowed content types, comma separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Whether the storage is shared between nodes.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A resource pool in the cluster resource listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PoolResource {
    /// The pool id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// An SDN zone status in the cluster resource listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SdnResource {
    /// The zone or vnet name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdn: Option<String>,
    /// The node the status applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of `GET /cluster/backup`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BackupJob {
    /// The job id.
    pub id: String,
    /// The job schedule, e.g. `sun 01:00`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Target storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Whether the job is enabled.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Guests included in the job, comma separated VMIDs.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmid: Option<String>,
    /// Whether all guests are included.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    /// Compression (`zstd`, `lzo`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,
    /// Backup mode (`snapshot`, `suspend`, `stop`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters for creating or updating a backup job.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BackupJobUpdate {
    /// The job schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Target storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    /// Enable or disable the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Guests to include, comma separated VMIDs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmid: Option<String>,
    /// Include all guests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    /// Backup mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Compression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<String>,

    /// Any further job properties.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// One entry of `GET /cluster/ha/resources`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HaResource {
    /// The service id, e.g. `vm:100`.
    pub sid: String,
    /// The resource type (`vm`, `ct`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// The requested state (`started`, `stopped`, `disabled`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// The HA group the service is restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Maximum restart attempts on one node.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_restart: Option<i64>,
    /// Maximum relocate attempts.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_relocate: Option<i64>,
    /// Free form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Config digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters for creating or updating an HA resource.
#[derive(Clone, Debug, Default, Serialize)]
pub struct HaResourceUpdate {
    /// The requested state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// The HA group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Maximum restart attempts on one node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_restart: Option<i64>,
    /// Maximum relocate attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_relocate: Option<i64>,
    /// Free form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Properties to delete, comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    /// Expected config digest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Any further properties.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// One entry of `GET /cluster/ha/status/current`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HaStatusEntry {
    /// Status list entry id, e.g. `quorum` or `service:vm:100`.
    pub id: String,
    /// The entry type (`quorum`, `master`, `lrm`, `service`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Human readable status.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The node the entry refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Whether the cluster has quorum (quorum entry only).
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorate: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of `GET /cluster/firewall/rules`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FirewallRule {
    /// Position in the rule list.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<i64>,
    /// Rule direction (`in`, `out`) or `group`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// The action (`ACCEPT`, `DROP`, `REJECT`) or security group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Whether the rule is enabled.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    /// Source address filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Destination address filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Protocol filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
    /// Destination port filter.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dport: Option<String>,
    /// Source port filter.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    /// Free form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters for `POST /cluster/firewall/rules`. The direction and
/// action are mandatory on the wire.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FirewallRuleUpdate {
    /// Rule direction (`in`, `out`) or `group`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// The action (`ACCEPT`, `DROP`, `REJECT`) or security group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Whether the rule is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    /// Source address filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Destination address filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Protocol filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
    /// Destination port filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dport: Option<String>,
    /// Source port filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    /// Free form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Any further rule properties.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// One entry of `GET /cluster/replication`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReplicationJob {
    /// The job id, `{vmid}-{number}`.
    pub id: String,
    /// The job type (`local`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// The replicated guest.
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<u64>,
    /// The target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// The source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The job schedule in calendar event format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Bandwidth limit in MB/s.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    /// Whether the job is disabled.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    /// Free form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Parameters for creating or updating a replication job.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReplicationJobUpdate {
    /// The target node. Mandatory on creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// The job schedule in calendar event format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Bandwidth limit in MB/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    /// Disable the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    /// Free form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Properties to delete, comma separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
    /// Expected config digest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Any further job properties.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_status_tagging() {
        let entries: Vec<ClusterStatusEntry> = serde_json::from_str(
            r#"[
                {"type": "cluster", "name": "lab", "nodes": 3, "quorate": 1, "id": "cluster"},
                {"type": "node", "name": "pve1", "ip": "10.0.0.1", "online": 1, "local": 1, "nodeid": 1}
            ]"#,
        )
        .unwrap();

        match &entries[0] {
            ClusterStatusEntry::Cluster(c) => {
                assert_eq!(c.name, "lab");
                assert_eq!(c.nodes, Some(3));
                assert_eq!(c.quorate, Some(true));
            }
            other => panic!("expected cluster entry, got {other:?}"),
        }
        match &entries[1] {
            ClusterStatusEntry::Node(n) => {
                assert_eq!(n.name, "pve1");
                assert_eq!(n.ip.as_deref(), Some("10.0.0.1"));
                assert_eq!(n.local, Some(true));
            }
            other => panic!("expected node entry, got {other:?}"),
        }
    }

    #[test]
    fn cluster_resource_kinds() {
        let resources: Vec<ClusterResource> = serde_json::from_str(
            r#"[
                {"type": "qemu", "vmid": 100, "node": "pve1", "name": "web", "status": "running",
                 "mem": "1073741824", "maxmem": 2147483648, "template": 0, "lock": "backup"},
                {"type": "storage", "storage": "local-lvm", "node": "pve1", "maxdisk": 500, "disk": 100},
                {"type": "node", "node": "pve1", "status": "online", "uptime": 12345}
            ]"#,
        )
        .unwrap();

        match &resources[0] {
            ClusterResource::Qemu(vm) => {
                assert_eq!(vm.vmid, 100);
                assert_eq!(vm.mem, Some(1073741824));
                assert_eq!(vm.template, Some(false));
                // undocumented fields land in the fallback map
                assert_eq!(vm.extra["lock"], serde_json::json!("backup"));
            }
            other => panic!("expected qemu resource, got {other:?}"),
        }
        assert_eq!(resources[0].vmid(), Some(100));
        assert_eq!(resources[1].name(), Some("local-lvm"));
        assert_eq!(resources[2].node(), Some("pve1"));
    }

    #[test]
    fn resource_kind_filter_strings() {
        assert_eq!(ClusterResourceKind::Vm.to_string(), "vm");
        assert_eq!(
            "storage".parse::<ClusterResourceKind>().unwrap(),
            ClusterResourceKind::Storage
        );
    }

    #[test]
    fn ha_resource_listing() {
        let resources: Vec<HaResource> = serde_json::from_str(
            r#"[{"sid": "vm:100", "type": "vm", "state": "started", "group": "prod",
                 "max_restart": "1", "digest": "abc"}]"#,
        )
        .unwrap();
        assert_eq!(resources[0].sid, "vm:100");
        assert_eq!(resources[0].state.as_deref(), Some("started"));
        assert_eq!(resources[0].max_restart, Some(1));
    }

    #[test]
    fn ha_status_entries() {
        let entries: Vec<HaStatusEntry> = serde_json::from_str(
            r#"[
                {"id": "quorum", "type": "quorum", "node": "pve1", "status": "OK", "quorate": 1},
                {"id": "service:vm:100", "type": "service", "status": "started", "sgroup": "prod"}
            ]"#,
        )
        .unwrap();
        assert_eq!(entries[0].quorate, Some(true));
        assert_eq!(entries[1].status.as_deref(), Some("started"));
        assert_eq!(entries[1].extra["sgroup"], serde_json::json!("prod"));
    }

    #[test]
    fn firewall_rule_bool_and_port_forms() {
        let rules: Vec<FirewallRule> = serde_json::from_str(
            r#"[{"pos": 0, "type": "in", "action": "ACCEPT", "enable": 1,
                 "proto": "tcp", "dport": 8006, "source": "10.0.0.0/8"}]"#,
        )
        .unwrap();
        assert_eq!(rules[0].enable, Some(true));
        assert_eq!(rules[0].dport.as_deref(), Some("8006"));

        let update = FirewallRuleUpdate {
            ty: Some("in".to_string()),
            action: Some("DROP".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"type": "in", "action": "DROP"}));
    }

    #[test]
    fn replication_job_fields() {
        let jobs: Vec<ReplicationJob> = serde_json::from_str(
            r#"[{"id": "100-0", "type": "local", "guest": "100", "target": "pve2",
                 "schedule": "*/15", "disable": 0}]"#,
        )
        .unwrap();
        assert_eq!(jobs[0].id, "100-0");
        assert_eq!(jobs[0].guest, Some(100));
        assert_eq!(jobs[0].disable, Some(false));

        let update = ReplicationJobUpdate {
            target: Some("pve2".to_string()),
            schedule: Some("*/15".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"target": "pve2", "schedule": "*/15"})
        );
    }
}
