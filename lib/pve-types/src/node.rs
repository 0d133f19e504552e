//! Node level API types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse;
use crate::upid::Upid;

/// Node state as reported by `GET /nodes`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Online,
    Offline,
    Unknown,
}
serde_plain::derive_display_from_serialize!(NodeState);
serde_plain::derive_fromstr_from_deserialize!(NodeState);

/// One entry of `GET /nodes`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NodeEntry {
    /// The node name.
    pub node: String,
    /// Current state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeState>,
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of CPUs.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<i64>,
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
    /// Certificate fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_fingerprint: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NodeEntry {
    /// Whether the node is known to be online.
    pub fn is_online(&self) -> bool {
        self.status == Some(NodeState::Online)
    }
}

/// Memory or filesystem usage triple in the node status.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct UsageInfo {
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    #[serde(default, deserialize_with = "parse::deserialize_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<u64>,
}

/// CPU details in the node status.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CpuInfo {
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mhz: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Response of `GET /nodes/{node}/status`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NodeStatus {
    /// Current CPU utilization.
    #[serde(default, deserialize_with = "parse::deserialize_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Uptime in seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// 1/5/15 minute load averages, as reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadavg: Option<Vec<Value>>,
    /// Memory usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<UsageInfo>,
    /// Swap usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<UsageInfo>,
    /// Root filesystem usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<UsageInfo>,
    /// CPU details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpuinfo: Option<CpuInfo>,
    /// Running kernel version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kversion: Option<String>,
    /// Installed pve-manager version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pveversion: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of `GET /nodes/{node}/network`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NetworkInterface {
    /// The interface name.
    pub iface: String,
    /// The interface type (`bridge`, `bond`, `eth`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Address configuration method (`static`, `dhcp`, `manual`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Configured IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Configured netmask.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    /// Configured gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    /// Whether the interface is up.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Whether the interface comes up at boot.
    #[serde(default, deserialize_with = "parse::deserialize_bool")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autostart: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of a task listing (`GET /nodes/{node}/tasks`,
/// `GET /cluster/tasks`).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TaskEntry {
    /// The task identifier.
    pub upid: Upid,
    /// The node the task ran on.
    pub node: String,
    /// The worker type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// The worker id, usually a VMID.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The user that started the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Start time, epoch seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<i64>,
    /// End time, epoch seconds. Unset while the task runs.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime: Option<i64>,
    /// Final status, `OK` on success. Unset while the task runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Response of `GET /nodes/{node}/tasks/{upid}/status`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TaskStatus {
    /// The task identifier.
    pub upid: Upid,
    /// The node the task runs on.
    pub node: String,
    /// `running` or `stopped`.
    pub status: String,
    /// The worker type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// The worker id.
    #[serde(default, deserialize_with = "parse::deserialize_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The user that started the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Start time, epoch seconds.
    #[serde(default, deserialize_with = "parse::deserialize_i64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<i64>,
    /// Exit status, only once stopped. `OK` means success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exitstatus: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TaskStatus {
    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    /// Whether the task finished successfully.
    pub fn succeeded(&self) -> bool {
        !self.is_running() && self.exitstatus.as_deref() == Some("OK")
    }
}

/// One line of `GET /nodes/{node}/tasks/{upid}/log`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TaskLogLine {
    /// The line number, starting at 1.
    pub n: u64,
    /// The line text.
    pub t: String,
}

/// Filters for the per node task listing.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TaskFilters {
    /// Maximum number of entries to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Offset into the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    /// Task source (`archive`, `active`, `all`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Only tasks that ended in an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<bool>,
    /// Only tasks started by users matching this string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userfilter: Option<String>,
    /// Only tasks for this VMID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmid: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_entry_from_index() {
        let node: NodeEntry = serde_json::from_str(
            r#"{"node": "pve1", "status": "online", "cpu": 0.02, "maxcpu": 8,
                "mem": "4294967296", "uptime": 86400, "ssl_fingerprint": "AA:BB"}"#,
        )
        .unwrap();
        assert!(node.is_online());
        assert_eq!(node.mem, Some(4294967296));
        assert_eq!(node.ssl_fingerprint.as_deref(), Some("AA:BB"));
    }

    #[test]
    fn task_status_helpers() {
        let status: TaskStatus = serde_json::from_str(
            r#"{"upid": "UPID:pve1:0002F9EA:061E161E:64B7F2F5:qmstart:100:root@pam:",
                "node": "pve1", "status": "stopped", "type": "qmstart", "id": 100,
                "user": "root@pam", "exitstatus": "OK"}"#,
        )
        .unwrap();
        assert!(!status.is_running());
        assert!(status.succeeded());
        assert_eq!(status.id.as_deref(), Some("100"));
        assert_eq!(status.upid.worker_type, "qmstart");

        let running: TaskStatus = serde_json::from_str(
            r#"{"upid": "UPID:pve1:0002F9EA:061E161E:64B7F2F5:qmstart:100:root@pam:",
                "node": "pve1", "status": "running"}"#,
        )
        .unwrap();
        assert!(running.is_running());
        assert!(!running.succeeded());
    }
}
