//! Data types for the Proxmox VE API.
//!
//! This crate is pure data handling: typed records for API responses,
//! request parameter types, the drive descriptor codec and the disk
//! slot allocator. It performs no I/O; the `proxmox-api` crate embeds
//! it into the HTTP client.

pub mod cluster;
pub mod drive;
pub mod guest;
pub mod lxc;
pub mod node;
pub mod parse;
pub mod qemu;
pub mod storage;
pub mod upid;

pub use cluster::{
    BackupJob, BackupJobUpdate, ClusterResource, ClusterResourceKind, ClusterStatusEntry,
    FirewallRule, FirewallRuleUpdate, HaResource, HaResourceUpdate, HaStatusEntry,
    ReplicationJob, ReplicationJobUpdate, VersionResponse,
};
pub use drive::{
    build_disk_config, build_mountpoint_config, disk_kind, next_free_slot, DiskInterface,
    DiskKind, DiskOptions, DriveConfig, MountpointOptions, SlotKey, SlotsExhausted,
};
pub use guest::{SnapshotEntry, VncProxy};
pub use lxc::{CtStatus, LxcConfig, LxcConfigUpdate, LxcEntry};
pub use node::{
    NetworkInterface, NodeEntry, NodeStatus, TaskEntry, TaskFilters, TaskLogLine, TaskStatus,
};
pub use qemu::{
    AgentInterface, AgentIpAddress, AgentOsInfo, CloneOptions, GuestIpAddress, VmConfig,
    VmConfigUpdate, VmEntry, VmStatus,
};
pub use storage::{StorageEntry, StorageStatus, VolumeEntry};
pub use upid::{ParseUpidError, Upid};
