//! Per-node API calls: node inventory, status, network and the task
//! index.

use pve_types::{
    LxcEntry, NetworkInterface, NodeEntry, NodeStatus, StorageEntry, TaskEntry, TaskFilters,
    TaskLogLine, TaskStatus, Upid, VersionResponse, VmEntry,
};

use crate::error::Error;
use crate::Client;

impl Client {
    /// All cluster nodes, `GET /nodes`.
    pub async fn list_nodes(&self) -> Result<Vec<NodeEntry>, Error> {
        self.get("/nodes").await?.into_data()
    }

    /// Resource usage and kernel info of one node,
    /// `GET /nodes/{node}/status`.
    pub async fn node_status(&self, node: &str) -> Result<NodeStatus, Error> {
        self.get(&format!("/nodes/{node}/status")).await?.into_data()
    }

    /// Package versions of one node, `GET /nodes/{node}/version`.
    pub async fn node_version(&self, node: &str) -> Result<VersionResponse, Error> {
        self.get(&format!("/nodes/{node}/version"))
            .await?
            .into_data()
    }

    /// Network interface configuration, `GET /nodes/{node}/network`.
    pub async fn node_network(&self, node: &str) -> Result<Vec<NetworkInterface>, Error> {
        self.get(&format!("/nodes/{node}/network"))
            .await?
            .into_data()
    }

    /// Qemu guests on one node, `GET /nodes/{node}/qemu`.
    pub async fn list_qemu(&self, node: &str) -> Result<Vec<VmEntry>, Error> {
        self.get(&format!("/nodes/{node}/qemu")).await?.into_data()
    }

    /// Containers on one node, `GET /nodes/{node}/lxc`.
    pub async fn list_lxc(&self, node: &str) -> Result<Vec<LxcEntry>, Error> {
        self.get(&format!("/nodes/{node}/lxc")).await?.into_data()
    }

    /// Storages available on one node, `GET /nodes/{node}/storage`.
    pub async fn list_storage(&self, node: &str) -> Result<Vec<StorageEntry>, Error> {
        self.get(&format!("/nodes/{node}/storage"))
            .await?
            .into_data()
    }

    /// Task history of one node, `GET /nodes/{node}/tasks`.
    pub async fn node_tasks(
        &self,
        node: &str,
        filters: &TaskFilters,
    ) -> Result<Vec<TaskEntry>, Error> {
        self.get_with(&format!("/nodes/{node}/tasks"), filters)
            .await?
            .into_data()
    }

    /// Status of one task, `GET /nodes/{node}/tasks/{upid}/status`.
    pub async fn task_status(&self, node: &str, upid: &Upid) -> Result<TaskStatus, Error> {
        self.get(&format!("/nodes/{node}/tasks/{upid}/status"))
            .await?
            .into_data()
    }

    /// A slice of a task's log, `GET /nodes/{node}/tasks/{upid}/log`.
    pub async fn task_log(
        &self,
        node: &str,
        upid: &Upid,
        limit: Option<u64>,
        start: Option<u64>,
    ) -> Result<Vec<TaskLogLine>, Error> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(("limit", limit));
        }
        if let Some(start) = start {
            params.push(("start", start));
        }
        self.get_with(&format!("/nodes/{node}/tasks/{upid}/log"), &params)
            .await?
            .into_data()
    }

    /// Abort a running task, `DELETE /nodes/{node}/tasks/{upid}`.
    pub async fn stop_task(&self, node: &str, upid: &Upid) -> Result<(), Error> {
        self.delete::<()>(&format!("/nodes/{node}/tasks/{upid}"), None)
            .await?
            .nodata()
    }
}
