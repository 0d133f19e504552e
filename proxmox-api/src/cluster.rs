//! Cluster-wide API calls: version, status, the resource index and
//! backup job management.

use serde_json::Value;

use pve_types::{
    BackupJob, BackupJobUpdate, ClusterResource, ClusterResourceKind, ClusterStatusEntry,
    FirewallRule, FirewallRuleUpdate, HaResource, HaResourceUpdate, HaStatusEntry,
    ReplicationJob, ReplicationJobUpdate, TaskEntry, VersionResponse,
};

use crate::error::Error;
use crate::Client;

impl Client {
    /// API and package version of the endpoint node, `GET /version`.
    pub async fn version(&self) -> Result<VersionResponse, Error> {
        self.get("/version").await?.into_data()
    }

    /// Cluster quorum status and node membership,
    /// `GET /cluster/status`.
    pub async fn cluster_status(&self) -> Result<Vec<ClusterStatusEntry>, Error> {
        self.get("/cluster/status").await?.into_data()
    }

    /// The cluster resource index, optionally filtered by kind,
    /// `GET /cluster/resources`.
    pub async fn cluster_resources(
        &self,
        kind: Option<ClusterResourceKind>,
    ) -> Result<Vec<ClusterResource>, Error> {
        match kind {
            Some(kind) => {
                self.get_with("/cluster/resources", &[("type", kind.to_string())])
                    .await?
                    .into_data()
            }
            None => self.get("/cluster/resources").await?.into_data(),
        }
    }

    /// All qemu guests in the cluster, from the resource index.
    pub async fn list_vms(&self) -> Result<Vec<ClusterResource>, Error> {
        let resources = self.cluster_resources(Some(ClusterResourceKind::Vm)).await?;
        Ok(resources
            .into_iter()
            .filter(|r| matches!(r, ClusterResource::Qemu(_)))
            .collect())
    }

    /// All containers in the cluster, from the resource index.
    pub async fn list_containers(&self) -> Result<Vec<ClusterResource>, Error> {
        let resources = self.cluster_resources(Some(ClusterResourceKind::Vm)).await?;
        Ok(resources
            .into_iter()
            .filter(|r| matches!(r, ClusterResource::Lxc(_)))
            .collect())
    }

    /// Look up a guest by name across the whole cluster.
    pub async fn find_vm(&self, name: &str) -> Result<ClusterResource, Error> {
        let resources = self.cluster_resources(Some(ClusterResourceKind::Vm)).await?;
        resources
            .into_iter()
            .find(|r| r.name() == Some(name))
            .ok_or_else(|| Error::NotFound(format!("VM '{name}' not found")))
    }

    /// The next unused guest id, `GET /cluster/nextid`.
    pub async fn next_vmid(&self) -> Result<u32, Error> {
        // the api returns the id as a string
        let data = self.get("/cluster/nextid").await?.data();
        match data {
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::BadApi(format!("invalid vmid '{s}'"))),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| Error::BadApi(format!("invalid vmid {n}"))),
            other => Err(Error::BadApi(format!("invalid vmid {other}"))),
        }
    }

    /// Recent cluster-wide tasks, `GET /cluster/tasks`.
    pub async fn cluster_tasks(&self) -> Result<Vec<TaskEntry>, Error> {
        self.get("/cluster/tasks").await?.into_data()
    }

    /// Datacenter options as a raw object, `GET /cluster/options`.
    pub async fn cluster_options(&self) -> Result<Value, Error> {
        self.get("/cluster/options").await?.into_data()
    }

    /// Update datacenter options, `PUT /cluster/options`.
    pub async fn update_cluster_options(&self, options: &Value) -> Result<(), Error> {
        self.put("/cluster/options", Some(options)).await?.nodata()
    }

    /// Configured backup jobs, `GET /cluster/backup`.
    pub async fn backup_jobs(&self) -> Result<Vec<BackupJob>, Error> {
        self.get("/cluster/backup").await?.into_data()
    }

    /// A single backup job by id, `GET /cluster/backup/{id}`.
    pub async fn backup_job(&self, id: &str) -> Result<BackupJob, Error> {
        self.get(&format!("/cluster/backup/{id}")).await?.into_data()
    }

    /// Create a backup job, `POST /cluster/backup`. The job must at
    /// least name a schedule and a target storage.
    pub async fn create_backup_job(&self, job: &BackupJobUpdate) -> Result<(), Error> {
        let mut missing = Vec::new();
        if job.schedule.is_none() {
            missing.push("schedule");
        }
        if job.storage.is_none() {
            missing.push("storage");
        }
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )));
        }
        self.post("/cluster/backup", Some(job)).await?.nodata()
    }

    /// Update a backup job, `PUT /cluster/backup/{id}`.
    pub async fn update_backup_job(&self, id: &str, job: &BackupJobUpdate) -> Result<(), Error> {
        self.put(&format!("/cluster/backup/{id}"), Some(job))
            .await?
            .nodata()
    }

    /// Delete a backup job, `DELETE /cluster/backup/{id}`.
    pub async fn delete_backup_job(&self, id: &str) -> Result<(), Error> {
        self.delete::<()>(&format!("/cluster/backup/{id}"), None)
            .await?
            .nodata()
    }

    /// HA managed services, `GET /cluster/ha/resources`.
    pub async fn ha_resources(&self) -> Result<Vec<HaResource>, Error> {
        self.get("/cluster/ha/resources").await?.into_data()
    }

    /// A single HA resource by service id,
    /// `GET /cluster/ha/resources/{sid}`.
    pub async fn ha_resource(&self, sid: &str) -> Result<HaResource, Error> {
        self.get(&format!("/cluster/ha/resources/{sid}"))
            .await?
            .into_data()
    }

    /// Put a service under HA management,
    /// `POST /cluster/ha/resources`. `sid` names the guest, e.g.
    /// `vm:100`.
    pub async fn create_ha_resource(
        &self,
        sid: &str,
        resource: &HaResourceUpdate,
    ) -> Result<(), Error> {
        if sid.is_empty() {
            return Err(Error::Validation(
                "missing required parameters: sid".to_string(),
            ));
        }
        let mut params = to_value_map(resource)?;
        params.insert("sid".to_string(), Value::String(sid.to_string()));
        self.post("/cluster/ha/resources", Some(&params))
            .await?
            .nodata()
    }

    /// Update an HA resource, `PUT /cluster/ha/resources/{sid}`.
    pub async fn update_ha_resource(
        &self,
        sid: &str,
        resource: &HaResourceUpdate,
    ) -> Result<(), Error> {
        self.put(&format!("/cluster/ha/resources/{sid}"), Some(resource))
            .await?
            .nodata()
    }

    /// Remove a service from HA management,
    /// `DELETE /cluster/ha/resources/{sid}`.
    pub async fn delete_ha_resource(&self, sid: &str) -> Result<(), Error> {
        self.delete::<()>(&format!("/cluster/ha/resources/{sid}"), None)
            .await?
            .nodata()
    }

    /// HA manager status, `GET /cluster/ha/status/current`.
    pub async fn ha_status(&self) -> Result<Vec<HaStatusEntry>, Error> {
        self.get("/cluster/ha/status/current").await?.into_data()
    }

    /// Datacenter firewall rules, `GET /cluster/firewall/rules`.
    pub async fn firewall_rules(&self) -> Result<Vec<FirewallRule>, Error> {
        self.get("/cluster/firewall/rules").await?.into_data()
    }

    /// Add a datacenter firewall rule,
    /// `POST /cluster/firewall/rules`. The rule must at least carry a
    /// direction and an action.
    pub async fn create_firewall_rule(&self, rule: &FirewallRuleUpdate) -> Result<(), Error> {
        let mut missing = Vec::new();
        if rule.ty.is_none() {
            missing.push("type");
        }
        if rule.action.is_none() {
            missing.push("action");
        }
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )));
        }
        self.post("/cluster/firewall/rules", Some(rule))
            .await?
            .nodata()
    }

    /// Configured replication jobs, `GET /cluster/replication`.
    pub async fn replications(&self) -> Result<Vec<ReplicationJob>, Error> {
        self.get("/cluster/replication").await?.into_data()
    }

    /// A single replication job by id,
    /// `GET /cluster/replication/{id}`.
    pub async fn replication(&self, id: &str) -> Result<ReplicationJob, Error> {
        self.get(&format!("/cluster/replication/{id}"))
            .await?
            .into_data()
    }

    /// Create a replication job, `POST /cluster/replication`. The id
    /// is `{vmid}-{number}`; a target node is mandatory.
    pub async fn create_replication(
        &self,
        id: &str,
        job: &ReplicationJobUpdate,
    ) -> Result<(), Error> {
        let mut missing = Vec::new();
        if id.is_empty() {
            missing.push("id");
        }
        if job.target.is_none() {
            missing.push("target");
        }
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )));
        }
        let mut params = to_value_map(job)?;
        params.insert("id".to_string(), Value::String(id.to_string()));
        self.post("/cluster/replication", Some(&params))
            .await?
            .nodata()
    }

    /// Update a replication job, `PUT /cluster/replication/{id}`.
    pub async fn update_replication(
        &self,
        id: &str,
        job: &ReplicationJobUpdate,
    ) -> Result<(), Error> {
        self.put(&format!("/cluster/replication/{id}"), Some(job))
            .await?
            .nodata()
    }

    /// Delete a replication job, `DELETE /cluster/replication/{id}`.
    pub async fn delete_replication(&self, id: &str) -> Result<(), Error> {
        self.delete::<()>(&format!("/cluster/replication/{id}"), None)
            .await?
            .nodata()
    }
}

/// Serialize a params struct to a JSON object so path level ids can be
/// merged in before sending.
fn to_value_map<P: serde::Serialize>(params: &P) -> Result<serde_json::Map<String, Value>, Error> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Validation(
            "request parameters must serialize to an object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Credentials, Options};

    // required-parameter checks fire before any request goes out, so
    // an unreachable host never gets contacted
    fn client() -> Client {
        let creds = Credentials::token("root@pam!ci", "secret").unwrap();
        Client::new("pve.example.invalid", creds, Options::default()).unwrap()
    }

    #[tokio::test]
    async fn backup_job_requires_schedule_and_storage() {
        let err = client()
            .create_backup_job(&BackupJobUpdate::default())
            .await
            .unwrap_err();
        match err {
            Error::Validation(msg) => {
                assert_eq!(msg, "missing required parameters: schedule, storage")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn ha_resource_requires_sid() {
        let err = client()
            .create_ha_resource("", &HaResourceUpdate::default())
            .await
            .unwrap_err();
        match err {
            Error::Validation(msg) => assert_eq!(msg, "missing required parameters: sid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn firewall_rule_requires_type_and_action() {
        let err = client()
            .create_firewall_rule(&FirewallRuleUpdate::default())
            .await
            .unwrap_err();
        match err {
            Error::Validation(msg) => {
                assert_eq!(msg, "missing required parameters: type, action")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn replication_requires_id_and_target() {
        let err = client()
            .create_replication("", &ReplicationJobUpdate::default())
            .await
            .unwrap_err();
        match err {
            Error::Validation(msg) => {
                assert_eq!(msg, "missing required parameters: id, target")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
