//! Qemu guest operations: lifecycle, config, snapshots, the guest
//! agent and disk management.
//!
//! Disk management ties the drive descriptor codec together with the
//! API: [`Client::add_vm_disk`] reads the current config, picks the
//! next free slot on the requested bus and writes the built descriptor
//! back with a config update.

use serde::Deserialize;

use pve_types::{
    build_disk_config, next_free_slot, AgentInterface, AgentOsInfo, CloneOptions, DiskInterface,
    DiskOptions, DriveConfig, GuestIpAddress, SnapshotEntry, Upid, VmConfig, VmConfigUpdate,
    VmStatus, VncProxy,
};

use crate::error::Error;
use crate::Client;

/// Parameters for [`Client::add_vm_disk`].
#[derive(Clone, Debug)]
pub struct AddDisk {
    storage: String,
    size: String,
    interface: DiskInterface,
    slot: Option<String>,
    options: DiskOptions,
}

impl AddDisk {
    /// A new disk on `storage` with the given size in GiB (a plain
    /// number, or a number with a `G`/`M`/`K` suffix).
    pub fn new(storage: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            storage: storage.into(),
            size: size.into(),
            interface: DiskInterface::Scsi,
            slot: None,
            options: DiskOptions::default(),
        }
    }

    /// Attach to this bus instead of the default `scsi`.
    pub fn interface(mut self, interface: DiskInterface) -> Self {
        self.interface = interface;
        self
    }

    /// Use a fixed slot (e.g. `scsi3`) instead of the next free one.
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.options.format = Some(format.into());
        self
    }

    pub fn cache(mut self, cache: impl Into<String>) -> Self {
        self.options.cache = Some(cache.into());
        self
    }

    pub fn ssd(mut self, ssd: bool) -> Self {
        self.options.ssd = ssd;
        self
    }

    pub fn discard(mut self, discard: bool) -> Self {
        self.options.discard = discard;
        self
    }
}

/// Parameters for [`Client::move_vm_disk`].
#[derive(Clone, Debug)]
pub struct MoveDisk {
    disk: String,
    storage: String,
    delete: bool,
    format: Option<String>,
}

impl MoveDisk {
    /// Move the disk in `disk` (e.g. `scsi0`) to `storage`.
    pub fn new(disk: impl Into<String>, storage: impl Into<String>) -> Self {
        Self {
            disk: disk.into(),
            storage: storage.into(),
            delete: false,
            format: None,
        }
    }

    /// Delete the source volume after the move.
    pub fn delete_source(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// Target format, e.g. `qcow2`.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

#[derive(Deserialize)]
struct AgentResult<T> {
    result: T,
}

#[derive(Deserialize)]
struct AgentHostname {
    #[serde(rename = "host-name")]
    host_name: String,
}

impl Client {
    /// Current status of a VM,
    /// `GET /nodes/{node}/qemu/{vmid}/status/current`.
    pub async fn vm_status(&self, node: &str, vmid: u32) -> Result<VmStatus, Error> {
        self.get(&format!("/nodes/{node}/qemu/{vmid}/status/current"))
            .await?
            .into_data()
    }

    /// The VM configuration, `GET /nodes/{node}/qemu/{vmid}/config`.
    pub async fn vm_config(&self, node: &str, vmid: u32) -> Result<VmConfig, Error> {
        self.get(&format!("/nodes/{node}/qemu/{vmid}/config"))
            .await?
            .into_data()
    }

    /// Update the VM configuration,
    /// `PUT /nodes/{node}/qemu/{vmid}/config`.
    pub async fn update_vm_config(
        &self,
        node: &str,
        vmid: u32,
        update: &VmConfigUpdate,
    ) -> Result<(), Error> {
        self.put(&format!("/nodes/{node}/qemu/{vmid}/config"), Some(update))
            .await?
            .nodata()
    }

    /// Start a VM, `POST .../status/start`.
    pub async fn start_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/qemu/{vmid}/status/start"), None)
            .await?
            .into_data()
    }

    /// Stop a VM immediately, `POST .../status/stop`. With `force` the
    /// lock is skipped.
    pub async fn stop_vm(&self, node: &str, vmid: u32, force: bool) -> Result<Upid, Error> {
        let path = format!("/nodes/{node}/qemu/{vmid}/status/stop");
        let response = if force {
            self.post(&path, Some(&[("skiplock", true)])).await?
        } else {
            self.post::<()>(&path, None).await?
        };
        response.into_data()
    }

    /// Shut a VM down cleanly, `POST .../status/shutdown`, waiting up
    /// to `timeout` seconds before the task fails.
    pub async fn shutdown_vm(
        &self,
        node: &str,
        vmid: u32,
        timeout: Option<u64>,
    ) -> Result<Upid, Error> {
        let path = format!("/nodes/{node}/qemu/{vmid}/status/shutdown");
        let response = match timeout {
            Some(timeout) => self.post(&path, Some(&[("timeout", timeout)])).await?,
            None => self.post::<()>(&path, None).await?,
        };
        response.into_data()
    }

    /// Reboot a VM, `POST .../status/reboot`.
    pub async fn reboot_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/qemu/{vmid}/status/reboot"), None)
            .await?
            .into_data()
    }

    /// Hard-reset a VM, `POST .../status/reset`.
    pub async fn reset_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/qemu/{vmid}/status/reset"), None)
            .await?
            .into_data()
    }

    /// Suspend a VM, `POST .../status/suspend`.
    pub async fn suspend_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/qemu/{vmid}/status/suspend"), None)
            .await?
            .into_data()
    }

    /// Resume a suspended VM, `POST .../status/resume`.
    pub async fn resume_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/qemu/{vmid}/status/resume"), None)
            .await?
            .into_data()
    }

    /// Destroy a VM and its volumes,
    /// `DELETE /nodes/{node}/qemu/{vmid}`.
    pub async fn delete_vm(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.delete::<()>(&format!("/nodes/{node}/qemu/{vmid}"), None)
            .await?
            .into_data()
    }

    /// Clone a VM, `POST /nodes/{node}/qemu/{vmid}/clone`.
    pub async fn clone_vm(
        &self,
        node: &str,
        vmid: u32,
        options: &CloneOptions,
    ) -> Result<Upid, Error> {
        self.post(&format!("/nodes/{node}/qemu/{vmid}/clone"), Some(options))
            .await?
            .into_data()
    }

    /// List snapshots, `GET /nodes/{node}/qemu/{vmid}/snapshot`.
    pub async fn vm_snapshots(&self, node: &str, vmid: u32) -> Result<Vec<SnapshotEntry>, Error> {
        self.get(&format!("/nodes/{node}/qemu/{vmid}/snapshot"))
            .await?
            .into_data()
    }

    /// Take a snapshot, `POST /nodes/{node}/qemu/{vmid}/snapshot`.
    pub async fn create_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        name: &str,
        description: Option<&str>,
    ) -> Result<Upid, Error> {
        let mut params = vec![("snapname", name)];
        if let Some(description) = description {
            params.push(("description", description));
        }
        self.post(&format!("/nodes/{node}/qemu/{vmid}/snapshot"), Some(&params))
            .await?
            .into_data()
    }

    /// Delete a snapshot,
    /// `DELETE /nodes/{node}/qemu/{vmid}/snapshot/{name}`.
    pub async fn delete_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        name: &str,
    ) -> Result<Upid, Error> {
        self.delete::<()>(&format!("/nodes/{node}/qemu/{vmid}/snapshot/{name}"), None)
            .await?
            .into_data()
    }

    /// Roll back to a snapshot,
    /// `POST /nodes/{node}/qemu/{vmid}/snapshot/{name}/rollback`.
    pub async fn rollback_vm_snapshot(
        &self,
        node: &str,
        vmid: u32,
        name: &str,
    ) -> Result<Upid, Error> {
        self.post::<()>(
            &format!("/nodes/{node}/qemu/{vmid}/snapshot/{name}/rollback"),
            None,
        )
        .await?
        .into_data()
    }

    /// Create a VNC proxy ticket,
    /// `POST /nodes/{node}/qemu/{vmid}/vncproxy`.
    pub async fn vm_vnc_proxy(
        &self,
        node: &str,
        vmid: u32,
        generate_password: bool,
    ) -> Result<VncProxy, Error> {
        let path = format!("/nodes/{node}/qemu/{vmid}/vncproxy");
        let response = if generate_password {
            self.post(&path, Some(&[("generate-password", true)])).await?
        } else {
            self.post::<()>(&path, None).await?
        };
        response.into_data()
    }

    /// Guest network interfaces via the agent,
    /// `GET .../agent/network-get-interfaces`.
    pub async fn vm_agent_interfaces(
        &self,
        node: &str,
        vmid: u32,
    ) -> Result<Vec<AgentInterface>, Error> {
        let result: AgentResult<Vec<AgentInterface>> = self
            .get(&format!(
                "/nodes/{node}/qemu/{vmid}/agent/network-get-interfaces"
            ))
            .await?
            .into_data()?;
        Ok(result.result)
    }

    /// Guest hostname via the agent, `GET .../agent/get-host-name`.
    pub async fn vm_agent_hostname(&self, node: &str, vmid: u32) -> Result<String, Error> {
        let result: AgentResult<AgentHostname> = self
            .get(&format!("/nodes/{node}/qemu/{vmid}/agent/get-host-name"))
            .await?
            .into_data()?;
        Ok(result.result.host_name)
    }

    /// Guest OS information via the agent, `GET .../agent/get-osinfo`.
    pub async fn vm_agent_osinfo(&self, node: &str, vmid: u32) -> Result<AgentOsInfo, Error> {
        let result: AgentResult<AgentOsInfo> = self
            .get(&format!("/nodes/{node}/qemu/{vmid}/agent/get-osinfo"))
            .await?
            .into_data()?;
        Ok(result.result)
    }

    /// Guest addresses, flattened from the agent interface listing.
    /// Pass `ip_type` (`ipv4`/`ipv6`) to filter. Returns an empty list
    /// when the agent is not running.
    pub async fn vm_ip_addresses(
        &self,
        node: &str,
        vmid: u32,
        ip_type: Option<&str>,
    ) -> Result<Vec<GuestIpAddress>, Error> {
        let interfaces = match self.vm_agent_interfaces(node, vmid).await {
            Ok(interfaces) => interfaces,
            // the agent endpoint reports 500 when no agent is running
            Err(Error::Api(msg)) => {
                log::debug!("no agent addresses for vm {vmid}: {msg}");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut addresses = Vec::new();
        for iface in interfaces {
            for addr in &iface.ip_addresses {
                if let Some(wanted) = ip_type {
                    if addr.ip_address_type.as_deref() != Some(wanted) {
                        continue;
                    }
                }
                addresses.push(GuestIpAddress {
                    interface: iface.name.clone(),
                    ip: addr.ip_address.clone(),
                    mac: iface.hardware_address.clone(),
                    ip_type: addr.ip_address_type.clone(),
                });
            }
        }
        Ok(addresses)
    }

    /// The parsed drive descriptors of a VM, in bus order.
    pub async fn vm_disks(
        &self,
        node: &str,
        vmid: u32,
    ) -> Result<Vec<(String, DriveConfig)>, Error> {
        Ok(self.vm_config(node, vmid).await?.drives())
    }

    /// Attach a new disk to a VM and return the slot it was placed in.
    ///
    /// Reads the current config to find the occupied slots, allocates
    /// the lowest free slot on the requested bus unless a fixed slot
    /// was given, and writes the built descriptor back.
    pub async fn add_vm_disk(&self, node: &str, vmid: u32, disk: &AddDisk) -> Result<String, Error> {
        let slot = match &disk.slot {
            Some(slot) => slot.clone(),
            None => {
                let config = self.vm_config(node, vmid).await?;
                let occupied = config.occupied_slots();
                next_free_slot(&disk.interface.to_string(), &occupied)?.to_string()
            }
        };

        let descriptor = build_disk_config(&disk.storage, &disk.size, &disk.options);
        let mut update = VmConfigUpdate::default();
        update.extra.insert(slot.clone(), descriptor);
        self.update_vm_config(node, vmid, &update).await?;
        Ok(slot)
    }

    /// Grow a disk, `PUT /nodes/{node}/qemu/{vmid}/resize`. The size
    /// is passed through verbatim (`+5G`, `32G`, ...).
    pub async fn resize_vm_disk(
        &self,
        node: &str,
        vmid: u32,
        disk: &str,
        size: &str,
    ) -> Result<Option<Upid>, Error> {
        self.put(
            &format!("/nodes/{node}/qemu/{vmid}/resize"),
            Some(&[("disk", disk), ("size", size)]),
        )
        .await?
        .optional_data()
    }

    /// Move a disk to another storage,
    /// `POST /nodes/{node}/qemu/{vmid}/move_disk`.
    pub async fn move_vm_disk(
        &self,
        node: &str,
        vmid: u32,
        options: &MoveDisk,
    ) -> Result<Upid, Error> {
        let mut params = vec![
            ("disk".to_string(), options.disk.clone()),
            ("storage".to_string(), options.storage.clone()),
        ];
        if options.delete {
            params.push(("delete".to_string(), "1".to_string()));
        }
        if let Some(format) = &options.format {
            params.push(("format".to_string(), format.clone()));
        }
        self.post(&format!("/nodes/{node}/qemu/{vmid}/move_disk"), Some(&params))
            .await?
            .into_data()
    }

    /// Detach and delete a disk by removing its slot from the config.
    pub async fn remove_vm_disk(&self, node: &str, vmid: u32, slot: &str) -> Result<(), Error> {
        let update = VmConfigUpdate {
            delete: Some(slot.to_string()),
            ..VmConfigUpdate::default()
        };
        self.update_vm_config(node, vmid, &update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_disk_builder_defaults() {
        let disk = AddDisk::new("local-lvm", "32");
        assert_eq!(disk.interface, DiskInterface::Scsi);
        assert!(disk.slot.is_none());
        assert_eq!(
            build_disk_config(&disk.storage, &disk.size, &disk.options),
            "local-lvm:32"
        );
    }

    #[test]
    fn add_disk_builder_options() {
        let disk = AddDisk::new("ceph", "50G")
            .interface(DiskInterface::Virtio)
            .ssd(true)
            .discard(true)
            .cache("writeback");
        assert_eq!(disk.interface, DiskInterface::Virtio);
        assert_eq!(
            build_disk_config(&disk.storage, &disk.size, &disk.options),
            "ceph:50,cache=writeback,ssd=1,discard=on"
        );
    }
}
