//! Container operations: lifecycle, config, snapshots and mountpoint
//! management.

use pve_types::{
    build_mountpoint_config, next_free_slot, CtStatus, DriveConfig, LxcConfig, LxcConfigUpdate,
    MountpointOptions, SnapshotEntry, Upid,
};

use crate::error::Error;
use crate::Client;

/// Parameters for [`Client::add_ct_mountpoint`].
#[derive(Clone, Debug)]
pub struct AddMountpoint {
    storage: String,
    size: String,
    path: String,
    slot: Option<u32>,
    options: MountpointOptions,
}

impl AddMountpoint {
    /// A new mountpoint on `storage`, mounted at `path` inside the
    /// container, with the given size in GiB.
    pub fn new(
        storage: impl Into<String>,
        size: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            storage: storage.into(),
            size: size.into(),
            path: path.into(),
            slot: None,
            options: MountpointOptions::default(),
        }
    }

    /// Use a fixed mountpoint index (`mp{index}`) instead of the next
    /// free one.
    pub fn slot(mut self, index: u32) -> Self {
        self.slot = Some(index);
        self
    }

    /// Include the mountpoint in backups.
    pub fn backup(mut self, backup: bool) -> Self {
        self.options.backup = backup;
        self
    }

    /// Mount read-only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.options.read_only = read_only;
        self
    }
}

impl Client {
    /// Current status of a container,
    /// `GET /nodes/{node}/lxc/{vmid}/status/current`.
    pub async fn ct_status(&self, node: &str, vmid: u32) -> Result<CtStatus, Error> {
        self.get(&format!("/nodes/{node}/lxc/{vmid}/status/current"))
            .await?
            .into_data()
    }

    /// The container configuration,
    /// `GET /nodes/{node}/lxc/{vmid}/config`.
    pub async fn ct_config(&self, node: &str, vmid: u32) -> Result<LxcConfig, Error> {
        self.get(&format!("/nodes/{node}/lxc/{vmid}/config"))
            .await?
            .into_data()
    }

    /// Update the container configuration,
    /// `PUT /nodes/{node}/lxc/{vmid}/config`.
    pub async fn update_ct_config(
        &self,
        node: &str,
        vmid: u32,
        update: &LxcConfigUpdate,
    ) -> Result<(), Error> {
        self.put(&format!("/nodes/{node}/lxc/{vmid}/config"), Some(update))
            .await?
            .nodata()
    }

    /// Start a container, `POST .../status/start`.
    pub async fn start_ct(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/lxc/{vmid}/status/start"), None)
            .await?
            .into_data()
    }

    /// Stop a container immediately, `POST .../status/stop`.
    pub async fn stop_ct(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/lxc/{vmid}/status/stop"), None)
            .await?
            .into_data()
    }

    /// Shut a container down cleanly, `POST .../status/shutdown`,
    /// waiting up to `timeout` seconds before the task fails.
    pub async fn shutdown_ct(
        &self,
        node: &str,
        vmid: u32,
        timeout: Option<u64>,
    ) -> Result<Upid, Error> {
        let path = format!("/nodes/{node}/lxc/{vmid}/status/shutdown");
        let response = match timeout {
            Some(timeout) => self.post(&path, Some(&[("timeout", timeout)])).await?,
            None => self.post::<()>(&path, None).await?,
        };
        response.into_data()
    }

    /// Reboot a container, `POST .../status/reboot`.
    pub async fn reboot_ct(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.post::<()>(&format!("/nodes/{node}/lxc/{vmid}/status/reboot"), None)
            .await?
            .into_data()
    }

    /// Destroy a container and its volumes,
    /// `DELETE /nodes/{node}/lxc/{vmid}`.
    pub async fn delete_ct(&self, node: &str, vmid: u32) -> Result<Upid, Error> {
        self.delete::<()>(&format!("/nodes/{node}/lxc/{vmid}"), None)
            .await?
            .into_data()
    }

    /// List snapshots, `GET /nodes/{node}/lxc/{vmid}/snapshot`.
    pub async fn ct_snapshots(&self, node: &str, vmid: u32) -> Result<Vec<SnapshotEntry>, Error> {
        self.get(&format!("/nodes/{node}/lxc/{vmid}/snapshot"))
            .await?
            .into_data()
    }

    /// Take a snapshot, `POST /nodes/{node}/lxc/{vmid}/snapshot`.
    pub async fn create_ct_snapshot(
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
        self.post(&format!("/nodes/{node}/lxc/{vmid}/snapshot"), Some(&params))
            .await?
            .into_data()
    }

    /// Delete a snapshot,
    /// `DELETE /nodes/{node}/lxc/{vmid}/snapshot/{name}`.
    pub async fn delete_ct_snapshot(
        &self,
        node: &str,
        vmid: u32,
        name: &str,
    ) -> Result<Upid, Error> {
        self.delete::<()>(&format!("/nodes/{node}/lxc/{vmid}/snapshot/{name}"), None)
            .await?
            .into_data()
    }

    /// The parsed volume descriptors of a container, rootfs first.
    pub async fn ct_volumes(
        &self,
        node: &str,
        vmid: u32,
    ) -> Result<Vec<(String, DriveConfig)>, Error> {
        Ok(self.ct_config(node, vmid).await?.volumes())
    }

    /// Attach a new mountpoint to a container and return the slot it
    /// was placed in (`mp0`, `mp1`, ...).
    pub async fn add_ct_mountpoint(
        &self,
        node: &str,
        vmid: u32,
        mountpoint: &AddMountpoint,
    ) -> Result<String, Error> {
        let slot = match mountpoint.slot {
            Some(index) => format!("mp{index}"),
            None => {
                let config = self.ct_config(node, vmid).await?;
                let occupied = config
                    .volumes()
                    .into_iter()
                    .map(|(slot, _)| slot)
                    .collect();
                next_free_slot("mp", &occupied)?.to_string()
            }
        };

        let descriptor = build_mountpoint_config(
            &mountpoint.storage,
            &mountpoint.size,
            &mountpoint.path,
            &mountpoint.options,
        );
        let mut update = LxcConfigUpdate::default();
        update.extra.insert(slot.clone(), descriptor);
        self.update_ct_config(node, vmid, &update).await?;
        Ok(slot)
    }

    /// Detach and delete a mountpoint by removing its slot from the
    /// config.
    pub async fn remove_ct_mountpoint(
        &self,
        node: &str,
        vmid: u32,
        slot: &str,
    ) -> Result<(), Error> {
        let update = LxcConfigUpdate {
            delete: Some(slot.to_string()),
            ..LxcConfigUpdate::default()
        };
        self.update_ct_config(node, vmid, &update).await
    }

    /// Grow a container volume, `PUT /nodes/{node}/lxc/{vmid}/resize`.
    /// The size is passed through verbatim (`+5G`, `32G`, ...).
    pub async fn resize_ct_volume(
        &self,
        node: &str,
        vmid: u32,
        disk: &str,
        size: &str,
    ) -> Result<Option<Upid>, Error> {
        self.put(
            &format!("/nodes/{node}/lxc/{vmid}/resize"),
            Some(&[("disk", disk), ("size", size)]),
        )
        .await?
        .optional_data()
    }

    /// Move a volume to another storage,
    /// `POST /nodes/{node}/lxc/{vmid}/move_volume`.
    pub async fn move_ct_volume(
        &self,
        node: &str,
        vmid: u32,
        volume: &str,
        storage: &str,
        delete_source: bool,
    ) -> Result<Upid, Error> {
        let mut params = vec![("volume", volume), ("storage", storage)];
        if delete_source {
            params.push(("delete", "1"));
        }
        self.post(&format!("/nodes/{node}/lxc/{vmid}/move_volume"), Some(&params))
            .await?
            .into_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mountpoint_builder() {
        let mp = AddMountpoint::new("local-zfs", "16G", "/data")
            .backup(true)
            .read_only(false);
        assert!(mp.slot.is_none());
        assert_eq!(
            build_mountpoint_config(&mp.storage, &mp.size, &mp.path, &mp.options),
            "local-zfs:16,mp=/data,backup=1"
        );
    }
}
