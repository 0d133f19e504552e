//! Storage content management: listing, allocating and deleting
//! volumes.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use pve_types::{StorageStatus, Upid, VolumeEntry};

use crate::error::Error;
use crate::Client;

impl Client {
    /// Usage of one storage on one node,
    /// `GET /nodes/{node}/storage/{storage}/status`.
    pub async fn storage_status(&self, node: &str, storage: &str) -> Result<StorageStatus, Error> {
        self.get(&format!("/nodes/{node}/storage/{storage}/status"))
            .await?
            .into_data()
    }

    /// Volumes on a storage, optionally filtered by content type
    /// (`images`, `rootdir`, `iso`, ...),
    /// `GET /nodes/{node}/storage/{storage}/content`.
    pub async fn storage_content(
        &self,
        node: &str,
        storage: &str,
        content: Option<&str>,
    ) -> Result<Vec<VolumeEntry>, Error> {
        let path = format!("/nodes/{node}/storage/{storage}/content");
        match content {
            Some(content) => {
                self.get_with(&path, &[("content", content)])
                    .await?
                    .into_data()
            }
            None => self.get(&path).await?.into_data(),
        }
    }

    /// Allocate a raw volume for a guest and return its volume id,
    /// `POST /nodes/{node}/storage/{storage}/content`.
    pub async fn allocate_volume(
        &self,
        node: &str,
        storage: &str,
        vmid: u32,
        filename: &str,
        size: &str,
        format: Option<&str>,
    ) -> Result<String, Error> {
        let vmid = vmid.to_string();
        let mut params = vec![
            ("vmid", vmid.as_str()),
            ("filename", filename),
            ("size", size),
        ];
        if let Some(format) = format {
            params.push(("format", format));
        }
        self.post(
            &format!("/nodes/{node}/storage/{storage}/content"),
            Some(&params),
        )
        .await?
        .into_data()
    }

    /// Details of one volume,
    /// `GET /nodes/{node}/storage/{storage}/content/{volid}`.
    pub async fn volume_info(
        &self,
        node: &str,
        storage: &str,
        volid: &str,
    ) -> Result<VolumeEntry, Error> {
        let volid = utf8_percent_encode(volid, NON_ALPHANUMERIC);
        self.get(&format!("/nodes/{node}/storage/{storage}/content/{volid}"))
            .await?
            .into_data()
    }

    /// Delete a volume,
    /// `DELETE /nodes/{node}/storage/{storage}/content/{volid}`.
    /// Returns a task id when the storage deletes asynchronously.
    pub async fn delete_volume(
        &self,
        node: &str,
        storage: &str,
        volid: &str,
    ) -> Result<Option<Upid>, Error> {
        let volid = utf8_percent_encode(volid, NON_ALPHANUMERIC);
        self.delete::<()>(
            &format!("/nodes/{node}/storage/{storage}/content/{volid}"),
            None,
        )
        .await?
        .optional_data()
    }

    /// Image volumes belonging to one guest, from the storage content
    /// listing.
    pub async fn vm_volumes(
        &self,
        node: &str,
        storage: &str,
        vmid: u32,
    ) -> Result<Vec<VolumeEntry>, Error> {
        let volumes = self.storage_content(node, storage, Some("images")).await?;
        Ok(volumes
            .into_iter()
            .filter(|v| v.vmid == Some(u64::from(vmid)))
            .collect())
    }
}
