//! Inspect and extend the disks of one VM.
//!
//! Usage: `disks <node> <vmid> [<storage> <size>]`. With a storage and
//! size given, a new disk is attached on the next free scsi slot.

use proxmox_api::{AddDisk, Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let node = args.next().ok_or_else(|| anyhow::anyhow!("missing node"))?;
    let vmid: u32 = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing vmid"))?
        .parse()?;

    let client = Client::from_env()?;
    client.login().await?;

    for (slot, drive) in client.vm_disks(&node, vmid).await? {
        println!(
            "{slot}: {} (size {})",
            drive.volid(),
            drive.size().unwrap_or("?")
        );
    }

    if let (Some(storage), Some(size)) = (args.next(), args.next()) {
        let slot = client
            .add_vm_disk(&node, vmid, &AddDisk::new(storage, size).discard(true))
            .await?;
        println!("attached new disk as {slot}");
    }

    Ok(())
}
