//! Connect from environment variables and print cluster inventory.
//!
//! Expects `PROXMOX_HOST` and either `PROXMOX_TOKEN_ID`/
//! `PROXMOX_TOKEN_SECRET` or `PROXMOX_USERNAME`/`PROXMOX_PASSWORD`.

use proxmox_api::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::from_env()?;
    client.login().await?;

    let version = client.version().await?;
    println!("Proxmox VE {}", version.version);

    for node in client.list_nodes().await? {
        println!("node {} ({:?})", node.node, node.status);
        for vm in client.list_qemu(&node.node).await? {
            println!("  vm {} {:?}", vm.vmid, vm.name);
        }
        for ct in client.list_lxc(&node.node).await? {
            println!("  ct {} {:?}", ct.vmid, ct.name);
        }
    }

    Ok(())
}
