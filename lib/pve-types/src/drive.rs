//! Drive descriptor strings and disk slot handling.
//!
//! Proxmox encodes one disk or mountpoint per guest config key as a
//! comma separated descriptor, e.g. `local-lvm:vm-100-disk-0,size=32G`.
//! [`DriveConfig`] decodes such strings, [`build_disk_config`] and
//! [`build_mountpoint_config`] produce the values sent back when
//! creating volumes, and [`next_free_slot`] picks the lowest unused
//! config key for a bus type.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Bus types a guest disk can be attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskInterface {
    Ide,
    Scsi,
    Virtio,
    Sata,
}
serde_plain::derive_display_from_serialize!(DiskInterface);
serde_plain::derive_fromstr_from_deserialize!(DiskInterface);

/// Slot capacity assumed for bus types we do not know about.
pub const DEFAULT_SLOT_CAPACITY: u32 = 16;

impl DiskInterface {
    /// All bus types in the order PVE lists them in a guest config.
    pub const ALL: [DiskInterface; 4] = [
        DiskInterface::Ide,
        DiskInterface::Scsi,
        DiskInterface::Virtio,
        DiskInterface::Sata,
    ];

    /// Number of slots the API accepts for this bus type.
    pub fn max_slots(self) -> u32 {
        match self {
            DiskInterface::Ide => 4,
            DiskInterface::Scsi => 31,
            DiskInterface::Virtio => 16,
            DiskInterface::Sata => 6,
        }
    }
}

/// A guest config key identifying one disk attachment point, e.g. `scsi0`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotKey {
    family: String,
    index: u32,
}

impl SlotKey {
    /// The bus name part, e.g. `scsi`.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The slot number part.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family, self.index)
    }
}

/// Error returned when every slot of a bus type is already configured.
///
/// This is the only hard failure in slot handling. Retrying without
/// first removing a disk cannot succeed, so callers should surface it.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("no free {family} slot, all {capacity} in use")]
pub struct SlotsExhausted {
    /// The requested bus type.
    pub family: String,
    /// Its slot capacity.
    pub capacity: u32,
}

/// Find the lowest free disk slot for `family`.
///
/// `occupied` is a point-in-time snapshot of the configured slot keys.
/// Unknown bus types get [`DEFAULT_SLOT_CAPACITY`]. Nothing is reserved
/// here: two callers racing on the same guest config can be handed the
/// same slot, serializing read-modify-write cycles is up to the caller.
pub fn next_free_slot(family: &str, occupied: &HashSet<String>) -> Result<SlotKey, SlotsExhausted> {
    let capacity = family
        .parse::<DiskInterface>()
        .map(DiskInterface::max_slots)
        .unwrap_or(DEFAULT_SLOT_CAPACITY);

    for index in 0..capacity {
        let key = format!("{family}{index}");
        if !occupied.contains(&key) {
            return Ok(SlotKey {
                family: family.to_string(),
                index,
            });
        }
    }

    Err(SlotsExhausted {
        family: family.to_string(),
        capacity,
    })
}

/// What kind of attachment point a config key refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiskKind {
    /// A VM disk on one of the [`DiskInterface`] buses.
    VmDisk(DiskInterface),
    /// A container root filesystem (`rootfs`).
    ContainerRootfs,
    /// A container mountpoint (`mp0`, `mp1`, ...).
    ContainerMountpoint,
    /// Anything else.
    Unknown,
}

/// Classify a disk config key like `scsi0`, `rootfs` or `mp3`.
pub fn disk_kind(disk_id: &str) -> DiskKind {
    if disk_id == "rootfs" {
        return DiskKind::ContainerRootfs;
    }
    if let Some((family, _)) = split_slot_key(disk_id) {
        if family == "mp" {
            return DiskKind::ContainerMountpoint;
        }
        if let Ok(interface) = family.parse::<DiskInterface>() {
            return DiskKind::VmDisk(interface);
        }
    }
    DiskKind::Unknown
}

/// Split a key of the form `{letters}{digits}` into its parts.
fn split_slot_key(key: &str) -> Option<(&str, u32)> {
    let digits = key.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if digits.is_empty() || digits.len() == key.len() {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((&key[..key.len() - digits.len()], index))
}

/// Decoded form of a drive descriptor string.
///
/// Decoding is total: unknown option keys are kept verbatim, tokens
/// without a `=` or with an empty value are dropped. The API is the
/// source of truth for these strings, rejecting an unrecognized layout
/// would break against newer servers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DriveConfig {
    volid: String,
    storage: Option<String>,
    volume: Option<String>,
    options: BTreeMap<String, String>,
}

impl DriveConfig {
    /// Decode a descriptor as found in a guest config value.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',');
        // split always yields at least one element
        let volid = parts.next().unwrap_or_default().to_string();

        let (storage, volume) = match volid.split_once(':') {
            Some((storage, volume)) => (Some(storage.to_string()), Some(volume.to_string())),
            None => (None, None),
        };

        let mut options = BTreeMap::new();
        for part in parts {
            if let Some((key, value)) = part.split_once('=') {
                if !key.is_empty() && !value.is_empty() {
                    options.insert(key.to_string(), value.to_string());
                }
            }
        }

        Self {
            volid,
            storage,
            volume,
            options,
        }
    }

    /// The full volume identifier, the first descriptor token.
    pub fn volid(&self) -> &str {
        &self.volid
    }

    /// The storage pool, if the volume identifier has a `storage:volume` form.
    pub fn storage(&self) -> Option<&str> {
        self.storage.as_deref()
    }

    /// The volume name behind the storage pool, or the full identifier if
    /// there is no pool prefix.
    pub fn volume(&self) -> &str {
        self.volume.as_deref().unwrap_or(&self.volid)
    }

    /// The raw `size=` value, e.g. `32G`. Never unit-normalized.
    pub fn size(&self) -> Option<&str> {
        self.option("size")
    }

    /// Look up any `key=value` option.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// All `key=value` options.
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Re-encode the descriptor.
    ///
    /// Parsing the result yields an equal [`DriveConfig`]. Option order
    /// is not preserved from the input, the API treats it as irrelevant.
    pub fn to_config_string(&self) -> String {
        let mut out = self.volid.clone();
        for (key, value) in &self.options {
            out.push(',');
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

impl fmt::Display for DriveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_config_string())
    }
}

/// Options for [`build_disk_config`].
#[derive(Clone, Debug, Default)]
pub struct DiskOptions {
    /// Volume format (`raw`, `qcow2`, ...).
    pub format: Option<String>,
    /// Cache mode (`writeback`, `none`, ...).
    pub cache: Option<String>,
    /// Expose the disk as an SSD.
    pub ssd: bool,
    /// Enable TRIM/discard.
    pub discard: bool,
}

/// Build the config value for allocating a new VM disk.
///
/// The leading segment is `storage:size` with a single trailing
/// `G`/`M`/`K` suffix stripped from `size`; the volume allocation call
/// expects a bare number there. This deliberately differs from the
/// resize API, which takes sizes with suffix (and `+` prefix) verbatim.
/// It also does not emit a volume id, creation descriptors never
/// carry one.
pub fn build_disk_config(storage: &str, size: &str, options: &DiskOptions) -> String {
    let mut parts = vec![format!("{}:{}", storage, strip_size_suffix(size))];

    if let Some(format) = &options.format {
        parts.push(format!("format={format}"));
    }
    if let Some(cache) = &options.cache {
        parts.push(format!("cache={cache}"));
    }
    if options.ssd {
        parts.push("ssd=1".to_string());
    }
    if options.discard {
        parts.push("discard=on".to_string());
    }

    parts.join(",")
}

/// Options for [`build_mountpoint_config`].
#[derive(Clone, Debug, Default)]
pub struct MountpointOptions {
    /// Include the mountpoint in backups.
    pub backup: bool,
    /// Mount read-only.
    pub read_only: bool,
}

/// Build the config value for allocating a new container mountpoint.
pub fn build_mountpoint_config(
    storage: &str,
    size: &str,
    path: &str,
    options: &MountpointOptions,
) -> String {
    let mut parts = vec![
        format!("{}:{}", storage, strip_size_suffix(size)),
        format!("mp={path}"),
    ];

    if options.backup {
        parts.push("backup=1".to_string());
    }
    if options.read_only {
        parts.push("ro=1".to_string());
    }

    parts.join(",")
}

fn strip_size_suffix(size: &str) -> &str {
    match size.as_bytes().last() {
        Some(b'G' | b'g' | b'M' | b'm' | b'K' | b'k') => &size[..size.len() - 1],
        _ => size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn parse_full_descriptor() {
        let drive = DriveConfig::parse("local-lvm:vm-100-disk-0,size=32G,ssd=1");
        assert_eq!(drive.volid(), "local-lvm:vm-100-disk-0");
        assert_eq!(drive.storage(), Some("local-lvm"));
        assert_eq!(drive.volume(), "vm-100-disk-0");
        assert_eq!(drive.size(), Some("32G"));
        assert_eq!(drive.option("ssd"), Some("1"));
    }

    #[test]
    fn parse_without_storage_prefix() {
        let drive = DriveConfig::parse("rootfs-alias");
        assert_eq!(drive.volid(), "rootfs-alias");
        assert_eq!(drive.storage(), None);
        assert_eq!(drive.volume(), "rootfs-alias");
        assert!(drive.options().is_empty());
    }

    #[test]
    fn parse_splits_storage_on_first_colon() {
        let drive = DriveConfig::parse("nfs:100/vm-100-disk-0.qcow2,format=qcow2");
        assert_eq!(drive.storage(), Some("nfs"));
        assert_eq!(drive.volume(), "100/vm-100-disk-0.qcow2");
        assert_eq!(drive.option("format"), Some("qcow2"));
    }

    #[test]
    fn parse_drops_malformed_tokens() {
        let drive = DriveConfig::parse("local:vm-1-disk-0,bogus,size=8G,empty=");
        assert_eq!(drive.size(), Some("8G"));
        assert_eq!(drive.option("bogus"), None);
        assert_eq!(drive.option("empty"), None);
        assert_eq!(drive.options().len(), 1);
    }

    #[test]
    fn parse_is_idempotent() {
        let raw = "local-lvm:vm-100-disk-0,cache=writeback,discard=on,size=32G";
        assert_eq!(DriveConfig::parse(raw), DriveConfig::parse(raw));
    }

    #[test]
    fn reencode_round_trips() {
        let raw = "local-lvm:vm-100-disk-0,discard=on,size=32G,ssd=1";
        let drive = DriveConfig::parse(raw);
        assert_eq!(DriveConfig::parse(&drive.to_config_string()), drive);
        // options are emitted in key order, so this input round-trips exactly
        assert_eq!(drive.to_config_string(), raw);
    }

    #[test]
    fn build_strips_size_suffix() {
        let options = DiskOptions {
            ssd: true,
            discard: true,
            ..Default::default()
        };
        assert_eq!(
            build_disk_config("local-lvm", "50G", &options),
            "local-lvm:50,ssd=1,discard=on"
        );
        assert_eq!(
            build_disk_config("local-lvm", "512m", &DiskOptions::default()),
            "local-lvm:512"
        );
    }

    #[test]
    fn build_emits_format_and_cache() {
        let options = DiskOptions {
            format: Some("qcow2".to_string()),
            cache: Some("writeback".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_disk_config("local", "8", &options),
            "local:8,format=qcow2,cache=writeback"
        );
    }

    #[test]
    fn build_then_parse_recovers_storage_and_flags() {
        let options = DiskOptions {
            format: Some("raw".to_string()),
            discard: true,
            ..Default::default()
        };
        let drive = DriveConfig::parse(&build_disk_config("tank", "32G", &options));
        assert_eq!(drive.storage(), Some("tank"));
        assert_eq!(drive.option("format"), Some("raw"));
        assert_eq!(drive.option("discard"), Some("on"));
        assert_eq!(drive.option("ssd"), None);
    }

    #[test]
    fn build_mountpoint() {
        let options = MountpointOptions {
            backup: true,
            read_only: true,
        };
        assert_eq!(
            build_mountpoint_config("local-zfs", "16G", "/mnt/data", &options),
            "local-zfs:16,mp=/mnt/data,backup=1,ro=1"
        );
        assert_eq!(
            build_mountpoint_config("local-zfs", "16", "/mnt/data", &Default::default()),
            "local-zfs:16,mp=/mnt/data"
        );
    }

    #[test]
    fn next_free_slot_returns_lowest() {
        let slot = next_free_slot("scsi", &occupied(&["scsi0", "scsi1"])).unwrap();
        assert_eq!(slot.to_string(), "scsi2");
        assert_eq!(slot.family(), "scsi");
        assert_eq!(slot.index(), 2);
    }

    #[test]
    fn next_free_slot_fills_gaps() {
        let slot = next_free_slot("virtio", &occupied(&["virtio0", "virtio2"])).unwrap();
        assert_eq!(slot.to_string(), "virtio1");
    }

    #[test]
    fn next_free_slot_exhausted() {
        let err = next_free_slot("ide", &occupied(&["ide0", "ide1", "ide2", "ide3"])).unwrap_err();
        assert_eq!(err.family, "ide");
        assert_eq!(err.capacity, 4);
        assert!(err.to_string().contains("ide"));
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn next_free_slot_unknown_family_defaults() {
        let slot = next_free_slot("mp", &occupied(&[])).unwrap();
        assert_eq!(slot.to_string(), "mp0");

        let all: Vec<String> = (0..16).map(|i| format!("mp{i}")).collect();
        let err = next_free_slot("mp", &all.into_iter().collect()).unwrap_err();
        assert_eq!(err.capacity, DEFAULT_SLOT_CAPACITY);
    }

    #[test]
    fn disk_kind_classification() {
        assert_eq!(disk_kind("scsi0"), DiskKind::VmDisk(DiskInterface::Scsi));
        assert_eq!(disk_kind("ide3"), DiskKind::VmDisk(DiskInterface::Ide));
        assert_eq!(disk_kind("rootfs"), DiskKind::ContainerRootfs);
        assert_eq!(disk_kind("mp12"), DiskKind::ContainerMountpoint);
        assert_eq!(disk_kind("net0"), DiskKind::Unknown);
        assert_eq!(disk_kind("scsi"), DiskKind::Unknown);
        assert_eq!(disk_kind("0"), DiskKind::Unknown);
    }

    #[test]
    fn interface_strings() {
        assert_eq!("scsi".parse::<DiskInterface>().unwrap(), DiskInterface::Scsi);
        assert_eq!(DiskInterface::Virtio.to_string(), "virtio");
        assert!("floppy".parse::<DiskInterface>().is_err());
    }
}
