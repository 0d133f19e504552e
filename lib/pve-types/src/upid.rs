//! PVE task identifiers.

use std::fmt;
use std::str::FromStr;

/// A PVE worker task identifier.
///
/// The textual form is
/// `UPID:{node}:{pid}:{pstart}:{starttime}:{worker_type}:{worker_id}:{auth_id}:`
/// with `pid`, `pstart` and `starttime` as fixed width uppercase hex.
/// Every task spawning endpoint returns one of these, the task status
/// and log endpoints take it back.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Upid {
    /// The node the task runs on.
    pub node: String,
    /// The worker process id.
    pub pid: i64,
    /// The process start time from `/proc` (ticks).
    pub pstart: u64,
    /// The task start time (epoch seconds).
    pub starttime: i64,
    /// The worker type, e.g. `qmstart` or `vzdump`.
    pub worker_type: String,
    /// The worker id, usually a VMID. May be empty.
    pub worker_id: String,
    /// The user that started the task, e.g. `root@pam`.
    pub auth_id: String,
}

/// Error returned when a string is not a well-formed UPID.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid UPID: {0:?}")]
pub struct ParseUpidError(pub String);

impl FromStr for Upid {
    type Err = ParseUpidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseUpidError(s.to_string());

        let rest = s.strip_prefix("UPID:").ok_or_else(invalid)?;
        let parts: Vec<&str> = rest.split(':').collect();
        // trailing separator yields a final empty element
        if parts.len() < 8 || !parts[parts.len() - 1].is_empty() {
            return Err(invalid());
        }

        let pid = i64::from_str_radix(parts[1], 16).map_err(|_| invalid())?;
        let pstart = u64::from_str_radix(parts[2], 16).map_err(|_| invalid())?;
        let starttime = i64::from_str_radix(parts[3], 16).map_err(|_| invalid())?;

        // worker ids may themselves contain colons
        let auth_id = parts[parts.len() - 2];
        let worker_id = parts[5..parts.len() - 2].join(":");

        if parts[0].is_empty() || parts[4].is_empty() || auth_id.is_empty() {
            return Err(invalid());
        }

        Ok(Upid {
            node: parts[0].to_string(),
            pid,
            pstart,
            starttime,
            worker_type: parts[4].to_string(),
            worker_id,
            auth_id: auth_id.to_string(),
        })
    }
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPID:{}:{:08X}:{:08X}:{:08X}:{}:{}:{}:",
            self.node,
            self.pid,
            self.pstart,
            self.starttime,
            self.worker_type,
            self.worker_id,
            self.auth_id,
        )
    }
}

serde_plain::derive_serialize_from_display!(Upid);
serde_plain::derive_deserialize_from_fromstr!(Upid, "valid UPID");

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "UPID:pve1:0002F9EA:061E161E:64B7F2F5:qmstart:100:root@pam:";

    #[test]
    fn parse_and_format_round_trip() {
        let upid: Upid = RAW.parse().unwrap();
        assert_eq!(upid.node, "pve1");
        assert_eq!(upid.pid, 0x0002F9EA);
        assert_eq!(upid.pstart, 0x061E161E);
        assert_eq!(upid.starttime, 0x64B7F2F5);
        assert_eq!(upid.worker_type, "qmstart");
        assert_eq!(upid.worker_id, "100");
        assert_eq!(upid.auth_id, "root@pam");
        assert_eq!(upid.to_string(), RAW);
    }

    #[test]
    fn parse_empty_worker_id() {
        let upid: Upid = "UPID:node:00001234:00000001:64B7F2F5:aptupdate::root@pam:"
            .parse()
            .unwrap();
        assert_eq!(upid.worker_id, "");
        assert_eq!(upid.worker_type, "aptupdate");
    }

    #[test]
    fn rejects_malformed() {
        assert!("".parse::<Upid>().is_err());
        assert!("UPID:node:xyz:1:1:t:1:root@pam:".parse::<Upid>().is_err());
        assert!("UPID:node:1:1:1:t:1:root@pam".parse::<Upid>().is_err()); // no trailing colon
        assert!("qmstart:100".parse::<Upid>().is_err());
    }

    #[test]
    fn serde_as_string() {
        let upid: Upid = serde_json::from_value(serde_json::json!(RAW)).unwrap();
        assert_eq!(serde_json::to_value(&upid).unwrap(), serde_json::json!(RAW));
    }
}
