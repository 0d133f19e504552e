//! Permissive deserialization helpers.
//!
//! The PVE API frequently returns numbers and booleans as JSON strings
//! (and occasionally the other way around), depending on the perl side
//! serializer. Typed records use these helpers for affected fields so
//! both forms decode.

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// Deserialize an optional integer from a number or a decimal string.
pub fn deserialize_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("value out of range for i64: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not an integer: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected integer, got {other}"))),
    }
}

/// Deserialize an optional unsigned integer from a number or a decimal string.
pub fn deserialize_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("value out of range for u64: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not an unsigned integer: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected integer, got {other}"))),
    }
}

/// Deserialize an optional float from a number or a decimal string.
pub fn deserialize_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("not a number: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected number, got {other}"))),
    }
}

/// Deserialize an optional boolean from a bool, a 0/1 number or a string.
pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(D::Error::custom(format!("not a boolean: {n}"))),
        },
        Some(Value::String(s)) => match s.trim() {
            "1" | "on" | "yes" | "true" => Ok(Some(true)),
            "0" | "off" | "no" | "false" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("not a boolean: {other:?}"))),
        },
        Some(other) => Err(D::Error::custom(format!("expected boolean, got {other}"))),
    }
}

/// Deserialize an optional string, accepting numbers as well.
///
/// Used for fields like `memory` or vnc `port` which flip between
/// string and number across API versions.
pub fn deserialize_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected string, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::deserialize_u64")]
        mem: Option<u64>,
        #[serde(default, deserialize_with = "super::deserialize_f64")]
        cpu: Option<f64>,
        #[serde(default, deserialize_with = "super::deserialize_bool")]
        template: Option<bool>,
        #[serde(default, deserialize_with = "super::deserialize_string")]
        memory: Option<String>,
    }

    #[test]
    fn accepts_native_and_string_forms() {
        let probe: Probe = serde_json::from_str(
            r#"{"mem": 1024, "cpu": "0.5", "template": "1", "memory": 2048}"#,
        )
        .unwrap();
        assert_eq!(probe.mem, Some(1024));
        assert_eq!(probe.cpu, Some(0.5));
        assert_eq!(probe.template, Some(true));
        assert_eq!(probe.memory.as_deref(), Some("2048"));

        let probe: Probe =
            serde_json::from_str(r#"{"mem": "2048", "cpu": 1.5, "template": false}"#).unwrap();
        assert_eq!(probe.mem, Some(2048));
        assert_eq!(probe.cpu, Some(1.5));
        assert_eq!(probe.template, Some(false));
    }

    #[test]
    fn missing_and_null_are_none() {
        let probe: Probe = serde_json::from_str(r#"{"cpu": null}"#).unwrap();
        assert_eq!(probe.mem, None);
        assert_eq!(probe.cpu, None);
        assert_eq!(probe.template, None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Probe>(r#"{"mem": "lots"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"template": "maybe"}"#).is_err());
    }
}
