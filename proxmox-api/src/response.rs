//! Response envelope handling.
//!
//! Every PVE API response wraps its payload in a JSON object with a
//! `data` member; error responses may carry `errors` (array or object)
//! or `message` instead. Status codes map onto the error taxonomy the
//! same way for every endpoint.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// A successfully received (2xx) API response.
#[derive(Clone, Debug)]
pub(crate) struct ApiResponse {
    body: Value,
}

impl ApiResponse {
    /// Map a raw status/body pair into the error taxonomy. `path` is
    /// only used in error messages.
    pub(crate) fn from_parts(status: u16, body: &str, path: &str) -> Result<Self, Error> {
        if (200..300).contains(&status) {
            let body = if body.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(body)?
            };
            return Ok(ApiResponse { body });
        }

        // error bodies are frequently not JSON (proxy pages etc.), fall
        // back to the bare status then
        let body: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let message = error_message(&body);

        Err(match status {
            401 => Error::Authentication("authentication failed".to_string()),
            404 => Error::NotFound(path.to_string()),
            400..=499 => {
                Error::Validation(message.unwrap_or_else(|| format!("client error: {status}")))
            }
            500..=599 => Error::Api(message.unwrap_or_else(|| format!("server error: {status}"))),
            _ => Error::UnexpectedStatus(status),
        })
    }

    /// Take the `data` member, `Null` if absent.
    pub(crate) fn data(mut self) -> Value {
        match &mut self.body {
            Value::Object(map) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Deserialize the `data` member, treating a missing one as an
    /// API contract violation.
    pub(crate) fn into_data<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self.data() {
            Value::Null => Err(Error::BadApi("api returned no data".to_string())),
            data => Ok(serde_json::from_value(data)?),
        }
    }

    /// Deserialize the `data` member, mapping a missing one to `None`.
    pub(crate) fn optional_data<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        match self.data() {
            Value::Null => Ok(None),
            data => Ok(Some(serde_json::from_value(data)?)),
        }
    }

    /// Discard the payload; for endpoints whose `data` is always null.
    pub(crate) fn nodata(self) -> Result<(), Error> {
        Ok(())
    }
}

/// Extract the most useful human readable message from an error body.
fn error_message(body: &Value) -> Option<String> {
    match body.get("errors") {
        Some(Value::Array(errors)) if !errors.is_empty() => Some(
            errors
                .iter()
                .map(value_to_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Some(Value::Object(errors)) if !errors.is_empty() => Some(
            errors
                .iter()
                .map(|(key, value)| format!("{key}: {}", value_to_text(value)))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => body
            .get("message")
            .and_then(Value::as_str)
            .map(|s| s.trim_end().to_string()),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim_end().to_string(),
        other => other.to_string(),
    }
}

/// Flatten serializable parameters into form/query pairs.
///
/// The PVE API is form encoded and expects booleans as `0`/`1`;
/// list-valued parameters are sent comma separated.
pub(crate) fn to_form_pairs<P>(params: &P) -> Result<Vec<(String, String)>, Error>
where
    P: serde::Serialize + ?Sized,
{
    let value = serde_json::to_value(params)?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (key, value) in map {
                if let Some(text) = param_text(&key, value)? {
                    pairs.push((key, text));
                }
            }
            Ok(pairs)
        }
        // tuple slices, e.g. `&[("limit", 50)]`
        Value::Array(items) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                let Value::Array(pair) = item else {
                    return Err(Error::Validation(
                        "request parameters must serialize to an object or pair list"
                            .to_string(),
                    ));
                };
                let mut pair = pair.into_iter();
                match (pair.next(), pair.next(), pair.next()) {
                    (Some(Value::String(key)), Some(value), None) => {
                        if let Some(text) = param_text(&key, value)? {
                            pairs.push((key, text));
                        }
                    }
                    _ => {
                        return Err(Error::Validation(
                            "request parameters must serialize to an object or pair list"
                                .to_string(),
                        ))
                    }
                }
            }
            Ok(pairs)
        }
        _ => Err(Error::Validation(
            "request parameters must serialize to an object or pair list".to_string(),
        )),
    }
}

fn param_text(key: &str, value: Value) -> Result<Option<String>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(if b { "1" } else { "0" }.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s)),
        Value::Array(items) => {
            let mut joined = Vec::with_capacity(items.len());
            for item in &items {
                match item {
                    Value::Bool(b) => joined.push(if *b { "1" } else { "0" }.to_string()),
                    Value::Number(n) => joined.push(n.to_string()),
                    Value::String(s) => joined.push(s.clone()),
                    _ => {
                        return Err(Error::Validation(format!(
                            "unsupported list value for parameter '{key}'"
                        )))
                    }
                }
            }
            Ok(Some(joined.join(",")))
        }
        Value::Object(_) => Err(Error::Validation(format!(
            "unsupported nested value for parameter '{key}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn response(status: u16, body: &str) -> Result<ApiResponse, Error> {
        ApiResponse::from_parts(status, body, "/api2/json/test")
    }

    #[test]
    fn ok_response_data() {
        let data = response(200, r#"{"data": {"version": "8.2.4"}}"#)
            .unwrap()
            .data();
        assert_eq!(data["version"], "8.2.4");
    }

    #[test]
    fn empty_body_is_ok_without_data() {
        let response = response(200, "").unwrap();
        assert_eq!(response.data(), Value::Null);
    }

    #[test]
    fn missing_data_is_bad_api() {
        let err = response(200, "{}").unwrap().into_data::<Value>().unwrap_err();
        assert!(matches!(err, Error::BadApi(_)));

        let none = response(200, "{}")
            .unwrap()
            .optional_data::<Value>()
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            response(401, "{}").unwrap_err(),
            Error::Authentication(_)
        ));
        match response(404, "{}").unwrap_err() {
            Error::NotFound(path) => assert_eq!(path, "/api2/json/test"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(matches!(
            response(400, "{}").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(response(500, "{}").unwrap_err(), Error::Api(_)));
        assert!(matches!(
            response(302, "{}").unwrap_err(),
            Error::UnexpectedStatus(302)
        ));
    }

    #[test]
    fn error_message_forms() {
        match response(400, r#"{"errors": {"vmid": "invalid format"}}"#).unwrap_err() {
            Error::Validation(msg) => assert_eq!(msg, "vmid: invalid format"),
            other => panic!("unexpected error: {other:?}"),
        }
        match response(500, r#"{"errors": ["out of space", "try later"]}"#).unwrap_err() {
            Error::Api(msg) => assert_eq!(msg, "out of space, try later"),
            other => panic!("unexpected error: {other:?}"),
        }
        match response(500, r#"{"message": "internal error\n"}"#).unwrap_err() {
            Error::Api(msg) => assert_eq!(msg, "internal error"),
            other => panic!("unexpected error: {other:?}"),
        }
        // non-JSON error bodies fall back to the status line
        match response(502, "<html>bad gateway</html>").unwrap_err() {
            Error::Api(msg) => assert_eq!(msg, "server error: 502"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_on_success_is_an_error() {
        assert!(matches!(
            response(200, "not json").unwrap_err(),
            Error::Json(_)
        ));
    }

    #[test]
    fn form_pairs_conventions() {
        #[derive(Serialize)]
        struct Params {
            vmid: u32,
            force: bool,
            dry: bool,
            name: Option<String>,
            tags: Vec<String>,
        }

        let pairs = to_form_pairs(&Params {
            vmid: 100,
            force: true,
            dry: false,
            name: None,
            tags: vec!["a".to_string(), "b".to_string()],
        })
        .unwrap();

        // serde_json objects iterate in key order
        assert_eq!(
            pairs,
            vec![
                ("dry".to_string(), "0".to_string()),
                ("force".to_string(), "1".to_string()),
                ("tags".to_string(), "a,b".to_string()),
                ("vmid".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn form_pairs_from_tuple_slice() {
        let pairs = to_form_pairs(&[("limit", 50), ("start", 0)]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "50".to_string()),
                ("start".to_string(), "0".to_string()),
            ]
        );
    }
}
