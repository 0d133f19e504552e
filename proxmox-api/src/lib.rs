//! Client for the Proxmox VE REST API.
//!
//! The entry point is [`Client`], constructed from a host name,
//! [`Credentials`] and [`Options`]. API token credentials are ready to
//! use immediately; password credentials need a [`Client::login`] call
//! to exchange them for a ticket.
//!
//! ```no_run
//! # async fn example() -> Result<(), proxmox_api::Error> {
//! use proxmox_api::{Client, Credentials, Options};
//!
//! let creds = Credentials::token("root@pam!ci", "secret")?;
//! let client = Client::new("pve.example.com", creds, Options::default())?;
//! let version = client.version().await?;
//! println!("PVE {}", version.version);
//! # Ok(())
//! # }
//! ```
//!
//! Resource operations are grouped by API path family: cluster-wide
//! calls live in [`cluster`], per-node calls in [`node`], guest
//! operations in [`qemu`] and [`lxc`], and storage content management
//! in [`storage`].

use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::Ticket;
use crate::response::{to_form_pairs, ApiResponse};

pub mod auth;
pub mod cluster;
pub mod error;
pub mod lxc;
pub mod node;
pub mod qemu;
pub mod storage;

mod response;

pub use auth::Credentials;
pub use error::Error;
pub use lxc::AddMountpoint;
pub use qemu::{AddDisk, MoveDisk};

pub use pve_types as types;

/// Connection options for [`Client::new`].
#[derive(Clone, Debug)]
pub struct Options {
    /// API port, 8006 unless overridden.
    pub port: u16,
    /// Verify the server's TLS certificate.
    pub verify_tls: bool,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            port: 8006,
            verify_tls: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Options {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read options from `PROXMOX_PORT`, `PROXMOX_VERIFY_SSL` and
    /// `PROXMOX_TIMEOUT`, falling back to the defaults.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(port) = std::env::var("PROXMOX_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            opts.port = port;
        }
        if let Ok(verify) = std::env::var("PROXMOX_VERIFY_SSL") {
            opts.verify_tls = !matches!(verify.as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(secs) = std::env::var("PROXMOX_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            opts.timeout = Duration::from_secs(secs);
        }
        opts
    }
}

#[derive(Deserialize)]
struct TicketResponse {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf_token: String,
}

/// A connection to one Proxmox VE cluster.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    ticket: RwLock<Option<Ticket>>,
}

impl Client {
    /// Create a client for `host`. Does not perform any network I/O;
    /// call [`login`](Self::login) for password credentials before
    /// issuing requests.
    pub fn new(host: &str, credentials: Credentials, options: Options) -> Result<Self, Error> {
        if host.is_empty() {
            return Err(Error::Validation("host is required".to_string()));
        }
        if options.port == 0 {
            return Err(Error::Validation("port must be positive".to_string()));
        }
        if options.timeout.is_zero() {
            return Err(Error::Validation("timeout must be positive".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()?;
        Ok(Self {
            http,
            base_url: format!("https://{}:{}/api2/json", host, options.port),
            credentials,
            ticket: RwLock::new(None),
        })
    }

    /// Create a client entirely from the environment (`PROXMOX_HOST`
    /// plus the variables read by [`Credentials::from_env`] and
    /// [`Options::from_env`]).
    pub fn from_env() -> Result<Self, Error> {
        let host = std::env::var("PROXMOX_HOST")
            .map_err(|_| Error::Validation("PROXMOX_HOST is not set".to_string()))?;
        Self::new(&host, Credentials::from_env()?, Options::from_env())
    }

    /// Exchange password credentials for a ticket. A no-op for API
    /// token credentials.
    pub async fn login(&self) -> Result<(), Error> {
        let (username, password) = match &self.credentials {
            Credentials::Token { .. } => return Ok(()),
            Credentials::Password { username, password } => (username.clone(), password.clone()),
        };

        let url = format!("{}/access/ticket", self.base_url);
        log::debug!("POST /access/ticket for {username}");
        let response = self
            .http
            .post(&url)
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let response = ApiResponse::from_parts(status, &body, "/access/ticket").map_err(|err| {
            match err {
                Error::Authentication(_) => err,
                Error::Validation(msg) | Error::Api(msg) => Error::Authentication(msg),
                other => other,
            }
        })?;
        let ticket: TicketResponse = response.into_data()?;
        *self.ticket.write().unwrap() = Some(Ticket {
            ticket: ticket.ticket,
            csrf_token: ticket.csrf_token,
        });
        Ok(())
    }

    /// Whether the client can authenticate requests right now.
    pub fn authenticated(&self) -> bool {
        !self.credentials.needs_login() || self.ticket.read().unwrap().is_some()
    }

    async fn request<P>(
        &self,
        method: reqwest::Method,
        path: &str,
        params: Option<&P>,
    ) -> Result<ApiResponse, Error>
    where
        P: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{method} {path}");

        let is_get = method == reqwest::Method::GET;
        let mut builder = self.http.request(method, &url);

        if let Some(params) = params {
            let pairs = to_form_pairs(params)?;
            builder = if is_get {
                builder.query(&pairs)
            } else {
                builder.form(&pairs)
            };
        }

        let ticket = self.ticket.read().unwrap().clone();
        if let Some(ticket) = ticket {
            builder = builder.header("Cookie", format!("PVEAuthCookie={}", ticket.ticket));
            if !is_get {
                builder = builder.header("CSRFPreventionToken", ticket.csrf_token);
            }
        } else {
            if self.credentials.needs_login() {
                return Err(Error::Authentication(
                    "not logged in, call login() first".to_string(),
                ));
            }
            for (name, value) in self.credentials.headers() {
                builder = builder.header(name, value);
            }
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        ApiResponse::from_parts(status, &body, path)
    }

    pub(crate) async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request::<()>(reqwest::Method::GET, path, None).await
    }

    pub(crate) async fn get_with<P>(&self, path: &str, params: &P) -> Result<ApiResponse, Error>
    where
        P: Serialize + ?Sized,
    {
        self.request(reqwest::Method::GET, path, Some(params)).await
    }

    pub(crate) async fn post<P>(&self, path: &str, params: Option<&P>) -> Result<ApiResponse, Error>
    where
        P: Serialize + ?Sized,
    {
        self.request(reqwest::Method::POST, path, params).await
    }

    pub(crate) async fn put<P>(&self, path: &str, params: Option<&P>) -> Result<ApiResponse, Error>
    where
        P: Serialize + ?Sized,
    {
        self.request(reqwest::Method::PUT, path, params).await
    }

    pub(crate) async fn delete<P>(
        &self,
        path: &str,
        params: Option<&P>,
    ) -> Result<ApiResponse, Error>
    where
        P: Serialize + ?Sized,
    {
        self.request(reqwest::Method::DELETE, path, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = Options::default();
        assert_eq!(opts.port, 8006);
        assert!(opts.verify_tls);
        assert_eq!(opts.timeout, Duration::from_secs(30));
    }

    #[test]
    fn options_builder() {
        let opts = Options::default().port(443).verify_tls(false);
        assert_eq!(opts.port, 443);
        assert!(!opts.verify_tls);
    }

    #[test]
    fn empty_host_rejected() {
        let creds = Credentials::token("root@pam!ci", "secret").unwrap();
        match Client::new("", creds, Options::default()) {
            Err(Error::Validation(msg)) => assert_eq!(msg, "host is required"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn zero_port_and_timeout_rejected() {
        let creds = Credentials::token("root@pam!ci", "secret").unwrap();
        match Client::new("pve.example.com", creds.clone(), Options::default().port(0)) {
            Err(Error::Validation(msg)) => assert_eq!(msg, "port must be positive"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        let opts = Options::default().timeout(Duration::ZERO);
        match Client::new("pve.example.com", creds, opts) {
            Err(Error::Validation(msg)) => assert_eq!(msg, "timeout must be positive"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn token_client_is_authenticated_without_login() {
        let creds = Credentials::token("root@pam!ci", "secret").unwrap();
        let client = Client::new("pve.example.com", creds, Options::default()).unwrap();
        assert!(client.authenticated());

        let creds = Credentials::password("root@pam", "pw").unwrap();
        let client = Client::new("pve.example.com", creds, Options::default()).unwrap();
        assert!(!client.authenticated());
    }
}
