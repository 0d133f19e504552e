//! Authentication material for the Proxmox VE API.
//!
//! Two schemes are supported: API tokens, which are sent as an
//! `Authorization` header on every request, and username/password
//! credentials, which are exchanged for a ticket cookie via
//! `/access/ticket`.

use std::env;

use crate::error::Error;

/// How the client authenticates against the API.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// A pre-provisioned API token (`user@realm!name` plus its secret).
    Token { token_id: String, secret: String },

    /// Username and password, exchanged for a ticket at login time.
    Password { username: String, password: String },
}

impl Credentials {
    /// API token credentials. The id must be the full form
    /// `user@realm!tokenname`.
    pub fn token(token_id: impl Into<String>, secret: impl Into<String>) -> Result<Self, Error> {
        let token_id = token_id.into();
        let secret = secret.into();
        if token_id.is_empty() || secret.is_empty() {
            return Err(Error::Validation(
                "token id and secret must not be empty".to_string(),
            ));
        }
        Ok(Credentials::Token { token_id, secret })
    }

    /// Username/password credentials. The username must include the
    /// realm (`root@pam`).
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Result<Self, Error> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "username and password must not be empty".to_string(),
            ));
        }
        Ok(Credentials::Password { username, password })
    }

    /// Build credentials from the environment.
    ///
    /// `PROXMOX_TOKEN_ID`/`PROXMOX_TOKEN_SECRET` take precedence over
    /// `PROXMOX_USERNAME`/`PROXMOX_PASSWORD`.
    pub fn from_env() -> Result<Self, Error> {
        if let (Ok(token_id), Ok(secret)) = (
            env::var("PROXMOX_TOKEN_ID"),
            env::var("PROXMOX_TOKEN_SECRET"),
        ) {
            return Self::token(token_id, secret);
        }
        if let (Ok(username), Ok(password)) =
            (env::var("PROXMOX_USERNAME"), env::var("PROXMOX_PASSWORD"))
        {
            return Self::password(username, password);
        }
        Err(Error::Validation(
            "no credentials in environment, set PROXMOX_TOKEN_ID/PROXMOX_TOKEN_SECRET \
             or PROXMOX_USERNAME/PROXMOX_PASSWORD"
                .to_string(),
        ))
    }

    /// Whether these credentials require a login round trip.
    pub(crate) fn needs_login(&self) -> bool {
        matches!(self, Credentials::Password { .. })
    }

    /// Headers attached to every request for this scheme. Password
    /// credentials use the ticket instead, see [`Ticket`].
    pub(crate) fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Credentials::Token { token_id, secret } => vec![(
                "Authorization",
                format!("PVEAPIToken={token_id}={secret}"),
            )],
            Credentials::Password { .. } => Vec::new(),
        }
    }
}

/// An authentication ticket obtained from `/access/ticket`.
#[derive(Clone, Debug)]
pub(crate) struct Ticket {
    /// Value of the `PVEAuthCookie` cookie.
    pub ticket: String,
    /// CSRF prevention token, required on write requests.
    pub csrf_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_header() {
        let creds = Credentials::token("root@pam!ci", "uuid-secret").unwrap();
        assert!(!creds.needs_login());
        let headers = creds.headers();
        assert_eq!(
            headers,
            vec![(
                "Authorization",
                "PVEAPIToken=root@pam!ci=uuid-secret".to_string()
            )]
        );
    }

    #[test]
    fn password_has_no_static_headers() {
        let creds = Credentials::password("root@pam", "hunter2").unwrap();
        assert!(creds.needs_login());
        assert!(creds.headers().is_empty());
    }

    #[test]
    fn empty_credentials_rejected() {
        assert!(Credentials::token("", "secret").is_err());
        assert!(Credentials::token("root@pam!ci", "").is_err());
        assert!(Credentials::password("root@pam", "").is_err());
        assert!(Credentials::password("", "pw").is_err());
    }
}
