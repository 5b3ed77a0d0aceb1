//! Credentials trait and implementations.
//!
//! All credential types implement custom Debug to redact sensitive data.

use crate::error::{Error, ErrorKind, Result};

/// Environment variable holding the PPM username.
pub const USER_ENV: &str = "NSQL_PPM_USER";

/// Environment variable holding the PPM password.
pub const PASSWORD_ENV: &str = "NSQL_PPM_PASSWORD";

/// Trait for credentials copied into a query service's `Auth` object.
pub trait Credentials: Send + Sync {
    /// The login name.
    fn username(&self) -> &str;

    /// The password.
    fn password(&self) -> &str;

    /// Returns true if the credentials appear to be valid (non-empty username).
    ///
    /// An empty password is accepted: some PPM instances authenticate
    /// service accounts without one.
    fn is_valid(&self) -> bool {
        !self.username().trim().is_empty()
    }
}

/// Username/password pair for a Clarity PPM instance.
///
/// The password is redacted in Debug output to prevent accidental exposure
/// in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PpmCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for PpmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PpmCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl PpmCredentials {
    /// Create new credentials with the given values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create credentials, rejecting an empty username.
    pub fn try_new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let creds = Self::new(username, password);
        if !creds.is_valid() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "username must not be empty".to_string(),
            )));
        }
        Ok(creds)
    }

    /// Load credentials from environment variables.
    ///
    /// Required environment variables:
    /// - `NSQL_PPM_USER`
    /// - `NSQL_PPM_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let username = std::env::var(USER_ENV)
            .map_err(|_| Error::new(ErrorKind::EnvVar(USER_ENV.to_string())))?;
        let password = std::env::var(PASSWORD_ENV)
            .map_err(|_| Error::new(ErrorKind::EnvVar(PASSWORD_ENV.to_string())))?;

        Self::try_new(username, password)
    }
}

impl Credentials for PpmCredentials {
    fn username(&self) -> &str {
        &self.username
    }

    fn password(&self) -> &str {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = PpmCredentials::new("admin", "s3cret");

        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password(), "s3cret");
        assert!(creds.is_valid());
    }

    #[test]
    fn test_empty_password_is_valid() {
        let creds = PpmCredentials::new("svc_account", "");
        assert!(creds.is_valid());
    }

    #[test]
    fn test_try_new_rejects_blank_username() {
        let err = PpmCredentials::try_new("  ", "pw").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(_)));
        assert!(!err.to_string().contains("pw"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = PpmCredentials::new("admin", "super_secret_password");
        let debug_output = format!("{:?}", creds);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("admin"));
        assert!(!debug_output.contains("super_secret_password"));
    }
}
