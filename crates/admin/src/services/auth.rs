//! Admin credential check.
//!
//! The admin API has a single operator account configured through
//! `ADMIN_USERNAME` / `ADMIN_PASSWORD`. Both values are compared through
//! HMAC-SHA256 tags keyed with the session secret, so the comparison runs in
//! constant time and never depends on the length of the configured values.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use crate::config::AdminCredentials;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminAuthError {
    /// Username or password did not match.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The session secret cannot be used as an HMAC key.
    #[error("authentication is misconfigured")]
    Misconfigured,
}

/// Verify a login attempt against the configured credentials.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidCredentials` if either value differs.
pub fn verify_credentials(
    expected: &AdminCredentials,
    session_secret: &SecretString,
    username: &str,
    password: &str,
) -> Result<(), AdminAuthError> {
    let key = session_secret.expose_secret().as_bytes();

    let username_ok = tags_match(key, expected.username.as_bytes(), username.as_bytes())?;
    let password_ok = tags_match(
        key,
        expected.password.expose_secret().as_bytes(),
        password.as_bytes(),
    )?;

    // Both comparisons always run
    if username_ok & password_ok {
        Ok(())
    } else {
        Err(AdminAuthError::InvalidCredentials)
    }
}

fn tags_match(key: &[u8], expected: &[u8], provided: &[u8]) -> Result<bool, AdminAuthError> {
    let mut expected_mac =
        HmacSha256::new_from_slice(key).map_err(|_| AdminAuthError::Misconfigured)?;
    expected_mac.update(expected);
    let expected_tag = expected_mac.finalize().into_bytes();

    let mut provided_mac =
        HmacSha256::new_from_slice(key).map_err(|_| AdminAuthError::Misconfigured)?;
    provided_mac.update(provided);

    Ok(provided_mac.verify_slice(&expected_tag).is_ok())
}
