//! RFC 6238 TOTP for the brokerage MFA challenge.
//!
//! The account's MFA seed (base32, as shown when enrolling an
//! authenticator app) is kept in an env var; each login computes the
//! current 6-digit code. SHA-1 with a 30-second step, the scheme every
//! mainstream authenticator defaults to.

use anyhow::{Context, Result};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

/// Time step in seconds.
const STEP_SECS: u64 = 30;

/// Output code length.
const DIGITS: u32 = 6;

/// Current TOTP code for a base32 seed.
pub fn current_code(secret: &SecretString) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock before Unix epoch")?
        .as_secs();
    code_at(secret, now)
}

/// TOTP code for a specific Unix timestamp. Split out for testability
/// against the RFC test vectors.
pub fn code_at(secret: &SecretString, unix_time: u64) -> Result<String> {
    let key = base32::decode(
        base32::Alphabet::Rfc4648 { padding: false },
        &secret.expose_secret().replace(' ', "").to_uppercase(),
    )
    .context("MFA seed is not valid base32")?;

    let counter = unix_time / STEP_SECS;

    let mut mac = HmacSha1::new_from_slice(&key).context("Invalid HMAC key")?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation per RFC 4226 §5.3.
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);

    let code = binary % 10u32.pow(DIGITS);
    Ok(format!("{code:0width$}", width = DIGITS as usize))
}
