//! Account input validation and salted secret hashing.
//!
//! Secrets are stored as `sha256i$<rounds>$<salt-hex>$<digest-hex>`: an
//! iterated SHA-256 over a random 16-byte salt. Verification recomputes the
//! digest and compares in constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::ValidationError;

const SCHEME: &str = "sha256i";
pub const DEFAULT_HASH_ROUNDS: u32 = 100_000;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 256;

/// Lower-cases and checks the shape of an email address, and enforces the
/// optional domain allow-list (empty list = any domain).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] for a malformed address and
/// [`ValidationError::DomainNotAllowed`] when the domain is not listed.
pub fn normalize_email(raw: &str, allowed_domains: &[String]) -> Result<String, ValidationError> {
    let email = raw.trim().to_ascii_lowercase();

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(email));
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || email.len() > 254 || email.contains(char::is_whitespace) || !domain_ok
    {
        return Err(ValidationError::InvalidEmail(email));
    }

    if !allowed_domains.is_empty() && !allowed_domains.iter().any(|d| d == domain) {
        return Err(ValidationError::DomainNotAllowed(domain.to_string()));
    }

    Ok(email)
}

/// # Errors
///
/// Returns [`ValidationError::WeakPassword`] describing the first rule broken.
pub fn check_password_strength(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::WeakPassword(format!(
            "must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::WeakPassword(
            "must contain at least one letter and one digit".to_string(),
        ));
    }
    Ok(())
}

/// Hashes `secret` with a fresh random salt.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    hash_secret_with_rounds(secret, DEFAULT_HASH_ROUNDS)
}

#[must_use]
pub fn hash_secret_with_rounds(secret: &str, rounds: u32) -> String {
    let salt = to_hex(&rand::random::<[u8; 16]>());
    let digest = derive(secret, &salt, rounds);
    format!("{SCHEME}${rounds}${salt}${}", to_hex(&digest))
}

/// Checks `secret` against a value produced by [`hash_secret`].
///
/// Malformed stored values never verify.
#[must_use]
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };

    let actual = to_hex(&derive(secret, salt, rounds));
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn derive(secret: &str, salt: &str, rounds: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(secret.as_bytes())
        .finalize()
        .into();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .finalize()
            .into();
    }
    digest
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ", &[]).unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn normalize_email_rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "@example.com", "a@nodot", "a@.com", "a b@x.io", "a@b@c.io"] {
            assert!(
                matches!(normalize_email(bad, &[]), Err(ValidationError::InvalidEmail(_))),
                "expected InvalidEmail for {bad:?}"
            );
        }
    }

    #[test]
    fn normalize_email_enforces_domain_allow_list() {
        let allowed = vec!["example.com".to_string()];
        assert!(normalize_email("bob@example.com", &allowed).is_ok());
        assert!(matches!(
            normalize_email("bob@other.org", &allowed),
            Err(ValidationError::DomainNotAllowed(ref d)) if d == "other.org"
        ));
    }

    #[test]
    fn password_strength_rules() {
        assert!(check_password_strength("abc123xy").is_ok());
        assert!(check_password_strength("short1").is_err());
        assert!(check_password_strength("onlyletters").is_err());
        assert!(check_password_strength("12345678").is_err());
    }

    #[test]
    fn hash_then_verify_succeeds() {
        let stored = hash_secret_with_rounds("s3cret-pass", 10);
        assert!(stored.starts_with("sha256i$10$"));
        assert!(verify_secret("s3cret-pass", &stored));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let stored = hash_secret_with_rounds("s3cret-pass", 10);
        assert!(!verify_secret("s3cret-pasS", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_secret_with_rounds("same-pass1", 5);
        let b = hash_secret_with_rounds("same-pass1", 5);
        assert_ne!(a, b);
        assert!(!a.contains("same-pass1"));
    }

    #[test]
    fn malformed_stored_values_never_verify() {
        assert!(!verify_secret("x", ""));
        assert!(!verify_secret("x", "plaintext"));
        assert!(!verify_secret("x", "md5$1$aa$bb"));
        assert!(!verify_secret("x", "sha256i$many$aa$bb"));
        assert!(!verify_secret("x", "sha256i$1$aa$bb$extra"));
    }
}
