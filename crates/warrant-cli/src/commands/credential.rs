//! Credential hash commands.
//!
//! `warrant credential hash` - Hash a password the way the server stores it.
//! `warrant credential verify` - Check a password against a stored hash.

use warrant_credential::{CredentialHasher, Salt};

/// Hash a password, optionally under a fixed salt.
pub async fn hash(password: &str, salt: Option<&str>, iterations: u32) -> anyhow::Result<String> {
    let hasher = CredentialHasher::new().with_iterations(iterations);
    let hash = match salt {
        Some(salt) => hasher.hash_with_salt(password, Salt::from_hex(salt)?).await?,
        None => hasher.hash(password).await?,
    };
    Ok(hash.into_string())
}

/// Check a password against a stored hash. A mismatch is reported as an error.
pub async fn verify(password: &str, stored: &str, iterations: u32) -> anyhow::Result<()> {
    let hasher = CredentialHasher::new().with_iterations(iterations);
    if hasher.verify(password, stored.trim()).await? {
        println!("✔ Password matches");
        Ok(())
    } else {
        anyhow::bail!("password does not match")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let stored = hash("pw123", None, 10).await.unwrap();
        verify("pw123", &stored, 10).await.unwrap();
        assert!(verify("pw124", &stored, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_fixed_salt_is_reproducible() {
        let salt = "00112233445566778899aabbccddeeff";
        let a = hash("pw", Some(salt), 10).await.unwrap();
        let b = hash("pw", Some(salt), 10).await.unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with(salt));
    }

    #[tokio::test]
    async fn test_bad_inputs() {
        assert!(hash("pw", Some("short"), 10).await.is_err());
        assert!(verify("pw", "not-a-hash", 10).await.is_err());
    }
}
