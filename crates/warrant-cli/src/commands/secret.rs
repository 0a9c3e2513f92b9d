//! Signing secret commands.
//!
//! `warrant secret generate` - Generate a new random signing secret.

use std::path::PathBuf;
use warrant_token::SigningSecret;

/// Generate a new signing secret, printing it or writing it to `output`.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let secret = SigningSecret::generate();

    if let Some(path) = output {
        secret.save_to_file(&path)?;
        println!("✔ Secret written to: {}", path.display());
        println!();
        println!("⚠️  Keep this file private. Anyone holding it can mint tokens.");
        println!();
        println!("Point the server at it with token.secret_file, or:");
        println!("  export WARRANT_TOKEN_SECRET=$(cat {})", path.display());
    } else {
        let text = secret
            .expose_str()
            .ok_or_else(|| anyhow::anyhow!("generated secret is not valid UTF-8"))?;
        println!("{text}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_secret_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret");
        generate(Some(path.clone())).unwrap();

        let loaded = SigningSecret::load_from_file(&path).unwrap();
        assert_eq!(loaded.as_bytes().len(), 64);
    }
}
