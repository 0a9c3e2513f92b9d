//! Configuration commands.
//!
//! `warrant config check` - Load and validate a configuration file.

use std::path::Path;
use warrant_core::WarrantConfig;

/// Load and validate the configuration at `path`, or the default location.
pub fn check(path: Option<&Path>) -> anyhow::Result<WarrantConfig> {
    let config = match path {
        Some(path) => WarrantConfig::from_file(path)?,
        None => WarrantConfig::load()?,
    };
    config.validate()?;

    println!("✔ Configuration is valid");
    println!("  Bind: {}", config.server.bind);
    println!("  Token TTL: {}", config.token.ttl);
    println!("  Signature scope: {:?}", config.token.signature_scope);
    println!("  PBKDF2 iterations: {}", config.credentials.iterations);
    println!("  Store: {:?}", config.store.backend);

    match config.token.resolve_secret() {
        Ok(Some(_)) => println!("  Token secret: resolved"),
        Ok(None) => println!("  Token secret: ⚠️  not set (the server will refuse to start)"),
        Err(e) => println!("  Token secret: ⚠️  unreadable ({e})"),
    }

    Ok(config)
}

/// Print the effective configuration as YAML.
pub fn show(path: Option<&Path>) -> anyhow::Result<()> {
    let config = match path {
        Some(path) => WarrantConfig::from_file(path)?,
        None => WarrantConfig::load()?,
    };
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_check_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "credentials:\n  iterations: 1000").unwrap();

        let config = check(Some(file.path())).unwrap();
        assert_eq!(config.credentials.iterations, 1000);
    }

    #[test]
    fn test_check_rejects_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "token:\n  ttl: \"0s\"").unwrap();
        assert!(check(Some(file.path())).is_err());
    }
}
