//! Value parsers for arguments clap cannot check on its own.

use std::path::PathBuf;

use crate::db::migrate;

/// An existing, readable configuration file.
pub fn config_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("'{}' is not a configuration file", value));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("cannot read '{}': {}", value, e))
}

/// A bind address: an IP literal or a host name, without whitespace.
pub fn host(value: &str) -> Result<String, String> {
    let host = value.trim();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(format!("'{}' is not a host address", value));
    }
    if host.len() > 253 {
        return Err("host names are at most 253 characters".to_string());
    }
    // Dotted digits must be a real IPv4 address
    if host.chars().all(|c| c.is_ascii_digit() || c == '.')
        && host.parse::<std::net::Ipv4Addr>().is_err()
    {
        return Err(format!("'{}' is not an IPv4 address", value));
    }
    Ok(host.to_string())
}

/// Rollback steps, between 1 and the number of embedded migrations.
pub fn rollback_steps(value: &str) -> Result<u32, String> {
    let available = migrate::embedded_count();
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of steps", value))?;
    if steps == 0 || steps as usize > available {
        return Err(format!("steps must be between 1 and {}", available));
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_accepts_names_and_addresses() {
        for value in ["localhost", "0.0.0.0", "192.168.1.10", "api.taller.local", "::1"] {
            assert_eq!(host(value).as_deref(), Ok(value));
        }
        assert_eq!(host("  localhost ").as_deref(), Ok("localhost"));
    }

    #[test]
    fn test_host_rejects_malformed_values() {
        let long = "x".repeat(254);
        for value in ["", "  ", "my host", "999.1.1.1", "10.0.0", long.as_str()] {
            assert!(host(value).is_err(), "'{}' should be rejected", value);
        }
    }

    #[test]
    fn test_rollback_steps_bounded_by_embedded_migrations() {
        let available = migrate::embedded_count();
        assert_eq!(rollback_steps("1"), Ok(1));
        assert_eq!(rollback_steps(&available.to_string()), Ok(available as u32));

        let too_many = (available + 1).to_string();
        for value in ["0", too_many.as_str(), "-1", "two"] {
            assert!(rollback_steps(value).is_err(), "'{}' should be rejected", value);
        }
    }

    #[test]
    fn test_config_file_must_exist() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(config_file(path), Ok(PathBuf::from(path)));

        let dir = tempfile::tempdir().unwrap();
        assert!(config_file(dir.path().to_str().unwrap()).is_err());
        assert!(config_file("/nonexistent/taller.toml").is_err());
    }
}
