//! `serve`: start the API, or with `--dry-run` only report what would start

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub async fn run(settings: Settings, dry_run: bool) -> AppResult<()> {
    if dry_run {
        return check(&settings);
    }
    Server::new(settings).run().await?;
    Ok(())
}

/// Everything `serve` validates before binding, without touching the
/// database or the network.
pub fn check(settings: &Settings) -> AppResult<()> {
    settings.validate()?;
    settings.jwt.validate()?;

    println!("✓ Settings are valid");
    println!("  listen address   {}", settings.server.address());
    println!("  pool size        {}", settings.database.max_connections);
    println!("  auto migrate     {}", settings.database.auto_migrate);
    println!("  seed on startup  {}", settings.seed.on_startup);
    println!(
        "  cors origins     {}",
        if settings.cors.allowed_origins.is_empty() {
            "none".to_string()
        } else {
            settings.cors.allowed_origins.join(", ")
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn servable() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/test".to_string();
        settings.jwt.secret = "s".repeat(40);
        settings
    }

    #[tokio::test]
    async fn test_dry_run_accepts_servable_settings() {
        assert!(run(servable(), true).await.is_ok());
    }

    #[test]
    fn test_check_rejects_port_zero() {
        let mut settings = servable();
        settings.server.port = 0;

        match check(&settings) {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "server.port"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_signing_key() {
        let mut settings = servable();
        settings.jwt.secret = "short".to_string();

        match check(&settings) {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "jwt.secret"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
