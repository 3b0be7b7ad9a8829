//! `migrate`: apply, list or revert the embedded schema migrations

use crate::config::settings::Settings;
use crate::db::migrate;
use crate::error::AppResult;

pub async fn run(settings: &Settings, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
    settings.database.validate()?;
    let url = settings.database.url.as_str();

    match (dry_run, rollback) {
        (true, _) => {
            let pending = migrate::pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ Schema is up to date");
            } else {
                print_versions(&format!("{} pending:", pending.len()), &pending);
            }
        }
        (false, Some(steps)) => {
            let reverted = migrate::revert_migrations(url, steps).await?;
            print_versions(&format!("✓ Reverted {}:", reverted.len()), &reverted);
        }
        (false, None) => {
            let applied = migrate::run_migrations(url).await?;
            if applied.is_empty() {
                println!("✓ Nothing to apply");
            } else {
                print_versions(&format!("✓ Applied {}:", applied.len()), &applied);
            }
        }
    }
    Ok(())
}

fn print_versions(heading: &str, versions: &[String]) {
    println!("{heading}");
    for version in versions {
        println!("  {version}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn unreachable_database() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost:1/test".to_string();
        settings
    }

    #[tokio::test]
    async fn test_zero_rollback_steps_fail_before_connecting() {
        match run(&unreachable_database(), false, Some(0)).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "rollback_steps"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_postgres_url_is_a_configuration_error() {
        let mut settings = unreachable_database();
        settings.database.url = "mysql://localhost/test".to_string();

        match run(&settings, true, None).await {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "database.url"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
