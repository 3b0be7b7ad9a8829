//! `seed`: insert the reference catalogs and sample records that are missing

use crate::config::settings::Settings;
use crate::db::establish_async_connection_pool;
use crate::error::AppResult;
use crate::seed::seed;

pub async fn run(settings: &Settings) -> AppResult<()> {
    settings.database.validate()?;

    let pool = establish_async_connection_pool(&settings.database).await?;
    let report = seed(&pool).await?;

    if report.total() == 0 {
        println!("✓ Seed data already present");
        return Ok(());
    }
    println!("✓ Inserted {} rows", report.total());
    for (table, rows) in [
        ("countries", report.countries),
        ("states", report.states),
        ("cities", report.cities),
        ("categories", report.categories),
        ("employees", report.employees),
        ("users", report.users),
    ] {
        if rows > 0 {
            println!("  {table:<12}{rows}");
        }
    }
    Ok(())
}
