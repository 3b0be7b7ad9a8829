//! Repository and unit of work behavior against a real PostgreSQL database.
//!
//! Set `TALLER_TEST_DATABASE_URL` to run these; without it every test
//! returns early. Tests work inside a unit of work that is disposed without
//! committing unless they say otherwise, so the database keeps no changes
//! beyond the seed data.

use bigdecimal::BigDecimal;
use diesel_async::RunQueryDsl;
use jiff::civil::date;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use taller_rs::UnitOfWork;
use taller_rs::config::DatabaseConfig;
use taller_rs::db::{AsyncDbPool, establish_async_connection_pool, migrate};
use taller_rs::error::AppError;
use taller_rs::models::{Category, Country, NewCategory, NewCountry, NewEmployee, NewState};
use taller_rs::repositories::{EmployeeRepository, FailureKind, GenericRepository, Pagination};

static DATABASE: Mutex<()> = Mutex::const_new(());

async fn test_pool() -> Option<AsyncDbPool> {
    let Ok(url) = std::env::var("TALLER_TEST_DATABASE_URL") else {
        eprintln!("TALLER_TEST_DATABASE_URL not set, skipping");
        return None;
    };

    migrate::run_migrations(&url).await.unwrap();
    let config = DatabaseConfig {
        url,
        max_connections: 4,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    Some(establish_async_connection_pool(&config).await.unwrap())
}

fn employee(first_name: &str, last_name: &str) -> NewEmployee {
    NewEmployee {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        is_active: true,
        hire_date: date(2021, 5, 10).into(),
        salary: BigDecimal::from(2_500_000).with_scale(2),
    }
}

/// Removes every employee inside the caller's uncommitted transaction.
async fn clear_employees(uow: &UnitOfWork) {
    let employees = uow.repository::<EmployeeRepository>();
    for existing in employees.get_all().await.into_app_result().unwrap() {
        assert!(employees.delete(existing.id).await.was_success());
    }
}

#[tokio::test]
async fn test_fifteen_employees_paginate_by_last_name() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let uow = UnitOfWork::new(pool);
    clear_employees(&uow).await;

    let employees = uow.repository::<EmployeeRepository>();
    let last_names = [
        "Zuluaga", "Gomez", "Restrepo", "Martinez", "Perez", "Rios", "Londono", "Herrera",
        "Vargas", "Castro", "Ospina", "Salazar", "Arango", "Cardona", "Bedoya",
    ];
    for (i, last_name) in last_names.iter().enumerate() {
        let added = employees.add(employee(&format!("Name{}", i), last_name)).await;
        assert!(added.was_success());
    }

    assert_eq!(employees.count_filtered(None).await.into_app_result().unwrap(), 15);

    let first = employees.get_page_filtered(1, 10, None).await.into_app_result().unwrap();
    let second = employees.get_page_filtered(2, 10, None).await.into_app_result().unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 5);

    let mut expected: Vec<&str> = last_names.to_vec();
    expected.sort();
    let paged: Vec<String> = first.iter().chain(&second).map(|e| e.last_name.clone()).collect();
    assert_eq!(paged, expected);

    // Out-of-range page and coerced arguments
    let third = employees.get_page_filtered(3, 10, None).await.into_app_result().unwrap();
    assert!(third.is_empty());
    let coerced = employees.get_page_filtered(0, 0, None).await.into_app_result().unwrap();
    assert_eq!(coerced, first);

    uow.dispose().await;
}

#[tokio::test]
async fn test_search_and_filtered_count() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let uow = UnitOfWork::new(pool);
    clear_employees(&uow).await;

    let employees = uow.repository::<EmployeeRepository>();
    employees.add(employee("Ana", "Gómez")).await.into_app_result().unwrap();
    employees.add(employee("Juan", "Zuluaga")).await.into_app_result().unwrap();
    employees.add(employee("Juliana", "Arango")).await.into_app_result().unwrap();

    let found = employees.search_by_substring("ZUL").await.into_app_result().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].first_name, "Juan");

    let found = employees.search_by_substring("ju").await.into_app_result().unwrap();
    assert_eq!(found.len(), 2);

    let found = employees.search_by_substring("   ").await.into_app_result().unwrap();
    assert!(found.is_empty());

    // LIKE metacharacters match literally
    let found = employees.search_by_substring("%").await.into_app_result().unwrap();
    assert!(found.is_empty());

    assert_eq!(employees.count_filtered(Some("ju")).await.into_app_result().unwrap(), 2);
    let page = employees
        .get_page_filtered(1, 10, Some("ju".to_string()))
        .await
        .into_app_result()
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].last_name, "Arango");

    uow.dispose().await;
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let uow = UnitOfWork::new(pool);

    let employees = uow.repository::<EmployeeRepository>();
    let fetched = employees.get(i32::MAX).await;
    assert!(!fetched.was_success());
    assert_eq!(fetched.failure_kind(), Some(FailureKind::NotFound));
    assert!(fetched.message().is_some());

    let deleted = employees.delete(i32::MAX).await;
    assert_eq!(deleted.failure_kind(), Some(FailureKind::NotFound));

    let updated = employees.update(i32::MAX, employee("A", "B").into()).await;
    assert_eq!(updated.failure_kind(), Some(FailureKind::NotFound));

    uow.dispose().await;
}

#[tokio::test]
async fn test_rejected_write_leaves_scope_usable() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let uow = UnitOfWork::new(pool);
    let categories = uow.repository::<GenericRepository<Category>>();
    let name = format!("Category {}", uuid::Uuid::new_v4());

    let first = categories.add(NewCategory { name: name.clone() }).await;
    assert!(first.was_success());

    let duplicate = categories.add(NewCategory { name: name.clone() }).await;
    assert_eq!(duplicate.failure_kind(), Some(FailureKind::Constraint));
    assert!(duplicate.result().is_none());

    let other = categories
        .add(NewCategory {
            name: format!("{} (2)", name),
        })
        .await;
    assert!(other.was_success());

    let filtered = categories
        .count(&Pagination::new(1, 10, Some(name)))
        .await
        .into_app_result()
        .unwrap();
    assert_eq!(filtered, 2);

    uow.dispose().await;
}

#[tokio::test]
async fn test_delete_with_dependents_is_constraint_failure() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let uow = UnitOfWork::new(pool);

    let country = uow
        .repository::<GenericRepository<Country>>()
        .add(NewCountry {
            name: format!("Country {}", uuid::Uuid::new_v4()),
        })
        .await
        .into_app_result()
        .unwrap();
    uow.repository::<GenericRepository<taller_rs::models::State>>()
        .add(NewState {
            name: "Antioquia".to_string(),
            country_id: country.id,
        })
        .await
        .into_app_result()
        .unwrap();

    let deleted = uow
        .repository::<GenericRepository<Country>>()
        .delete(country.id)
        .await;
    assert_eq!(deleted.failure_kind(), Some(FailureKind::Constraint));
    assert!(deleted.message().unwrap_or_default().contains("dependent"));

    uow.dispose().await;
}

#[tokio::test]
async fn test_uncommitted_writes_are_private_and_commit_publishes() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let name = format!("Country {}", uuid::Uuid::new_v4());

    let writer = UnitOfWork::new(pool.clone());
    let country = writer
        .repository::<GenericRepository<Country>>()
        .add(NewCountry { name: name.clone() })
        .await
        .into_app_result()
        .unwrap();

    let reader = UnitOfWork::new(pool.clone());
    let seen = reader.repository::<GenericRepository<Country>>().get(country.id).await;
    assert_eq!(seen.failure_kind(), Some(FailureKind::NotFound));
    reader.dispose().await;

    assert_eq!(writer.save_changes().await.unwrap(), 1);
    writer.dispose().await;

    let reader = UnitOfWork::new(pool.clone());
    let countries = reader.repository::<GenericRepository<Country>>();
    let seen = countries.get(country.id).await.into_app_result().unwrap();
    assert_eq!(seen.name, name);

    assert!(countries.delete(country.id).await.was_success());
    reader.save_changes().await.unwrap();
    reader.dispose().await;
}

#[tokio::test]
async fn test_cancelled_commit_rolls_back() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let cancel = CancellationToken::new();

    let uow = UnitOfWork::new(pool.clone());
    let country = uow
        .repository::<GenericRepository<Country>>()
        .add(NewCountry {
            name: format!("Country {}", uuid::Uuid::new_v4()),
        })
        .await
        .into_app_result()
        .unwrap();

    cancel.cancel();
    let error = uow.commit(&cancel).await.unwrap_err();
    assert!(matches!(error, AppError::Cancelled { .. }));
    uow.dispose().await;

    let reader = UnitOfWork::new(pool);
    let seen = reader.repository::<GenericRepository<Country>>().get(country.id).await;
    assert_eq!(seen.failure_kind(), Some(FailureKind::NotFound));
    reader.dispose().await;
}

/// Kills every other backend of this database that sits inside an open
/// transaction, which is the unit of work under test.
async fn terminate_open_transactions(pool: &AsyncDbPool) {
    let mut conn = pool.get().await.unwrap();
    diesel::sql_query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = current_database() \
         AND state = 'idle in transaction' \
         AND pid <> pg_backend_pid()",
    )
    .execute(&mut *conn)
    .await
    .unwrap();
    // Termination is signalled, not awaited
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_lost_connection_aborts_the_whole_unit_of_work() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };
    let prefix = format!("Lost {}", uuid::Uuid::new_v4());

    let uow = UnitOfWork::new(pool.clone());
    let categories = uow.repository::<GenericRepository<Category>>();
    let first = categories
        .add(NewCategory {
            name: format!("{} A", prefix),
        })
        .await;
    assert!(first.was_success());

    terminate_open_transactions(&pool).await;

    let during = categories
        .add(NewCategory {
            name: format!("{} B", prefix),
        })
        .await;
    assert_eq!(during.failure_kind(), Some(FailureKind::Transient));

    let after = categories
        .add(NewCategory {
            name: format!("{} C", prefix),
        })
        .await;
    assert_eq!(after.failure_kind(), Some(FailureKind::Transient));

    let commit = uow.save_changes().await.unwrap_err();
    assert!(commit.is_transient());
    uow.dispose().await;

    let reader = UnitOfWork::new(pool);
    let persisted = reader
        .repository::<GenericRepository<Category>>()
        .count(&Pagination::new(1, 10, Some(prefix)))
        .await
        .into_app_result()
        .unwrap();
    assert_eq!(persisted, 0);
    reader.dispose().await;
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let _guard = DATABASE.lock().await;
    let Some(pool) = test_pool().await else { return };

    taller_rs::seed::seed(&pool).await.unwrap();
    let again = taller_rs::seed::seed(&pool).await.unwrap();
    assert_eq!(again.total(), 0);

    let uow = UnitOfWork::new(pool);
    let categories = uow
        .repository::<GenericRepository<Category>>()
        .count(&Pagination::default())
        .await
        .into_app_result()
        .unwrap();
    assert!(categories >= 18);
    uow.dispose().await;
}
