//! Reference and sample data.
//!
//! Every group is inserted only when its table is empty (the admin account
//! only when its email is unregistered), so seeding is safe to repeat.

use bigdecimal::BigDecimal;
use jiff::civil::{Date, date};

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{
    Category, City, Country, NewCategory, NewCity, NewCountry, NewEmployee, NewState, NewUser,
    State, UserType,
};
use crate::repositories::{
    EmployeeRepository, FailureKind, GenericRepository, Pagination, UserRepository,
};
use crate::services::normalize_email;
use crate::unit_of_work::UnitOfWork;
use crate::utils::password::hash_password;

type Geography = &'static [(&'static str, &'static [(&'static str, &'static [&'static str])])];

const GEOGRAPHY: Geography = &[
    (
        "Colombia",
        &[
            ("Antioquia", &["Medellín", "Itagüí", "Envigado", "Bello", "Rionegro"]),
            ("Bogotá", &["Usaquen", "Champinero", "Santa fe", "Useme", "Bosa"]),
        ],
    ),
    (
        "Estados Unidos",
        &[
            ("Florida", &["Orlando", "Miami", "Tampa", "Fort Lauderdale", "Key West"]),
            ("Texas", &["Houston", "San Antonio", "Dallas", "Austin", "El Paso"]),
        ],
    ),
];

const CATEGORIES: &[&str] = &[
    "Apple", "Autos", "Belleza", "Calzado", "Comida", "Cosmeticos", "Deportes", "Erótica",
    "Ferreteria", "Gamer", "Hogar", "Jardín", "Jugetes", "Lenceria", "Mascotas", "Nutrición",
    "Ropa", "Tecnología",
];

struct SampleEmployee {
    first_name: &'static str,
    last_name: &'static str,
    is_active: bool,
    hire_date: Date,
    salary: i64,
}

const fn employee(
    first_name: &'static str,
    last_name: &'static str,
    is_active: bool,
    hire_date: Date,
    salary: i64,
) -> SampleEmployee {
    SampleEmployee {
        first_name,
        last_name,
        is_active,
        hire_date,
        salary,
    }
}

const EMPLOYEES: &[SampleEmployee] = &[
    employee("Juan", "Zuluaga", true, date(2019, 3, 11), 3_200_000),
    employee("Ana", "Gómez", true, date(2020, 7, 1), 2_850_000),
    employee("Carlos", "Restrepo", true, date(2018, 1, 15), 4_100_000),
    employee("Luisa", "Martínez", false, date(2017, 5, 22), 2_300_000),
    employee("Andrés", "Pérez", true, date(2021, 9, 6), 2_600_000),
    employee("Valentina", "Ríos", true, date(2022, 2, 14), 1_900_000),
    employee("Santiago", "Londoño", true, date(2016, 11, 30), 5_250_000),
    employee("Camila", "Herrera", true, date(2023, 4, 3), 1_750_000),
    employee("Mateo", "Vargas", false, date(2019, 8, 19), 2_950_000),
    employee("Daniela", "Castro", true, date(2020, 12, 1), 3_400_000),
    employee("Felipe", "Ospina", true, date(2015, 6, 8), 6_000_000),
    employee("Mariana", "Salazar", true, date(2021, 3, 29), 2_200_000),
    employee("Sebastián", "Arango", true, date(2022, 10, 10), 2_050_000),
    employee("Laura", "Cardona", true, date(2018, 9, 17), 3_900_000),
    employee("Nicolás", "Bedoya", false, date(2024, 1, 8), 1_600_000),
];

struct SampleUser {
    document: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    phone_number: &'static str,
    address: &'static str,
    user_type: UserType,
    password: &'static str,
}

const ADMIN: SampleUser = SampleUser {
    document: "1010",
    first_name: "kevin",
    last_name: "londoño",
    email: "kevin@yopmail.com",
    phone_number: "322 311 4620",
    address: "Calle Luna Calle Sol",
    user_type: UserType::Admin,
    password: "123456",
};

/// City given to seeded accounts when it exists.
const DEFAULT_CITY: &str = "Medellín";

/// Rows inserted by one [`seed`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub countries: usize,
    pub states: usize,
    pub cities: usize,
    pub categories: usize,
    pub employees: usize,
    pub users: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.countries + self.states + self.cities + self.categories + self.employees + self.users
    }
}

/// Inserts whatever reference and sample data is missing.
pub async fn seed(pool: &AsyncDbPool) -> AppResult<SeedReport> {
    let uow = UnitOfWork::new(pool.clone());
    let outcome = seed_all(&uow).await;
    uow.dispose().await;

    let report = outcome?;
    tracing::info!(
        countries = report.countries,
        states = report.states,
        cities = report.cities,
        categories = report.categories,
        employees = report.employees,
        users = report.users,
        "Seed data applied"
    );
    Ok(report)
}

async fn seed_all(uow: &UnitOfWork) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    (report.countries, report.states, report.cities) = seed_geography(uow).await?;
    report.categories = seed_categories(uow).await?;
    report.employees = seed_employees(uow).await?;
    report.users = seed_user(uow, &ADMIN).await?;

    Ok(report)
}

async fn is_empty<E: crate::models::Entity>(uow: &UnitOfWork) -> AppResult<bool> {
    let total = uow
        .repository::<GenericRepository<E>>()
        .count(&Pagination::default())
        .await
        .into_app_result()?;
    Ok(total == 0)
}

async fn seed_geography(uow: &UnitOfWork) -> AppResult<(usize, usize, usize)> {
    if !is_empty::<Country>(uow).await? {
        tracing::debug!("Countries present, skipping geography");
        return Ok((0, 0, 0));
    }

    let countries = uow.repository::<GenericRepository<Country>>();
    let states = uow.repository::<GenericRepository<State>>();
    let cities = uow.repository::<GenericRepository<City>>();
    let (mut state_count, mut city_count) = (0, 0);

    for (country_name, country_states) in GEOGRAPHY {
        let country = countries
            .add(NewCountry {
                name: country_name.to_string(),
            })
            .await
            .into_app_result()?;

        for (state_name, city_names) in country_states.iter() {
            let state = states
                .add(NewState {
                    name: state_name.to_string(),
                    country_id: country.id,
                })
                .await
                .into_app_result()?;
            state_count += 1;

            for city_name in city_names.iter() {
                cities
                    .add(NewCity {
                        name: city_name.to_string(),
                        state_id: state.id,
                    })
                    .await
                    .into_app_result()?;
                city_count += 1;
            }
        }
    }

    uow.save_changes().await?;
    Ok((GEOGRAPHY.len(), state_count, city_count))
}

async fn seed_categories(uow: &UnitOfWork) -> AppResult<usize> {
    if !is_empty::<Category>(uow).await? {
        return Ok(0);
    }

    let categories = uow.repository::<GenericRepository<Category>>();
    for name in CATEGORIES {
        categories
            .add(NewCategory {
                name: name.to_string(),
            })
            .await
            .into_app_result()?;
    }

    uow.save_changes().await?;
    Ok(CATEGORIES.len())
}

async fn seed_employees(uow: &UnitOfWork) -> AppResult<usize> {
    let employees = uow.repository::<EmployeeRepository>();
    let existing = employees
        .count_filtered(None)
        .await
        .into_app_result()?;
    if existing > 0 {
        return Ok(0);
    }

    for sample in EMPLOYEES {
        employees
            .add(NewEmployee {
                first_name: sample.first_name.to_string(),
                last_name: sample.last_name.to_string(),
                is_active: sample.is_active,
                hire_date: sample.hire_date.into(),
                salary: BigDecimal::from(sample.salary).with_scale(2),
            })
            .await
            .into_app_result()?;
    }

    uow.save_changes().await?;
    Ok(EMPLOYEES.len())
}

async fn seed_user(uow: &UnitOfWork, sample: &SampleUser) -> AppResult<usize> {
    let users = uow.repository::<UserRepository>();
    let email = normalize_email(sample.email);

    let existing = users.find_by_email(&email).await;
    if existing.was_success() {
        return Ok(0);
    }
    if existing.failure_kind() != Some(FailureKind::NotFound) {
        existing.into_app_result()?;
    }

    let cities = uow
        .repository::<GenericRepository<City>>()
        .get_all()
        .await
        .into_app_result()?;
    let city_id = cities
        .iter()
        .find(|city| city.name == DEFAULT_CITY)
        .or_else(|| cities.first())
        .map(|city| city.id);

    users
        .add(NewUser {
            document: sample.document.to_string(),
            first_name: sample.first_name.to_string(),
            last_name: sample.last_name.to_string(),
            email,
            phone_number: Some(sample.phone_number.to_string()),
            address: Some(sample.address.to_string()),
            city_id,
            user_type: sample.user_type,
            password_hash: hash_password(sample.password)?,
        })
        .await
        .into_app_result()?;

    uow.save_changes().await?;
    Ok(1)
}
