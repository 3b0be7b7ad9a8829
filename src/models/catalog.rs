//! Lookup tables: categories and the country / state / city hierarchy.
//!
//! Insert payloads double as full-replacement changesets since every
//! column except the key is writable.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::entity::impl_entity;
use crate::schema::{categories, cities, countries, states};

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Insertable, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Country {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Insertable, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::countries)]
pub struct NewCountry {
    pub name: String,
}

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct State {
    pub id: i32,
    pub name: String,
    pub country_id: i32,
}

#[derive(Debug, Insertable, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::states)]
pub struct NewState {
    pub name: String,
    pub country_id: i32,
}

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::cities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct City {
    pub id: i32,
    pub name: String,
    pub state_id: i32,
}

#[derive(Debug, Insertable, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::cities)]
pub struct NewCity {
    pub name: String,
    pub state_id: i32,
}

impl_entity!(Category {
    name: "category",
    table: categories,
    new: NewCategory,
    changes: NewCategory,
    order: (categories::name.asc(), categories::id.asc()),
    filter: |pattern| categories::name.ilike(pattern),
});

impl_entity!(Country {
    name: "country",
    table: countries,
    new: NewCountry,
    changes: NewCountry,
    order: (countries::name.asc(), countries::id.asc()),
    filter: |pattern| countries::name.ilike(pattern),
});

impl_entity!(State {
    name: "state",
    table: states,
    new: NewState,
    changes: NewState,
    order: (states::name.asc(), states::id.asc()),
    filter: |pattern| states::name.ilike(pattern),
});

impl_entity!(City {
    name: "city",
    table: cities,
    new: NewCity,
    changes: NewCity,
    order: (cities::name.asc(), cities::id.asc()),
    filter: |pattern| cities::name.ilike(pattern),
});
