//! Taller
//!
//! REST API for employees, user accounts and the geographic and product
//! catalogs, built on a generic repository and a per-request unit of work.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod seed;
pub mod server;
pub mod services;
pub mod state;
pub mod unit_of_work;
pub mod utils;

pub use state::AppState;
pub use unit_of_work::UnitOfWork;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
