//! Layered configuration for taller-rs
//!
//! # Configuration Priority (lowest to highest)
//! 1. `default.toml` - Base default configuration
//! 2. `{environment}.toml` - Environment-specific configuration
//! 3. `local.toml` - Local overrides (not committed to version control)
//! 4. `TALLER_*` environment variables, `__` between nested keys

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, CorsConfig, DatabaseConfig, JwtConfig, SeedConfig, ServerConfig, Settings,
};
